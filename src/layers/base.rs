use crate::{
    core::geo::LatLngBounds,
    data::geojson::{Feature, FeatureCollection},
    input::{
        emitter::{EventListeners, Evented, ListenerId},
        events::EventType,
    },
    layers::{
        options::LayerOptions,
        style::{Source, StyleLayer},
    },
    rendering::renderer::Renderer,
    utils::images::{add_images, ImageLoader},
    Result,
};
use log::{debug, warn};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Tile,
    Thematic,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Tile => write!(f, "tile"),
            LayerType::Thematic => write!(f, "thematic"),
        }
    }
}

/// State shared by every layer: descriptors, features and the event surface
#[derive(Debug)]
pub struct LayerBase {
    id: String,
    layer_type: LayerType,
    options: LayerOptions,
    visible: bool,
    /// Source descriptors in registration order
    sources: Vec<(String, Source)>,
    styles: Vec<StyleLayer>,
    interactive_ids: Vec<String>,
    features: FeatureCollection,
    listeners: EventListeners,
    /// Listeners registered from the options' callbacks while on the map
    option_listeners: Vec<ListenerId>,
}

impl LayerBase {
    pub fn new(layer_type: LayerType, options: LayerOptions) -> Self {
        let id = options
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            id,
            layer_type,
            options,
            visible: true,
            sources: Vec::new(),
            styles: Vec::new(),
            interactive_ids: Vec::new(),
            features: FeatureCollection::default(),
            listeners: EventListeners::new(),
            option_listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layer_type(&self) -> LayerType {
        self.layer_type
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    pub fn index(&self) -> i32 {
        self.options.index.unwrap_or(0)
    }

    /// Only records the index; `Map::set_layer_index` also reorders the map
    pub fn set_index(&mut self, index: i32) {
        self.options.index = Some(index);
    }

    pub fn set_source(&mut self, id: impl Into<String>, source: Source) {
        let id = id.into();
        match self.sources.iter_mut().find(|(s, _)| *s == id) {
            Some(entry) => entry.1 = source,
            None => self.sources.push((id, source)),
        }
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|(s, _)| s == id).map(|(_, s)| s)
    }

    pub fn sources(&self) -> &[(String, Source)] {
        &self.sources
    }

    pub fn add_style(&mut self, style: StyleLayer, interactive: bool) {
        if interactive {
            self.interactive_ids.push(style.id.clone());
        }
        self.styles.push(style);
    }

    pub fn styles(&self) -> &[StyleLayer] {
        &self.styles
    }

    pub fn has_style_id(&self, id: &str) -> bool {
        self.styles.iter().any(|style| style.id == id)
    }

    pub fn owns_source(&self, id: &str) -> bool {
        self.sources.iter().any(|(s, _)| s == id)
    }

    /// Replaces the features, numbering them `0..n` in input order.
    /// Integer ids are what the renderer's feature state is keyed by.
    pub fn set_features(&mut self, data: Vec<Feature>) {
        self.features = FeatureCollection::new(
            data.into_iter()
                .enumerate()
                .map(|(i, feature)| Feature {
                    id: Some(Value::from(i as u64)),
                    ..feature
                })
                .collect(),
        );
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    /// Bounding box of the features, `None` when there are none
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.features.bounds()
    }

    /// Asks the renderer; never cached so out-of-band removals are seen
    pub fn is_on_map(&self, renderer: &dyn Renderer) -> bool {
        renderer.has_style(&self.id)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_interactive(&self, renderer: &dyn Renderer) -> bool {
        !self.interactive_ids.is_empty() && self.is_on_map(renderer) && self.is_visible()
    }

    /// Style ids used for hit-testing, empty while the layer is not interactive
    pub fn interactive_ids(&self, renderer: &dyn Renderer) -> &[String] {
        if self.is_interactive(renderer) {
            &self.interactive_ids
        } else {
            &[]
        }
    }

    pub fn set_visibility(&mut self, renderer: &mut dyn Renderer, visible: bool) -> Result<()> {
        self.visible = visible;

        if self.is_on_map(renderer) {
            let value = json!(if visible { "visible" } else { "none" });
            for style in &self.styles {
                renderer.set_layout_property(&style.id, "visibility", value.clone())?;
            }
        }
        Ok(())
    }

    /// Registers images, then sources, then styles with the renderer.
    ///
    /// Images are loaded first and all of them must succeed; nothing is
    /// registered otherwise.
    pub async fn add_to(
        &mut self,
        renderer: &mut dyn Renderer,
        image_loader: &dyn ImageLoader,
    ) -> Result<()> {
        if !self.options.images.is_empty() {
            add_images(renderer, image_loader, &self.options.images).await?;
        }

        if let Err(e) = self.register(renderer) {
            warn!("Failed to add layer {}: {}", self.id, e);
            return Err(e);
        }

        if !self.visible {
            self.set_visibility(renderer, false)?;
        }

        if let Some(callback) = self.options.on_click.clone() {
            let id = self.listeners.add(EventType::Click, callback);
            self.option_listeners.push(id);
        }
        if let Some(callback) = self.options.on_right_click.clone() {
            let id = self.listeners.add(EventType::ContextMenu, callback);
            self.option_listeners.push(id);
        }

        debug!(
            "Added {} layer {} ({} sources, {} styles)",
            self.layer_type,
            self.id,
            self.sources.len(),
            self.styles.len()
        );
        Ok(())
    }

    /// Unregisters styles, then sources, and drops the option listeners
    pub fn remove_from(&mut self, renderer: &mut dyn Renderer) {
        self.unregister(renderer);

        for id in self.option_listeners.drain(..) {
            self.listeners.remove(id);
        }

        debug!("Removed {} layer {}", self.layer_type, self.id);
    }

    /// Moves every style above everything else on the map, keeping their relative order
    pub fn move_to_top(&self, renderer: &mut dyn Renderer) -> Result<()> {
        for style in &self.styles {
            renderer.move_style_to_top(&style.id)?;
        }
        Ok(())
    }

    /// Adds sources then styles; on failure removes exactly what this call added
    fn register(&self, renderer: &mut dyn Renderer) -> Result<()> {
        let mut sources = Vec::new();
        let mut styles = Vec::new();

        for (id, source) in &self.sources {
            if let Err(e) = renderer.add_source(id, source) {
                rollback(renderer, &styles, &sources);
                return Err(e);
            }
            sources.push(id.as_str());
        }
        for style in &self.styles {
            if let Err(e) = renderer.add_style(style) {
                rollback(renderer, &styles, &sources);
                return Err(e);
            }
            styles.push(style.id.as_str());
        }
        Ok(())
    }

    fn unregister(&self, renderer: &mut dyn Renderer) {
        for style in &self.styles {
            if renderer.has_style(&style.id) {
                if let Err(e) = renderer.remove_style(&style.id) {
                    warn!("Failed to remove style {}: {}", style.id, e);
                }
            }
        }
        for (id, _) in &self.sources {
            if renderer.has_source(id) {
                if let Err(e) = renderer.remove_source(id) {
                    warn!("Failed to remove source {}: {}", id, e);
                }
            }
        }
    }
}

// Reverse order: styles before the sources they read from
fn rollback(renderer: &mut dyn Renderer, styles: &[&str], sources: &[&str]) {
    for id in styles.iter().rev() {
        if let Err(e) = renderer.remove_style(id) {
            warn!("Failed to roll back style {}: {}", id, e);
        }
    }
    for id in sources.iter().rev() {
        if let Err(e) = renderer.remove_source(id) {
            warn!("Failed to roll back source {}: {}", id, e);
        }
    }
}

impl Evented for LayerBase {
    fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut EventListeners {
        &mut self.listeners
    }
}

/// A layer the map controller can attach, order and route events to
pub trait Layer: Evented + Send + Sync {
    fn base(&self) -> &LayerBase;

    fn base_mut(&mut self) -> &mut LayerBase;

    /// Changes the layer opacity; does nothing while the layer is not on the map
    fn set_opacity(&mut self, renderer: &mut dyn Renderer, opacity: f64) -> Result<()>;

    fn id(&self) -> &str {
        self.base().id()
    }

    fn index(&self) -> i32 {
        self.base().index()
    }

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::geojson::Geometry,
        layers::style::StyleKind,
        rendering::headless::HeadlessRenderer,
        utils::images::tests::StaticImageLoader,
    };
    use serde_json::Map;

    fn point(lng: f64, lat: f64) -> Feature {
        Feature::new(
            Geometry::Point {
                coordinates: [lng, lat],
            },
            Map::new(),
        )
    }

    fn layer_with_styles(id: &str) -> LayerBase {
        let mut base = LayerBase::new(LayerType::Thematic, LayerOptions::new().with_id(id));
        base.set_source(
            id,
            Source::GeoJson {
                data: FeatureCollection::default(),
            },
        );
        base.add_style(StyleLayer::new(id, StyleKind::Fill, id), true);
        base.add_style(
            StyleLayer::new(format!("{}-hover", id), StyleKind::Line, id),
            false,
        );
        base
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = LayerBase::new(LayerType::Tile, LayerOptions::new());
        let b = LayerBase::new(LayerType::Tile, LayerOptions::new());
        assert_ne!(a.id(), b.id());

        let named = LayerBase::new(LayerType::Tile, LayerOptions::new().with_id("osm"));
        assert_eq!(named.id(), "osm");
    }

    #[test]
    fn test_index_defaults_to_zero() {
        let mut base = LayerBase::new(LayerType::Tile, LayerOptions::new());
        assert_eq!(base.index(), 0);
        base.set_index(4);
        assert_eq!(base.index(), 4);
    }

    #[test]
    fn test_set_features_numbers_in_input_order() {
        let mut base = LayerBase::new(LayerType::Thematic, LayerOptions::new());
        base.set_features(vec![point(0.0, 0.0), point(1.0, 1.0), point(2.0, 2.0)]);

        let ids: Vec<_> = base
            .features()
            .features
            .iter()
            .map(|f| f.numeric_id())
            .collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2)]);

        base.set_features(vec![point(5.0, 5.0), point(6.0, 6.0)]);
        let ids: Vec<_> = base
            .features()
            .features
            .iter()
            .map(|f| f.numeric_id())
            .collect();
        assert_eq!(ids, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_bounds() {
        let mut base = LayerBase::new(LayerType::Thematic, LayerOptions::new());
        assert!(base.bounds().is_none());

        base.set_features(vec![point(-13.0, 7.0), point(-10.5, 9.0)]);
        assert_eq!(
            base.bounds(),
            Some(LatLngBounds::from_coords(7.0, -13.0, 9.0, -10.5))
        );
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let mut renderer = HeadlessRenderer::loaded();
        let mut base = layer_with_styles("districts");

        assert!(!base.is_on_map(&renderer));
        assert!(!base.is_interactive(&renderer));

        base.add_to(&mut renderer, &StaticImageLoader::default())
            .await
            .unwrap();
        assert!(base.is_on_map(&renderer));
        assert_eq!(renderer.style_ids(), vec!["districts", "districts-hover"]);
        assert_eq!(base.interactive_ids(&renderer), ["districts".to_string()]);

        base.remove_from(&mut renderer);
        assert!(!base.is_on_map(&renderer));
        assert!(renderer.style_ids().is_empty());
        assert!(renderer.source_ids().is_empty());
    }

    #[tokio::test]
    async fn test_hidden_layer_is_not_interactive() {
        let mut renderer = HeadlessRenderer::loaded();
        let mut base = layer_with_styles("districts");
        base.add_to(&mut renderer, &StaticImageLoader::default())
            .await
            .unwrap();

        base.set_visibility(&mut renderer, false).unwrap();
        assert!(!base.is_interactive(&renderer));
        assert!(base.interactive_ids(&renderer).is_empty());
        assert_eq!(
            renderer.style("districts-hover").unwrap().layout["visibility"],
            json!("none")
        );
    }

    #[tokio::test]
    async fn test_option_callbacks_follow_attachment() {
        let mut renderer = HeadlessRenderer::loaded();
        let mut base = LayerBase::new(
            LayerType::Thematic,
            LayerOptions::new()
                .with_id("districts")
                .on_click(|_| {})
                .on_right_click(|_| {}),
        );
        base.set_source(
            "districts",
            Source::GeoJson {
                data: FeatureCollection::default(),
            },
        );
        base.add_style(
            StyleLayer::new("districts", StyleKind::Fill, "districts"),
            true,
        );

        assert_eq!(base.listeners().count(EventType::Click), 0);
        base.add_to(&mut renderer, &StaticImageLoader::default())
            .await
            .unwrap();
        assert_eq!(base.listeners().count(EventType::Click), 1);
        assert_eq!(base.listeners().count(EventType::ContextMenu), 1);

        base.remove_from(&mut renderer);
        assert_eq!(base.listeners().count(EventType::Click), 0);
        assert_eq!(base.listeners().count(EventType::ContextMenu), 0);
    }

    #[tokio::test]
    async fn test_failed_registration_is_rolled_back() {
        let mut renderer = HeadlessRenderer::loaded();
        let mut base = layer_with_styles("districts");
        base.add_style(
            StyleLayer::new("districts-orphan", StyleKind::Fill, "missing"),
            false,
        );

        let result = base
            .add_to(&mut renderer, &StaticImageLoader::default())
            .await;
        assert!(result.is_err());
        assert!(renderer.style_ids().is_empty());
        assert!(renderer.source_ids().is_empty());
    }

    #[tokio::test]
    async fn test_rollback_spares_other_layers() {
        let mut renderer = HeadlessRenderer::loaded();
        let mut first = layer_with_styles("y-point");
        first
            .add_to(&mut renderer, &StaticImageLoader::default())
            .await
            .unwrap();

        // Registers "y" and "y-hover", then collides on "y-point"
        let mut second = layer_with_styles("y");
        second.add_style(StyleLayer::new("y-point", StyleKind::Circle, "y"), true);

        let result = second
            .add_to(&mut renderer, &StaticImageLoader::default())
            .await;
        assert!(result.is_err());
        assert!(first.is_on_map(&renderer));
        assert!(!second.is_on_map(&renderer));
        assert_eq!(renderer.style_ids(), vec!["y-point", "y-point-hover"]);
        assert_eq!(renderer.source_ids(), vec!["y-point"]);
    }
}
