//! Choropleth and point layer built from a GeoJSON feature collection
//!
//! Polygons are filled with the feature's `color` property, points drawn as
//! circles sized by `radius`. Two outline styles render the hover state kept
//! by the controller, and an optional symbol style draws labels from a
//! derived point source.

use crate::{
    core::constants::{BORDER_COLOR, BORDER_WEIGHT, HOVER_BORDER_WEIGHT},
    impl_layer_base, layer_accessors,
    layers::{
        base::{Layer, LayerBase, LayerType},
        options::LayerOptions,
        style::{Source, StyleKind, StyleLayer},
    },
    rendering::renderer::Renderer,
    utils::labels::{labels_source, labels_style},
    Result,
};
use serde_json::{json, Value};

#[derive(Debug)]
pub struct ThematicLayer {
    base: LayerBase,
}

impl ThematicLayer {
    /// Fails when the label style asks for a font that does not exist
    pub fn new(options: LayerOptions) -> Result<Self> {
        let data = options.data.clone();
        let mut layer = Self {
            base: LayerBase::new(LayerType::Thematic, options),
        };
        layer.base.set_features(data);
        layer.create_source();
        layer.create_layers()?;
        Ok(layer)
    }

    pub fn labels_id(&self) -> String {
        format!("{}-labels", self.base.id())
    }

    pub fn has_labels(&self) -> bool {
        self.base.options().label
    }

    pub fn create_source(&mut self) {
        let id = self.base.id().to_string();
        let features = self.base.features().clone();

        if self.has_labels() {
            let labels = labels_source(&features);
            self.base.set_source(id.clone(), Source::GeoJson { data: features });
            self.base.set_source(self.labels_id(), labels);
        } else {
            self.base.set_source(id, Source::GeoJson { data: features });
        }
    }

    pub fn create_layers(&mut self) -> Result<()> {
        let id = self.base.id().to_string();

        self.base.add_style(
            StyleLayer::new(&id, StyleKind::Fill, &id)
                .geometry_filter("Polygon")
                .paint("fill-color", json!(["get", "color"]))
                .paint("fill-outline-color", BORDER_COLOR),
            true,
        );

        self.base.add_style(
            StyleLayer::new(format!("{}-point", id), StyleKind::Circle, &id)
                .geometry_filter("Point")
                .paint("circle-color", json!(["get", "color"]))
                .paint("circle-radius", json!(["get", "radius"]))
                .paint("circle-stroke-color", BORDER_COLOR)
                .paint("circle-stroke-width", BORDER_WEIGHT),
            true,
        );

        // Outlines only render hover state and never receive events
        self.base.add_style(
            StyleLayer::new(format!("{}-hover", id), StyleKind::Line, &id)
                .geometry_filter("Polygon")
                .paint("line-color", BORDER_COLOR)
                .paint("line-width", hover_width()),
            false,
        );

        self.base.add_style(
            StyleLayer::new(format!("{}-point-hover", id), StyleKind::Circle, &id)
                .geometry_filter("Point")
                .paint("circle-opacity", 0)
                .paint("circle-radius", json!(["get", "radius"]))
                .paint("circle-stroke-color", BORDER_COLOR)
                .paint("circle-stroke-width", hover_width()),
            false,
        );

        if self.has_labels() {
            let options = self.base.options();
            let style = labels_style(
                &id,
                options.label_template.as_deref(),
                &options.label_style,
            )?;
            self.base.add_style(style, false);
        }

        Ok(())
    }
}

/// Wider outline while the feature state `hover` is set
fn hover_width() -> Value {
    json!([
        "case",
        ["boolean", ["feature-state", "hover"], false],
        HOVER_BORDER_WEIGHT,
        BORDER_WEIGHT
    ])
}

impl_layer_base!(ThematicLayer, base);

impl Layer for ThematicLayer {
    layer_accessors!(base);

    fn set_opacity(&mut self, renderer: &mut dyn Renderer, opacity: f64) -> Result<()> {
        if !self.base.is_on_map(renderer) {
            return Ok(());
        }

        renderer.set_paint_property(self.base.id(), "fill-opacity", json!(opacity))?;

        if self.has_labels() {
            renderer.set_paint_property(&self.labels_id(), "text-opacity", json!(opacity))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::geojson::{Feature, Geometry},
        rendering::headless::HeadlessRenderer,
        utils::{
            images::tests::StaticImageLoader,
            labels::{label_position, LabelStyle},
        },
        MapError,
    };
    use serde_json::Map;

    fn polygon(name: &str, color: &str, x: f64) -> Feature {
        let mut properties = Map::new();
        properties.insert("name".to_string(), json!(name));
        properties.insert("color".to_string(), json!(color));
        Feature::new(
            Geometry::Polygon {
                coordinates: vec![vec![
                    [x, 0.0],
                    [x + 2.0, 0.0],
                    [x + 2.0, 2.0],
                    [x, 2.0],
                    [x, 0.0],
                ]],
            },
            properties,
        )
    }

    fn labelled_options() -> LayerOptions {
        LayerOptions::new()
            .with_id("districts")
            .with_data(vec![
                polygon("Bo", "#ff0000", 0.0),
                polygon("Kenema", "#00ff00", 5.0),
            ])
            .with_label(LabelStyle::default())
    }

    #[test]
    fn test_labelled_layer_sources() {
        let layer = ThematicLayer::new(labelled_options()).unwrap();
        let base = layer.base();

        let ids: Vec<_> = base.sources().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["districts", "districts-labels"]);

        match base.source("districts") {
            Some(Source::GeoJson { data }) => {
                assert_eq!(data.len(), 2);
                assert_eq!(data.features[0].property("color"), Some(&json!("#ff0000")));
                assert_eq!(data.features[1].property("color"), Some(&json!("#00ff00")));
                assert_eq!(data.features[1].numeric_id(), Some(1));
            }
            other => panic!("unexpected source {:?}", other),
        }

        match base.source("districts-labels") {
            Some(Source::GeoJson { data }) => {
                assert_eq!(data.len(), 2);
                for (label, feature) in data.features.iter().zip(&base.features().features) {
                    let expected = label_position(feature.geometry.as_ref().unwrap()).unwrap();
                    assert_eq!(
                        label.geometry,
                        Some(Geometry::Point {
                            coordinates: expected
                        })
                    );
                    assert_eq!(label.property("name"), feature.property("name"));
                }
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_labelled_layer_styles() {
        let layer = ThematicLayer::new(labelled_options()).unwrap();
        let ids: Vec<_> = layer.base().styles().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "districts",
                "districts-point",
                "districts-hover",
                "districts-point-hover",
                "districts-labels"
            ]
        );
    }

    #[test]
    fn test_unlabelled_layer() {
        let layer = ThematicLayer::new(
            LayerOptions::new()
                .with_id("facilities")
                .with_data(vec![polygon("Bo", "#ff0000", 0.0)]),
        )
        .unwrap();

        assert_eq!(layer.base().sources().len(), 1);
        assert_eq!(layer.base().styles().len(), 4);
    }

    #[test]
    fn test_unknown_font_fails_construction() {
        let options = labelled_options().with_label(LabelStyle {
            font_style: Some("oblique".to_string()),
            ..LabelStyle::default()
        });
        assert!(matches!(
            ThematicLayer::new(options),
            Err(MapError::UnknownFont(_))
        ));
    }

    #[tokio::test]
    async fn test_hover_styles_are_not_interactive() {
        let mut renderer = HeadlessRenderer::loaded();
        let mut layer = ThematicLayer::new(labelled_options()).unwrap();
        layer
            .base_mut()
            .add_to(&mut renderer, &StaticImageLoader::default())
            .await
            .unwrap();

        assert_eq!(
            layer.base().interactive_ids(&renderer),
            ["districts".to_string(), "districts-point".to_string()]
        );
    }

    #[tokio::test]
    async fn test_set_opacity() {
        let mut renderer = HeadlessRenderer::loaded();
        let mut layer = ThematicLayer::new(labelled_options()).unwrap();
        layer
            .base_mut()
            .add_to(&mut renderer, &StaticImageLoader::default())
            .await
            .unwrap();

        layer.set_opacity(&mut renderer, 0.25).unwrap();
        assert_eq!(
            renderer.paint_property("districts", "fill-opacity"),
            Some(json!(0.25))
        );
        assert_eq!(
            renderer.paint_property("districts-labels", "text-opacity"),
            Some(json!(0.25))
        );
    }
}
