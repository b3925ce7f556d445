use crate::{
    core::{
        config::MapOptions,
        geo::{LatLng, LatLngBounds, Point},
        scheduler::ScheduledTask,
    },
    input::{
        emitter::{EventListeners, Evented},
        events::{MapEvent, RendererEvent},
    },
    layers::base::Layer,
    rendering::renderer::{Cursor, FeatureKey, FeatureState, RenderedFeature, Renderer},
    utils::images::{HttpImageLoader, ImageLoader},
    Result,
};
use instant::Instant;
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    /// Renderer created, base style still loading
    Constructed,
    /// Base style loaded; layers attach immediately
    StyleReady,
}

/// Owns the renderer and the layers attached to it.
///
/// Layers added before the renderer's base style has loaded are queued and
/// attached on [`RendererEvent::StyleLoad`]. Pointer events passed to
/// [`Map::handle_event`] are resolved against interactive layers and emitted
/// on the layer that owns the hit style.
pub struct Map<R: Renderer> {
    renderer: R,
    options: MapOptions,
    /// Attached layers; sorted by index after each reorder pass
    layers: Vec<Box<dyn Layer>>,
    /// Layers waiting for the base style
    pending: Vec<Box<dyn Layer>>,
    ready: bool,
    hover: Option<FeatureKey>,
    reorder: Option<ScheduledTask>,
    image_loader: Box<dyn ImageLoader>,
    listeners: EventListeners,
}

impl<R: Renderer> Map<R> {
    pub fn new(mut renderer: R, options: MapOptions) -> Self {
        renderer.load_style(&options.style);
        renderer.set_zoom(options.zoom.min(options.max_zoom));
        info!(
            "Map created in '{}' with style {}",
            options.container, options.style
        );

        Self {
            renderer,
            options,
            layers: Vec::new(),
            pending: Vec::new(),
            ready: false,
            hover: None,
            reorder: None,
            image_loader: Box::new(HttpImageLoader::new()),
            listeners: EventListeners::new(),
        }
    }

    pub fn with_image_loader(mut self, loader: impl ImageLoader + 'static) -> Self {
        self.image_loader = Box::new(loader);
        self
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn container(&self) -> &str {
        &self.options.container
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Once true, stays true
    pub fn is_map_ready(&self) -> bool {
        self.ready || self.renderer.is_style_loaded()
    }

    pub fn state(&self) -> MapState {
        if self.is_map_ready() {
            MapState::StyleReady
        } else {
            MapState::Constructed
        }
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.renderer.set_center(center);
        self.renderer.set_zoom(zoom.min(self.options.max_zoom));
    }

    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        self.renderer.fit_bounds(bounds);
    }

    pub fn resize(&mut self) {
        self.renderer.resize();
    }

    /// Attaches a layer, or queues it until the base style has loaded.
    ///
    /// Does nothing when a layer with the same id is already on the map. A
    /// failed attachment (for instance an image that cannot be loaded) leaves
    /// nothing registered and the layer untracked.
    pub async fn add_layer(&mut self, layer: Box<dyn Layer>) -> Result<()> {
        if layer.base().is_on_map(&self.renderer) {
            debug!("Layer {} is already on the map", layer.id());
            return Ok(());
        }

        if self.is_map_ready() {
            self.ready = true;
            self.attach(layer).await
        } else {
            debug!("Queueing layer {} until the style has loaded", layer.id());
            self.pending.push(layer);
            Ok(())
        }
    }

    async fn attach(&mut self, mut layer: Box<dyn Layer>) -> Result<()> {
        layer
            .base_mut()
            .add_to(&mut self.renderer, self.image_loader.as_ref())
            .await?;

        info!("Layer {} added with index {}", layer.id(), layer.index());
        self.layers.push(layer);
        self.reorder = Some(ScheduledTask::after(self.options.reorder_delay));
        Ok(())
    }

    /// Detaches and returns a layer; pending layers are simply dequeued
    pub fn remove_layer(&mut self, id: &str) -> Option<Box<dyn Layer>> {
        if let Some(position) = self.pending.iter().position(|l| l.id() == id) {
            return Some(self.pending.remove(position));
        }

        let position = self.layers.iter().position(|l| l.id() == id)?;
        let mut layer = self.layers.remove(position);

        if layer.base().is_on_map(&self.renderer) {
            layer.base_mut().remove_from(&mut self.renderer);
        }

        // The hovered feature's source is gone with the layer
        if let Some(hover) = &self.hover {
            if layer.base().owns_source(&hover.source) {
                self.hover = None;
                self.renderer.set_cursor(Cursor::Default);
            }
        }

        if self.layers.is_empty() {
            self.cancel_pending_reorder();
        }

        info!("Layer {} removed", id);
        Some(layer)
    }

    pub fn layer(&self, id: &str) -> Option<&dyn Layer> {
        self.layers
            .iter()
            .find(|l| l.id() == id)
            .map(|l| l.as_ref())
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut (dyn Layer + 'static)> {
        self.layers
            .iter_mut()
            .find(|l| l.id() == id)
            .map(|l| l.as_mut())
    }

    /// Looks up a layer by id and concrete type
    pub fn layer_as<T: Layer + 'static>(&self, id: &str) -> Option<&T> {
        self.layer(id).and_then(|l| l.as_any().downcast_ref::<T>())
    }

    /// Attached layers in tracked order
    pub fn layers(&self) -> impl Iterator<Item = &dyn Layer> {
        self.layers.iter().map(|l| l.as_ref())
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id()).collect()
    }

    pub fn pending_layer_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_layer_on_map(&self, id: &str) -> bool {
        self.layer(id)
            .map_or(false, |l| l.base().is_on_map(&self.renderer))
    }

    pub fn set_layer_opacity(&mut self, id: &str, opacity: f64) -> Result<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or_else(|| crate::MapError::LayerNotFound(id.to_string()))?;
        layer.set_opacity(&mut self.renderer, opacity)
    }

    pub fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or_else(|| crate::MapError::LayerNotFound(id.to_string()))?;
        layer.base_mut().set_visibility(&mut self.renderer, visible)
    }

    /// Changes a layer's index and reorders the map
    pub fn set_layer_index(&mut self, id: &str, index: i32) -> Result<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or_else(|| crate::MapError::LayerNotFound(id.to_string()))?;
        layer.base_mut().set_index(index);
        self.order_layers()?;
        Ok(())
    }

    /// Brings the renderer's paint order in line with the layer indices.
    ///
    /// When the tracked layers are not already sorted by index, they are
    /// stably sorted and every layer is moved to the top in turn, since the
    /// renderer paints the most recently moved style last. Returns whether
    /// anything moved.
    pub fn order_layers(&mut self) -> Result<bool> {
        let sorted = self
            .layers
            .windows(2)
            .all(|pair| pair[0].index() <= pair[1].index());
        if sorted {
            return Ok(false);
        }

        self.layers.sort_by_key(|l| l.index());

        for layer in &self.layers {
            if layer.base().is_on_map(&self.renderer) {
                layer.base().move_to_top(&mut self.renderer)?;
            }
        }

        debug!("Reordered layers: {:?}", self.layer_ids());
        Ok(true)
    }

    /// Deadline of the deferred reorder pass, if one is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        self.reorder.map(|task| task.due())
    }

    pub fn cancel_pending_reorder(&mut self) -> bool {
        self.reorder.take().is_some()
    }

    /// Runs the deferred reorder pass if it is due at `now`
    pub fn run_pending(&mut self, now: Instant) -> Result<bool> {
        match self.reorder {
            Some(task) if task.is_due(now) => {
                self.reorder = None;
                self.order_layers()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Waits for the deferred reorder pass and runs it
    #[cfg(feature = "tokio-runtime")]
    pub async fn settle(&mut self) -> Result<()> {
        while let Some(task) = self.reorder {
            tokio::time::sleep(task.remaining(Instant::now())).await;
            self.run_pending(Instant::now())?;
        }
        Ok(())
    }

    /// Feeds a renderer event into the controller
    pub async fn handle_event(&mut self, event: RendererEvent) -> Result<()> {
        match event {
            RendererEvent::StyleLoad => self.on_style_load().await,
            RendererEvent::Click { lat_lng, point } => {
                self.on_click(lat_lng, point);
                Ok(())
            }
            RendererEvent::ContextMenu { lat_lng, point } => {
                self.on_context_menu(lat_lng, point);
                Ok(())
            }
            RendererEvent::MouseMove { point, .. } => self.on_mouse_move(point),
        }
    }

    async fn on_style_load(&mut self) -> Result<()> {
        self.ready = true;

        let mut first_error = None;
        for layer in std::mem::take(&mut self.pending) {
            if layer.base().is_on_map(&self.renderer) {
                continue;
            }
            let id = layer.id().to_string();
            if let Err(e) = self.attach(layer).await {
                warn!("Failed to attach queued layer {}: {}", id, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn interactive_ids(&self) -> Vec<String> {
        self.layers
            .iter()
            .flat_map(|l| l.base().interactive_ids(&self.renderer).iter().cloned())
            .collect()
    }

    /// Top-most feature rendered by an interactive layer at `point`
    pub fn feature_at(&self, point: Point) -> Option<RenderedFeature> {
        let ids = self.interactive_ids();
        if ids.is_empty() {
            return None;
        }
        self.renderer
            .query_rendered_features(point, self.options.hit_tolerance, &ids)
            .into_iter()
            .next()
    }

    fn owner_of(&self, style_id: &str) -> Option<&dyn Layer> {
        self.layers
            .iter()
            .find(|l| l.base().has_style_id(style_id))
            .map(|l| l.as_ref())
    }

    fn on_click(&self, lat_lng: LatLng, point: Point) {
        let Some(feature) = self.feature_at(point) else {
            return;
        };

        if let Some(layer) = self.owner_of(&feature.layer_id) {
            layer.emit(&MapEvent::Click {
                lat_lng,
                point,
                feature,
            });
        }
    }

    fn on_context_menu(&self, lat_lng: LatLng, point: Point) {
        let feature = self.feature_at(point);
        let owner = feature.as_ref().and_then(|f| self.owner_of(&f.layer_id));
        let event = MapEvent::ContextMenu {
            lat_lng,
            point,
            feature,
        };

        match owner {
            Some(layer) => layer.emit(&event),
            None => self.emit(&event),
        };
    }

    fn on_mouse_move(&mut self, point: Point) -> Result<()> {
        let feature = self.feature_at(point);
        let key = feature.as_ref().map(RenderedFeature::key);

        if key == self.hover {
            return Ok(());
        }

        if let Some(previous) = self.hover.take() {
            if let Some(id) = previous.id {
                if self.renderer.has_source(&previous.source) {
                    self.renderer
                        .set_feature_state(&previous.source, id, FeatureState { hover: false })?;
                }
            }
        }

        if let Some(current) = &key {
            if let Some(id) = current.id {
                self.renderer
                    .set_feature_state(&current.source, id, FeatureState { hover: true })?;
            }
        }

        debug!("Hovered feature changed to {:?}", key);
        self.renderer.set_cursor(if key.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        });
        self.hover = key;
        Ok(())
    }

    /// Feature currently flagged as hovered
    pub fn hovered(&self) -> Option<&FeatureKey> {
        self.hover.as_ref()
    }
}

impl<R: Renderer> Evented for Map<R> {
    fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut EventListeners {
        &mut self.listeners
    }
}
