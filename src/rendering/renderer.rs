//! The contract a map renderer has to fulfil
//!
//! Rendering, hit-testing and camera control all live behind this trait. The
//! controller is the only component that owns a renderer; layers receive it
//! borrowed for the duration of a single call.

use crate::{
    core::geo::{LatLng, LatLngBounds, Point},
    data::geojson::Geometry,
    layers::style::{Source, StyleLayer},
    Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-feature renderer state addressed by (source id, feature id)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureState {
    pub hover: bool,
}

/// Compound key identifying a rendered feature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureKey {
    pub source: String,
    pub id: Option<u64>,
}

/// A feature returned by a rendered-features query
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub id: Option<u64>,
    pub source: String,
    /// Id of the style the feature was rendered by
    pub layer_id: String,
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

impl RenderedFeature {
    pub fn key(&self) -> FeatureKey {
        FeatureKey {
            source: self.source.clone(),
            id: self.id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

pub trait Renderer: Send {
    fn add_source(&mut self, id: &str, source: &Source) -> Result<()>;

    fn remove_source(&mut self, id: &str) -> Result<()>;

    fn has_source(&self, id: &str) -> bool;

    /// Adds a style on top of every existing style
    fn add_style(&mut self, style: &StyleLayer) -> Result<()>;

    fn remove_style(&mut self, id: &str) -> Result<()>;

    fn has_style(&self, id: &str) -> bool;

    /// Moves a style above every other style
    fn move_style_to_top(&mut self, id: &str) -> Result<()>;

    fn has_image(&self, name: &str) -> bool;

    fn add_image(&mut self, name: &str, image: image::RgbaImage) -> Result<()>;

    /// Features rendered within `radius` pixels of `point` by any of `style_ids`,
    /// top-most first
    fn query_rendered_features(
        &self,
        point: Point,
        radius: f64,
        style_ids: &[String],
    ) -> Vec<RenderedFeature>;

    fn set_feature_state(&mut self, source: &str, id: u64, state: FeatureState) -> Result<()>;

    fn feature_state(&self, source: &str, id: u64) -> Option<FeatureState>;

    fn set_paint_property(&mut self, style_id: &str, name: &str, value: Value) -> Result<()>;

    fn paint_property(&self, style_id: &str, name: &str) -> Option<Value>;

    fn set_layout_property(&mut self, style_id: &str, name: &str, value: Value) -> Result<()>;

    /// Starts loading the base style; completion arrives as the style load event
    fn load_style(&mut self, url: &str);

    /// Synchronous counterpart of the one-time style load event
    fn is_style_loaded(&self) -> bool;

    fn set_cursor(&mut self, cursor: Cursor);

    fn set_center(&mut self, center: LatLng);

    fn set_zoom(&mut self, zoom: f64);

    fn fit_bounds(&mut self, bounds: &LatLngBounds);

    fn resize(&mut self);
}
