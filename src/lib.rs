//! # mapgl
//!
//! A layer controller for style-based map renderers.
//!
//! [`Map`] owns a [`Renderer`] and the layers attached to it. Layers describe
//! themselves as sources and styles; the controller registers them once the
//! base style has loaded, keeps their paint order in line with their index,
//! routes pointer events to the layer under the cursor and tracks the hovered
//! feature.
//!
//! Two layer kinds are provided: [`TileLayer`] for raster tile servers and
//! [`ThematicLayer`] for colored polygons and points with optional labels.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod utils;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::MapOptions,
    geo::{LatLng, LatLngBounds, Point},
    map::{Map, MapState},
};

pub use crate::data::geojson::{Feature, FeatureCollection, Geometry};

pub use crate::input::{
    emitter::{EventCallback, Evented, ListenerId},
    events::{EventType, MapEvent, RendererEvent},
};

pub use crate::layers::{
    base::{Layer, LayerBase, LayerType},
    options::LayerOptions,
    thematic::ThematicLayer,
    tile::TileLayer,
};

pub use crate::rendering::{headless::HeadlessRenderer, renderer::Renderer};

pub use crate::utils::{images::ImageLoader, labels::LabelStyle};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to load image {url}: {reason}")]
    ImageLoad { url: String, reason: String },

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Unknown label font: {0}")]
    UnknownFont(String),

    #[error("Renderer error: {0}")]
    Renderer(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
