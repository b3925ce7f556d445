//! Prelude module for common mapgl types and traits
//!
//! Re-exports what a host needs to build a map and attach layers with
//! `use mapgl::prelude::*;`

pub use crate::core::{
    config::MapOptions,
    geo::{LatLng, LatLngBounds, Point},
    map::{Map, MapState},
    scheduler::ScheduledTask,
};

pub use crate::data::geojson::{Feature, FeatureCollection, Geometry};

pub use crate::input::{
    emitter::{EventCallback, Evented, ListenerId},
    events::{EventType, MapEvent, RendererEvent},
};

pub use crate::layers::{
    base::{Layer, LayerBase, LayerType},
    options::LayerOptions,
    style::{Source, StyleKind, StyleLayer},
    thematic::ThematicLayer,
    tile::TileLayer,
};

pub use crate::rendering::{
    headless::HeadlessRenderer,
    renderer::{Cursor, FeatureKey, FeatureState, RenderedFeature, Renderer},
};

pub use crate::utils::{
    images::{HttpImageLoader, ImageLoader},
    labels::LabelStyle,
};

pub use crate::{MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
