//! Configuration for the map controller
//!
//! `MapOptions` carries the values handed to the renderer at construction
//! time together with the controller's own timing and hit-testing knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::constants::{
    DEFAULT_HIT_TOLERANCE, DEFAULT_MAX_ZOOM, DEFAULT_REORDER_DELAY_MS, DEFAULT_STYLE_URL,
    DEFAULT_ZOOM,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Identifier of the host element the renderer draws into
    pub container: String,
    /// Base style loaded by the renderer before any layer can be attached
    pub style: String,
    pub zoom: f64,
    pub max_zoom: f64,
    /// Delay between attaching a layer and the follow-up reorder pass
    #[serde(with = "duration_ms")]
    pub reorder_delay: Duration,
    /// Pixel radius used when querying rendered features under the pointer
    pub hit_tolerance: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            container: String::new(),
            style: DEFAULT_STYLE_URL.to_string(),
            zoom: DEFAULT_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            reorder_delay: Duration::from_millis(DEFAULT_REORDER_DELAY_MS),
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
        }
    }
}

impl MapOptions {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_reorder_delay(mut self, delay: Duration) -> Self {
        self.reorder_delay = delay;
        self
    }

    pub fn with_hit_tolerance(mut self, pixels: f64) -> Self {
        self.hit_tolerance = pixels.max(0.0);
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
