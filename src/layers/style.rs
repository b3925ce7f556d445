//! Declarative source and style descriptors
//!
//! These serialize to the renderer's JSON style format, so a renderer
//! binding can forward them untouched.

use crate::data::geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A data source consumed by one or more styles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Source {
    #[serde(rename = "raster")]
    Raster {
        tiles: Vec<String>,
        #[serde(rename = "tileSize")]
        tile_size: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    #[serde(rename = "geojson")]
    GeoJson { data: FeatureCollection },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    Fill,
    Circle,
    Line,
    Symbol,
    Raster,
}

/// How a source is painted: filter, paint and layout properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StyleKind,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Value>,
}

impl StyleLayer {
    pub fn new(id: impl Into<String>, kind: StyleKind, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            source: source.into(),
            filter: None,
            paint: Map::new(),
            layout: Map::new(),
        }
    }

    /// Restricts the style to one GeoJSON geometry type
    pub fn geometry_filter(mut self, geometry_type: &str) -> Self {
        self.filter = Some(serde_json::json!(["==", "$type", geometry_type]));
        self
    }

    pub fn paint(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.paint.insert(name.to_string(), value.into());
        self
    }

    pub fn layout(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.layout.insert(name.to_string(), value.into());
        self
    }
}
