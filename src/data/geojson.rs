use crate::core::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// A collection of features, the only root object thematic layers accept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: Some(properties),
        }
    }

    /// Looks up a single property
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// The synthetic integer id, once one has been assigned
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.as_ref().and_then(Value::as_u64)
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounding box of every feature geometry, `None` for an empty collection
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .filter_map(Geometry::bounds)
            .reduce(|acc, b| acc.union(&b))
    }
}

impl FromStr for FeatureCollection {
    type Err = crate::MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
            .map_err(|e| crate::MapError::ParseError(format!("Invalid GeoJSON: {}", e)))
    }
}

impl Geometry {
    pub fn bounds(&self) -> Option<LatLngBounds> {
        match self {
            Geometry::Point { coordinates } => Some(LatLngBounds::from_point(
                LatLng::from_position(*coordinates),
            )),
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                coords_bounds(coordinates)
            }
            // Holes lie inside the exterior ring
            Geometry::Polygon { coordinates } => coordinates.first().and_then(|r| coords_bounds(r)),
            Geometry::MultiLineString { coordinates } => coordinates
                .iter()
                .filter_map(|line| coords_bounds(line))
                .reduce(|acc, b| acc.union(&b)),
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .filter_map(|polygon| polygon.first())
                .filter_map(|exterior| coords_bounds(exterior))
                .reduce(|acc, b| acc.union(&b)),
            Geometry::GeometryCollection { geometries } => geometries
                .iter()
                .filter_map(Geometry::bounds)
                .reduce(|acc, b| acc.union(&b)),
        }
    }
}

fn coords_bounds(coordinates: &[[f64; 2]]) -> Option<LatLngBounds> {
    let (first, rest) = coordinates.split_first()?;
    let mut bounds = LatLngBounds::from_point(LatLng::from_position(*first));

    for coord in rest {
        bounds.extend(&LatLng::from_position(*coord));
    }

    Some(bounds)
}
