//! Label source and style builders

use crate::{
    core::constants::{LABEL_COLOR, LABEL_FIELD, LABEL_FONT_SIZE},
    data::geojson::{Feature, FeatureCollection, Geometry},
    layers::style::{Source, StyleKind, StyleLayer},
    MapError, Result,
};
use geo::ChamberlainDuquetteArea;
use geo_types::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Precision of the label point search, in coordinate units
const LABEL_PRECISION: f64 = 0.1;

/// Relative difference below which two part areas count as equal
const AREA_EPSILON: f64 = 1e-9;

/// Label text style as configured by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelStyle {
    /// CSS-like size such as `"14px"`; only the leading integer is used
    pub font_size: Option<String>,
    /// `normal` or `italic`
    pub font_style: Option<String>,
    /// `normal` or `bold`
    pub font_weight: Option<String>,
    pub color: Option<String>,
}

/// Resolves a style/weight combination to a font stack name.
///
/// Missing parts count as `normal`; anything else is rejected.
pub fn font_stack(font_style: Option<&str>, font_weight: Option<&str>) -> Result<&'static str> {
    let style = font_style.unwrap_or("normal");
    let weight = font_weight.unwrap_or("normal");

    match (style, weight) {
        ("italic", "bold") => Ok("Open Sans Bold Italic"),
        ("italic", "normal") => Ok("Open Sans Italic"),
        ("normal", "bold") => Ok("Open Sans Bold"),
        ("normal", "normal") => Ok("Open Sans Regular"),
        _ => Err(MapError::UnknownFont(format!("{}-{}", style, weight))),
    }
}

/// Leading integer of a size like `"14px"` or `"+14"`, or the default size.
///
/// Leading whitespace and one sign are accepted; a value with no digits
/// after them falls back to the default.
pub fn font_size(size: Option<&str>) -> i32 {
    size.and_then(|s| {
        let s = s.trim_start();
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", s.strip_prefix('+').unwrap_or(s)),
        };
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        format!("{}{}", sign, digits).parse().ok()
    })
    .unwrap_or(LABEL_FONT_SIZE)
}

/// Where the label of a geometry goes, as a `[lng, lat]` position.
///
/// Polygons use their pole of inaccessibility, the interior point farthest
/// from the outline; multipolygons that of their largest part by geodesic
/// area. Geometries without an area or point position get no label.
pub fn label_position(geometry: &Geometry) -> Option<[f64; 2]> {
    match geometry {
        Geometry::Point { coordinates } => Some(*coordinates),
        Geometry::Polygon { coordinates } => polygon_label(to_polygon(coordinates)?),
        Geometry::MultiPolygon { coordinates } => {
            let mut largest: Option<(f64, Polygon<f64>)> = None;
            for polygon in coordinates.iter().filter_map(|rings| to_polygon(rings)) {
                let area = polygon.chamberlain_duquette_unsigned_area();
                // Equal areas keep the first part
                if largest
                    .as_ref()
                    .map_or(true, |(max, _)| area - max > max * AREA_EPSILON)
                {
                    largest = Some((area, polygon));
                }
            }
            polygon_label(largest?.1)
        }
        _ => None,
    }
}

fn to_polygon(rings: &[Vec<[f64; 2]>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    Some(Polygon::new(
        LineString::from(exterior.clone()),
        interiors
            .iter()
            .map(|ring| LineString::from(ring.clone()))
            .collect(),
    ))
}

fn polygon_label(polygon: Polygon<f64>) -> Option<[f64; 2]> {
    polylabel::polylabel(&polygon, &LABEL_PRECISION)
        .ok()
        .map(|p| [p.x(), p.y()])
}

/// Point source holding one label anchor per labelable feature
pub fn labels_source(features: &FeatureCollection) -> Source {
    let labels = features
        .features
        .iter()
        .filter_map(|feature| {
            let position = label_position(feature.geometry.as_ref()?)?;
            let mut properties = Map::new();
            properties.insert(
                "name".to_string(),
                feature.property("name").cloned().unwrap_or(Value::Null),
            );
            Some(Feature::new(
                Geometry::Point {
                    coordinates: position,
                },
                properties,
            ))
        })
        .collect();

    Source::GeoJson {
        data: FeatureCollection::new(labels),
    }
}

/// Symbol style painting `<id>-labels`
pub fn labels_style(id: &str, template: Option<&str>, style: &LabelStyle) -> Result<StyleLayer> {
    let font = font_stack(style.font_style.as_deref(), style.font_weight.as_deref())?;
    let labels_id = format!("{}-labels", id);

    Ok(StyleLayer::new(&labels_id, StyleKind::Symbol, &labels_id)
        .layout("text-field", template.unwrap_or(LABEL_FIELD))
        .layout("text-font", json!([font]))
        .layout("text-size", font_size(style.font_size.as_deref()))
        .paint(
            "text-color",
            style.color.as_deref().unwrap_or(LABEL_COLOR),
        ))
}
