//! In-memory renderer
//!
//! Keeps sources, styles, images and feature state in plain collections and
//! answers hit-test queries from features placed with [`HeadlessRenderer::place_feature`].
//! Useful for tests and for driving the controller without a display.

use crate::{
    core::geo::{LatLng, LatLngBounds, Point},
    layers::style::{Source, StyleLayer},
    prelude::HashMap,
    rendering::renderer::{Cursor, FeatureState, RenderedFeature, Renderer},
    MapError, Result,
};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    sources: Vec<(String, Source)>,
    /// Bottom to top paint order
    styles: Vec<StyleLayer>,
    images: HashMap<String, image::RgbaImage>,
    feature_states: HashMap<(String, u64), FeatureState>,
    placed: Vec<(Point, RenderedFeature)>,
    style_url: Option<String>,
    style_loaded: bool,
    cursor: Cursor,
    center: LatLng,
    zoom: f64,
    fitted: Option<LatLngBounds>,
    resizes: usize,
    moves: Vec<String>,
    feature_state_writes: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer whose base style has already finished loading
    pub fn loaded() -> Self {
        Self {
            style_loaded: true,
            ..Self::default()
        }
    }

    /// Marks the base style as loaded; the host then forwards the style load event
    pub fn finish_style_load(&mut self) {
        self.style_loaded = true;
    }

    /// Places a feature on screen so pointer queries at `at` can hit it
    pub fn place_feature(&mut self, at: Point, feature: RenderedFeature) {
        self.placed.push((at, feature));
    }

    pub fn clear_placed(&mut self) {
        self.placed.clear();
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|(s, _)| s == id).map(|(_, s)| s)
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn style(&self, id: &str) -> Option<&StyleLayer> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Style ids, bottom to top
    pub fn style_ids(&self) -> Vec<&str> {
        self.styles.iter().map(|s| s.id.as_str()).collect()
    }

    /// Every style id passed to `move_style_to_top`, in call order
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn clear_moves(&mut self) {
        self.moves.clear();
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// (source, feature id) pairs currently flagged as hovered
    pub fn hovered(&self) -> Vec<(String, u64)> {
        let mut hovered: Vec<_> = self
            .feature_states
            .iter()
            .filter(|(_, state)| state.hover)
            .map(|(key, _)| key.clone())
            .collect();
        hovered.sort();
        hovered
    }

    pub fn feature_state_writes(&self) -> usize {
        self.feature_state_writes
    }

    /// Base style requested through `load_style`
    pub fn style_url(&self) -> Option<&str> {
        self.style_url.as_deref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn fitted_bounds(&self) -> Option<LatLngBounds> {
        self.fitted
    }

    pub fn resize_count(&self) -> usize {
        self.resizes
    }

    fn style_mut(&mut self, id: &str) -> Result<&mut StyleLayer> {
        self.styles
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| MapError::Renderer(format!("style '{}' does not exist", id)))
    }
}

impl Renderer for HeadlessRenderer {
    fn add_source(&mut self, id: &str, source: &Source) -> Result<()> {
        if self.has_source(id) {
            return Err(MapError::Renderer(format!("source '{}' already exists", id)));
        }
        self.sources.push((id.to_string(), source.clone()));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        if self.styles.iter().any(|s| s.source == id) {
            return Err(MapError::Renderer(format!(
                "source '{}' is still used by a style",
                id
            )));
        }
        let before = self.sources.len();
        self.sources.retain(|(s, _)| s != id);
        if self.sources.len() == before {
            return Err(MapError::Renderer(format!("source '{}' does not exist", id)));
        }
        self.feature_states.retain(|(source, _), _| source != id);
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.iter().any(|(s, _)| s == id)
    }

    fn add_style(&mut self, style: &StyleLayer) -> Result<()> {
        if self.has_style(&style.id) {
            return Err(MapError::Renderer(format!(
                "style '{}' already exists",
                style.id
            )));
        }
        if !self.has_source(&style.source) {
            return Err(MapError::Renderer(format!(
                "style '{}' references missing source '{}'",
                style.id, style.source
            )));
        }
        self.styles.push(style.clone());
        Ok(())
    }

    fn remove_style(&mut self, id: &str) -> Result<()> {
        let position = self
            .styles
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| MapError::Renderer(format!("style '{}' does not exist", id)))?;
        self.styles.remove(position);
        Ok(())
    }

    fn has_style(&self, id: &str) -> bool {
        self.styles.iter().any(|s| s.id == id)
    }

    fn move_style_to_top(&mut self, id: &str) -> Result<()> {
        let position = self
            .styles
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| MapError::Renderer(format!("style '{}' does not exist", id)))?;
        let style = self.styles.remove(position);
        self.styles.push(style);
        self.moves.push(id.to_string());
        Ok(())
    }

    fn has_image(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    fn add_image(&mut self, name: &str, image: image::RgbaImage) -> Result<()> {
        self.images.insert(name.to_string(), image);
        Ok(())
    }

    fn query_rendered_features(
        &self,
        point: Point,
        radius: f64,
        style_ids: &[String],
    ) -> Vec<RenderedFeature> {
        let mut hits = Vec::new();

        for style in self.styles.iter().rev() {
            if !style_ids.contains(&style.id) {
                continue;
            }
            hits.extend(
                self.placed
                    .iter()
                    .filter(|(at, f)| f.layer_id == style.id && at.distance_to(&point) <= radius)
                    .map(|(_, f)| f.clone()),
            );
        }

        hits
    }

    fn set_feature_state(&mut self, source: &str, id: u64, state: FeatureState) -> Result<()> {
        if !self.has_source(source) {
            return Err(MapError::Renderer(format!(
                "source '{}' does not exist",
                source
            )));
        }
        self.feature_state_writes += 1;
        self.feature_states.insert((source.to_string(), id), state);
        Ok(())
    }

    fn feature_state(&self, source: &str, id: u64) -> Option<FeatureState> {
        self.feature_states.get(&(source.to_string(), id)).copied()
    }

    fn set_paint_property(&mut self, style_id: &str, name: &str, value: Value) -> Result<()> {
        self.style_mut(style_id)?.paint.insert(name.to_string(), value);
        Ok(())
    }

    fn paint_property(&self, style_id: &str, name: &str) -> Option<Value> {
        self.style(style_id).and_then(|s| s.paint.get(name).cloned())
    }

    fn set_layout_property(&mut self, style_id: &str, name: &str, value: Value) -> Result<()> {
        self.style_mut(style_id)?.layout.insert(name.to_string(), value);
        Ok(())
    }

    fn load_style(&mut self, url: &str) {
        self.style_url = Some(url.to_string());
    }

    fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        self.fitted = Some(*bounds);
    }

    fn resize(&mut self) {
        self.resizes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::style::StyleKind;

    fn raster() -> Source {
        Source::Raster {
            tiles: vec!["https://tiles/{z}/{x}/{y}.png".to_string()],
            tile_size: 256,
            attribution: None,
        }
    }

    #[test]
    fn test_style_requires_source() {
        let mut renderer = HeadlessRenderer::loaded();
        let style = StyleLayer::new("osm", StyleKind::Raster, "osm");

        assert!(renderer.add_style(&style).is_err());
        renderer.add_source("osm", &raster()).unwrap();
        renderer.add_style(&style).unwrap();
        assert!(renderer.has_style("osm"));
    }

    #[test]
    fn test_source_in_use_cannot_be_removed() {
        let mut renderer = HeadlessRenderer::loaded();
        renderer.add_source("osm", &raster()).unwrap();
        renderer
            .add_style(&StyleLayer::new("osm", StyleKind::Raster, "osm"))
            .unwrap();

        assert!(renderer.remove_source("osm").is_err());
        renderer.remove_style("osm").unwrap();
        renderer.remove_source("osm").unwrap();
        assert!(renderer.source_ids().is_empty());
    }

    #[test]
    fn test_query_returns_top_most_first() {
        let mut renderer = HeadlessRenderer::loaded();
        renderer.add_source("s", &raster()).unwrap();
        renderer
            .add_style(&StyleLayer::new("below", StyleKind::Raster, "s"))
            .unwrap();
        renderer
            .add_style(&StyleLayer::new("above", StyleKind::Raster, "s"))
            .unwrap();

        for layer_id in ["below", "above"] {
            renderer.place_feature(
                Point::new(10.0, 10.0),
                RenderedFeature {
                    id: Some(0),
                    source: "s".to_string(),
                    layer_id: layer_id.to_string(),
                    geometry: None,
                    properties: Default::default(),
                },
            );
        }

        let ids = vec!["below".to_string(), "above".to_string()];
        let hits = renderer.query_rendered_features(Point::new(10.0, 10.0), 0.0, &ids);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].layer_id, "above");

        let miss = renderer.query_rendered_features(Point::new(50.0, 10.0), 5.0, &ids);
        assert!(miss.is_empty());
    }
}
