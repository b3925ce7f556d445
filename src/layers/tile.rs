use crate::{
    core::constants::{TILE_SIZE, TILE_SUBDOMAINS},
    impl_layer_base, layer_accessors,
    layers::{
        base::{Layer, LayerBase, LayerType},
        options::LayerOptions,
        style::{Source, StyleKind, StyleLayer},
    },
    rendering::renderer::Renderer,
    MapError, Result,
};
use serde_json::json;

/// A raster layer fed by a tile server
#[derive(Debug)]
pub struct TileLayer {
    base: LayerBase,
}

impl TileLayer {
    /// Builds the raster source and style from `options.url`
    pub fn new(options: LayerOptions) -> Result<Self> {
        let url = options
            .url
            .clone()
            .ok_or_else(|| MapError::Layer("tile layer requires a url".to_string()))?;
        let attribution = options.attribution.clone();

        let mut layer = Self {
            base: LayerBase::new(LayerType::Tile, options),
        };
        layer.create_source(&url, attribution.as_deref());
        layer.create_layer();
        Ok(layer)
    }

    /// Convenience constructor for a tile URL template
    pub fn from_url(id: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        Self::new(LayerOptions::new().with_id(id).with_url(url))
    }

    pub fn create_source(&mut self, url: &str, attribution: Option<&str>) {
        let id = self.base.id().to_string();
        self.base.set_source(
            id,
            Source::Raster {
                tiles: expand_subdomains(url),
                tile_size: TILE_SIZE,
                attribution: attribution.map(str::to_string),
            },
        );
    }

    pub fn create_layer(&mut self) {
        let id = self.base.id().to_string();
        self.base
            .add_style(StyleLayer::new(&id, StyleKind::Raster, &id), false);
    }
}

/// Expands a `{s}` placeholder into one URL per subdomain
pub fn expand_subdomains(url: &str) -> Vec<String> {
    if url.contains("{s}") {
        TILE_SUBDOMAINS
            .iter()
            .map(|subdomain| url.replacen("{s}", subdomain, 1))
            .collect()
    } else {
        vec![url.to_string()]
    }
}

impl_layer_base!(TileLayer, base);

impl Layer for TileLayer {
    layer_accessors!(base);

    fn set_opacity(&mut self, renderer: &mut dyn Renderer, opacity: f64) -> Result<()> {
        if !self.base.is_on_map(renderer) {
            return Ok(());
        }
        renderer.set_paint_property(self.base.id(), "raster-opacity", json!(opacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::headless::HeadlessRenderer;
    use crate::utils::images::tests::StaticImageLoader;

    #[test]
    fn test_expand_subdomains() {
        assert_eq!(
            expand_subdomains("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"),
            vec![
                "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png",
                "https://b.tile.openstreetmap.org/{z}/{x}/{y}.png",
                "https://c.tile.openstreetmap.org/{z}/{x}/{y}.png",
            ]
        );
        assert_eq!(
            expand_subdomains("https://tiles.example.org/{z}/{x}/{y}.png"),
            vec!["https://tiles.example.org/{z}/{x}/{y}.png"]
        );
    }

    #[test]
    fn test_tile_layer_descriptors() {
        let layer = TileLayer::new(
            LayerOptions::new()
                .with_id("osm")
                .with_url("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")
                .with_attribution("© OpenStreetMap contributors"),
        )
        .unwrap();

        let base = layer.base();
        assert_eq!(base.layer_type(), LayerType::Tile);
        match base.source("osm") {
            Some(Source::Raster {
                tiles,
                tile_size,
                attribution,
            }) => {
                assert_eq!(tiles.len(), 3);
                assert_eq!(*tile_size, 256);
                assert_eq!(attribution.as_deref(), Some("© OpenStreetMap contributors"));
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(base.styles().len(), 1);
        assert_eq!(base.styles()[0].kind, StyleKind::Raster);
    }

    #[test]
    fn test_tile_layer_requires_url() {
        assert!(matches!(
            TileLayer::new(LayerOptions::new()),
            Err(MapError::Layer(_))
        ));
    }

    #[tokio::test]
    async fn test_set_opacity_only_on_map() {
        let mut renderer = HeadlessRenderer::loaded();
        let mut layer = TileLayer::from_url("osm", "https://tiles/{z}/{x}/{y}.png").unwrap();

        layer.set_opacity(&mut renderer, 0.5).unwrap();
        assert!(renderer.paint_property("osm", "raster-opacity").is_none());

        layer
            .base_mut()
            .add_to(&mut renderer, &StaticImageLoader::default())
            .await
            .unwrap();
        layer.set_opacity(&mut renderer, 0.5).unwrap();
        assert_eq!(
            renderer.paint_property("osm", "raster-opacity"),
            Some(json!(0.5))
        );
    }
}
