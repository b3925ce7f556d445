use crate::{
    data::geojson::Feature,
    input::{emitter::EventCallback, events::MapEvent},
    utils::labels::LabelStyle,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options shared by every layer type
///
/// Only `index` changes after construction; the controller rewrites it when
/// the host reorders layers.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerOptions {
    /// Generated when absent
    pub id: Option<String>,
    /// Z-order hint, lower indices paint below higher ones
    pub index: Option<i32>,
    #[serde(rename = "type")]
    pub layer_type: Option<String>,
    /// Features of a thematic layer
    pub data: Vec<Feature>,
    pub label: bool,
    /// Text field template for labels, `{name}` when absent
    pub label_template: Option<String>,
    pub label_style: LabelStyle,
    /// Tile URL template of a tile layer
    pub url: Option<String>,
    pub attribution: Option<String>,
    /// Images that must be registered with the renderer before the layer is added
    pub images: Vec<String>,
    #[serde(skip)]
    pub on_click: Option<EventCallback>,
    #[serde(skip)]
    pub on_right_click: Option<EventCallback>,
}

impl LayerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_data(mut self, data: Vec<Feature>) -> Self {
        self.data = data;
        self
    }

    pub fn with_label(mut self, label_style: LabelStyle) -> Self {
        self.label = true;
        self.label_style = label_style;
        self
    }

    pub fn with_label_template(mut self, template: impl Into<String>) -> Self {
        self.label_template = Some(template.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    pub fn on_click<F>(mut self, callback: F) -> Self
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(callback));
        self
    }

    pub fn on_right_click<F>(mut self, callback: F) -> Self
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.on_right_click = Some(Arc::new(callback));
        self
    }
}

impl std::fmt::Debug for LayerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerOptions")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("layer_type", &self.layer_type)
            .field("features", &self.data.len())
            .field("label", &self.label)
            .field("label_style", &self.label_style)
            .field("url", &self.url)
            .field("images", &self.images)
            .field("on_click", &self.on_click.is_some())
            .field("on_right_click", &self.on_right_click.is_some())
            .finish()
    }
}
