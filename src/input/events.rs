use crate::{
    core::geo::{LatLng, Point},
    rendering::renderer::RenderedFeature,
};

/// Events delivered by the renderer to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    /// The base style finished loading; fired once
    StyleLoad,
    Click { lat_lng: LatLng, point: Point },
    /// Right click
    ContextMenu { lat_lng: LatLng, point: Point },
    MouseMove { lat_lng: LatLng, point: Point },
}

/// Names of the events layers and the controller emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    ContextMenu,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::ContextMenu => "contextmenu",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted on layers (and on the controller for unmatched right clicks)
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Click {
        lat_lng: LatLng,
        point: Point,
        feature: RenderedFeature,
    },
    ContextMenu {
        lat_lng: LatLng,
        point: Point,
        feature: Option<RenderedFeature>,
    },
}

impl MapEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            MapEvent::Click { .. } => EventType::Click,
            MapEvent::ContextMenu { .. } => EventType::ContextMenu,
        }
    }

    pub fn lat_lng(&self) -> LatLng {
        match self {
            MapEvent::Click { lat_lng, .. } | MapEvent::ContextMenu { lat_lng, .. } => *lat_lng,
        }
    }

    pub fn point(&self) -> Point {
        match self {
            MapEvent::Click { point, .. } | MapEvent::ContextMenu { point, .. } => *point,
        }
    }

    pub fn feature(&self) -> Option<&RenderedFeature> {
        match self {
            MapEvent::Click { feature, .. } => Some(feature),
            MapEvent::ContextMenu { feature, .. } => feature.as_ref(),
        }
    }
}
