//! Engine-wide defaults and the fixed values baked into generated styles.

/// Base style requested from the renderer when none is configured.
pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/streets-v11";

pub const DEFAULT_ZOOM: f64 = 13.0;

pub const DEFAULT_MAX_ZOOM: f64 = 18.0;

/// Wait after an attachment before the renderer's layer order is trusted.
pub const DEFAULT_REORDER_DELAY_MS: u64 = 100;

pub const DEFAULT_HIT_TOLERANCE: f64 = 0.0;

/// Raster tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Subdomains substituted for `{s}` in tile URL templates.
pub const TILE_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Outline color of thematic polygons and circles.
pub const BORDER_COLOR: &str = "#333";

pub const BORDER_WEIGHT: f64 = 1.0;

/// Outline width of the hovered feature.
pub const HOVER_BORDER_WEIGHT: f64 = 3.0;

pub const LABEL_COLOR: &str = "#333";

pub const LABEL_FONT_SIZE: i32 = 12;

/// Text field used when a layer asks for labels without a template.
pub const LABEL_FIELD: &str = "{name}";
