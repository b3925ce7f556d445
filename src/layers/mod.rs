#[macro_use]
pub mod macros;

pub mod base;
pub mod options;
pub mod style;
pub mod thematic;
pub mod tile;

pub use base::{Layer, LayerBase, LayerType};
pub use options::LayerOptions;
pub use style::{Source, StyleKind, StyleLayer};
pub use thematic::ThematicLayer;
pub use tile::TileLayer;
