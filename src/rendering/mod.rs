pub mod headless;
pub mod renderer;

pub use headless::HeadlessRenderer;
pub use renderer::{Cursor, FeatureKey, FeatureState, RenderedFeature, Renderer};
