pub mod images;
pub mod labels;

pub use images::{add_images, HttpImageLoader, ImageLoader};
pub use labels::{font_stack, label_position, LabelStyle};
