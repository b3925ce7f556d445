pub mod emitter;
pub mod events;

pub use emitter::{EventCallback, EventListeners, Evented, ListenerId};
pub use events::{EventType, MapEvent, RendererEvent};
