use crate::{
    input::events::{EventType, MapEvent},
    prelude::HashMap,
};
use std::sync::Arc;

/// Event listener callback type
pub type EventCallback = Arc<dyn Fn(&MapEvent) + Send + Sync>;

/// Handle returned by [`Evented::on`], used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener registry backing an event surface
#[derive(Default)]
pub struct EventListeners {
    listeners: HashMap<EventType, Vec<(ListenerId, EventCallback)>>,
    next_id: u64,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event_type: EventType, callback: EventCallback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event_type)
            .or_default()
            .push((id, callback));
        id
    }

    /// Returns false when the listener was not registered
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for callbacks in self.listeners.values_mut() {
            if let Some(position) = callbacks.iter().position(|(l, _)| *l == id) {
                callbacks.remove(position);
                return true;
            }
        }
        false
    }

    /// Calls every listener of the event's type, returns how many were called
    pub fn dispatch(&self, event: &MapEvent) -> usize {
        match self.listeners.get(&event.event_type()) {
            Some(callbacks) => {
                for (_, callback) in callbacks {
                    callback(event);
                }
                callbacks.len()
            }
            None => 0,
        }
    }

    pub fn count(&self, event_type: EventType) -> usize {
        self.listeners.get(&event_type).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("click", &self.count(EventType::Click))
            .field("contextmenu", &self.count(EventType::ContextMenu))
            .finish()
    }
}

/// Anything that can receive and emit named events
pub trait Evented {
    fn listeners(&self) -> &EventListeners;

    fn listeners_mut(&mut self) -> &mut EventListeners;

    fn on(&mut self, event_type: EventType, callback: EventCallback) -> ListenerId {
        self.listeners_mut().add(event_type, callback)
    }

    fn off(&mut self, id: ListenerId) -> bool {
        self.listeners_mut().remove(id)
    }

    fn emit(&self, event: &MapEvent) -> usize {
        self.listeners().dispatch(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context_menu() -> MapEvent {
        MapEvent::ContextMenu {
            lat_lng: LatLng::default(),
            point: Point::default(),
            feature: None,
        }
    }

    #[test]
    fn test_dispatch_by_type() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut listeners = EventListeners::new();
        let counter = calls.clone();
        listeners.add(
            EventType::ContextMenu,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        listeners.add(EventType::Click, Arc::new(|_| panic!("wrong event type")));

        assert_eq!(listeners.dispatch(&context_menu()), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_listener() {
        let mut listeners = EventListeners::new();
        let id = listeners.add(EventType::ContextMenu, Arc::new(|_| {}));

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert_eq!(listeners.dispatch(&context_menu()), 0);
    }
}
