//! Event model and listener registry
//!
//! Hosts translate their native pointer, keyboard and window notifications
//! into [`Event`]s. Window-level listeners (resize, and pointer move/up while
//! a thumb is dragged) live in an [`EventDispatcher`] keyed by [`ListenerId`]
//! so every registration can be removed again.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::hit_test::Point;

/// Event type identifier
pub type EventType = u32;

/// Event types understood by the scroll container
pub mod event_types {
    use super::EventType;

    pub const POINTER_DOWN: EventType = 1;
    pub const POINTER_UP: EventType = 2;
    pub const POINTER_MOVE: EventType = 3;
    pub const POINTER_ENTER: EventType = 4;
    pub const POINTER_LEAVE: EventType = 5;
    pub const CLICK: EventType = 6;
    pub const KEY_DOWN: EventType = 20;
    pub const SCROLL: EventType = 30;
    pub const RESIZE: EventType = 40;
}

/// A host event with associated data
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    pub data: EventData,
    /// Host timestamp in milliseconds
    pub timestamp: u64,
    pub propagation_stopped: bool,
    pub default_prevented: bool,
}

/// Event-specific data
#[derive(Clone, Debug)]
pub enum EventData {
    Pointer { x: f32, y: f32, button: u8 },
    Resize { width: f32, height: f32 },
    None,
}

impl Event {
    pub fn new(event_type: EventType, data: EventData) -> Self {
        Self {
            event_type,
            data,
            timestamp: 0,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    /// Primary-button pointer event at viewport coordinates
    pub fn pointer(event_type: EventType, x: f32, y: f32) -> Self {
        Self::new(event_type, EventData::Pointer { x, y, button: 0 })
    }

    pub fn resize(width: f32, height: f32) -> Self {
        Self::new(event_types::RESIZE, EventData::Resize { width, height })
    }

    /// Event without a payload
    pub fn bare(event_type: EventType) -> Self {
        Self::new(event_type, EventData::None)
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Pointer position, if this is a pointer event
    pub fn position(&self) -> Option<Point> {
        match self.data {
            EventData::Pointer { x, y, .. } => Some(Point::new(x, y)),
            _ => None,
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Suppress the host's default action (text selection, focus change)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

new_key_type! {
    /// Handle for a registered listener
    pub struct ListenerId;
}

/// Listener function type
pub type Listener = Rc<dyn Fn(&mut Event)>;

/// Registry of listeners grouped by event type
pub struct EventDispatcher {
    listeners: SlotMap<ListenerId, (EventType, Listener)>,
    by_type: FxHashMap<EventType, Vec<ListenerId>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            by_type: FxHashMap::default(),
        }
    }

    /// Register a listener for an event type
    pub fn register<F>(&mut self, event_type: EventType, listener: F) -> ListenerId
    where
        F: Fn(&mut Event) + 'static,
    {
        self.register_rc(event_type, Rc::new(listener))
    }

    pub fn register_rc(&mut self, event_type: EventType, listener: Listener) -> ListenerId {
        let id = self.listeners.insert((event_type, listener));
        self.by_type.entry(event_type).or_default().push(id);
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let Some((event_type, _)) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_type.get_mut(&event_type) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_type.remove(&event_type);
            }
        }
        true
    }

    /// Snapshot of the listeners for an event type, in registration order.
    ///
    /// Callers that keep the dispatcher behind a `RefCell` take this snapshot
    /// and release the borrow before invoking, so listeners may register or
    /// unregister while an event is being delivered.
    pub fn listeners_for(&self, event_type: EventType) -> Vec<Listener> {
        self.by_type
            .get(&event_type)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.listeners.get(*id))
                    .map(|(_, listener)| listener.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deliver an event to every listener of its type until propagation stops.
    /// Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &mut Event) -> usize {
        deliver(self.listeners_for(event.event_type), event)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of listeners registered for one event type
    pub fn count_for(&self, event_type: EventType) -> usize {
        self.by_type.get(&event_type).map_or(0, Vec::len)
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Invoke a listener snapshot, honouring `stop_propagation`
pub fn deliver(listeners: Vec<Listener>, event: &mut Event) -> usize {
    let mut invoked = 0;
    for listener in listeners {
        if event.propagation_stopped {
            break;
        }
        listener(event);
        invoked += 1;
    }
    invoked
}

#[cfg(test)]
mod tests {
    use super::event_types::*;
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_register_and_dispatch() {
        let hits = Rc::new(Cell::new(0));
        let mut dispatcher = EventDispatcher::new();

        let counter = hits.clone();
        dispatcher.register(RESIZE, move |_| counter.set(counter.get() + 1));

        let mut event = Event::resize(800.0, 600.0);
        assert_eq!(dispatcher.dispatch(&mut event), 1);
        assert_eq!(hits.get(), 1);

        // Other event types don't reach it
        let mut event = Event::pointer(POINTER_MOVE, 1.0, 2.0);
        assert_eq!(dispatcher.dispatch(&mut event), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_unregister() {
        let mut dispatcher = EventDispatcher::new();
        let id = dispatcher.register(POINTER_UP, |_| {});
        dispatcher.register(POINTER_MOVE, |_| {});
        assert_eq!(dispatcher.len(), 2);
        assert_eq!(dispatcher.count_for(POINTER_UP), 1);

        assert!(dispatcher.unregister(id));
        assert!(!dispatcher.unregister(id));
        assert_eq!(dispatcher.len(), 1);
        assert_eq!(dispatcher.count_for(POINTER_UP), 0);
    }

    #[test]
    fn test_stop_propagation() {
        let second_ran = Rc::new(Cell::new(false));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(POINTER_DOWN, |e| e.stop_propagation());
        let flag = second_ran.clone();
        dispatcher.register(POINTER_DOWN, move |_| flag.set(true));

        let mut event = Event::pointer(POINTER_DOWN, 0.0, 0.0);
        assert_eq!(dispatcher.dispatch(&mut event), 1);
        assert!(!second_ran.get());
        assert!(event.propagation_stopped);
    }

    #[test]
    fn test_event_position() {
        let event = Event::pointer(POINTER_MOVE, 3.0, 4.0).with_timestamp(16);
        assert_eq!(event.position(), Some(Point::new(3.0, 4.0)));
        assert_eq!(event.timestamp, 16);
        assert_eq!(Event::bare(SCROLL).position(), None);
    }
}
