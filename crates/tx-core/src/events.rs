//! Typed event bus
//!
//! Both tools announce selection and transform changes here. Listeners
//! register per [`EventKind`]; [`EventBus::emit`] calls every listener of the
//! event's kind in registration order.
//!
//! On a [`SharedEventBus`], publish with [`publish`]: it releases the bus
//! lock before any listener runs, so listeners may subscribe, unsubscribe or
//! publish themselves. A listener is never re-entered; an event it causes
//! for its own kind while it runs is not delivered back to it.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;

use crate::ids::ModelId;
use crate::selection::Selection;

/// Events published by the transform tools
#[derive(Debug, Clone, PartialEq)]
pub enum TransformEvent {
    /// A new selection was picked up and its pivot frozen
    SelectionChanged(Selection),
    /// Cumulative translation of the current drag
    TranslateChanged {
        model: ModelId,
        translation: Vec3,
        pivot: Vec3,
    },
    /// One incremental rotation step
    RotateChanged {
        model: ModelId,
        axis: Vec3,
        angle: f32,
        /// XYZ euler angles of the first tracked fragment after the step
        orientation_euler: Vec3,
    },
    SelectionCleared,
}

impl TransformEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SelectionChanged(_) => EventKind::SelectionChanged,
            Self::TranslateChanged { .. } => EventKind::TranslateChanged,
            Self::RotateChanged { .. } => EventKind::RotateChanged,
            Self::SelectionCleared => EventKind::SelectionCleared,
        }
    }
}

/// Discriminant used as the registration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SelectionChanged,
    TranslateChanged,
    RotateChanged,
    SelectionCleared,
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<Mutex<dyn FnMut(&TransformEvent) + Send>>;

#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(SubscriptionId, Listener)>>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&TransformEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let listener: Listener = Arc::new(Mutex::new(listener));
        self.listeners.entry(kind).or_default().push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(index) = listeners.iter().position(|(sub, _)| *sub == id) {
                listeners.remove(index);
                return true;
            }
        }
        false
    }

    pub fn emit(&self, event: &TransformEvent) {
        dispatch(&self.listeners_of(event.kind()), event);
    }

    fn listeners_of(&self, kind: EventKind) -> Vec<Listener> {
        self.listeners
            .get(&kind)
            .map(|listeners| listeners.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

/// Event bus shared between the tools and their host
pub type SharedEventBus = Arc<Mutex<EventBus>>;

pub fn shared_event_bus() -> SharedEventBus {
    Arc::new(Mutex::new(EventBus::new()))
}

/// Emit on a shared bus without holding its lock while listeners run
pub fn publish(bus: &SharedEventBus, event: &TransformEvent) {
    let listeners = bus.lock().listeners_of(event.kind());
    dispatch(&listeners, event);
}

fn dispatch(listeners: &[Listener], event: &TransformEvent) {
    tracing::trace!("Emitting {:?} to {} listeners", event.kind(), listeners.len());
    for listener in listeners {
        match listener.try_lock() {
            Some(mut listener) => (&mut *listener)(event),
            None => tracing::debug!("Listener busy, {:?} not delivered to it", event.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_kind() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = seen.clone();
        bus.subscribe(EventKind::SelectionCleared, move |event| {
            sink.lock().push(event.kind());
        });

        bus.emit(&TransformEvent::TranslateChanged {
            model: ModelId::new(),
            translation: Vec3::X,
            pivot: Vec3::ZERO,
        });
        bus.emit(&TransformEvent::SelectionCleared);

        assert_eq!(*seen.lock(), vec![EventKind::SelectionCleared]);
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in 0..3 {
            let sink = seen.clone();
            bus.subscribe(EventKind::SelectionCleared, move |_| sink.lock().push(tag));
        }
        bus.emit(&TransformEvent::SelectionCleared);
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let sink = count.clone();
        let id = bus.subscribe(EventKind::SelectionCleared, move |_| *sink.lock() += 1);

        bus.emit(&TransformEvent::SelectionCleared);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&TransformEvent::SelectionCleared);

        assert_eq!(*count.lock(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_use_the_shared_bus() {
        let bus = shared_event_bus();
        let cleared = Arc::new(Mutex::new(0));

        let sink = cleared.clone();
        bus.lock().subscribe(EventKind::SelectionCleared, move |_| *sink.lock() += 1);

        // Forwards every translation as a clear, and re-publishes its own kind
        let inner = bus.clone();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        bus.lock().subscribe(EventKind::TranslateChanged, move |event| {
            *counter.lock() += 1;
            publish(&inner, &TransformEvent::SelectionCleared);
            publish(&inner, event);
        });

        publish(
            &bus,
            &TransformEvent::TranslateChanged {
                model: ModelId::new(),
                translation: Vec3::X,
                pivot: Vec3::ZERO,
            },
        );

        assert_eq!(*cleared.lock(), 1);
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let bus = shared_event_bus();
        let id = Arc::new(Mutex::new(None));
        let inner = bus.clone();
        let own = id.clone();
        let subscription = bus.lock().subscribe(EventKind::SelectionCleared, move |_| {
            if let Some(id) = own.lock().take() {
                inner.lock().unsubscribe(id);
            }
        });
        *id.lock() = Some(subscription);

        publish(&bus, &TransformEvent::SelectionCleared);
        assert_eq!(bus.lock().listener_count(), 0);
    }
}
