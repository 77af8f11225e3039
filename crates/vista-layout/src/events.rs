#![forbid(unsafe_code)]

//! Workspace lifecycle notifications.
//!
//! [`EventBus`] is the notification sink handed to registries at
//! construction time. Listeners register per [`EventKind`] with
//! [`EventBus::on`] and are removed with [`EventBus::off`].
//!
//! # Invariants
//!
//! 1. Listeners for one kind are invoked in registration order.
//! 2. Handlers are collected before any is called, so a handler may call
//!    `on`/`off`/`emit` on the same bus; changes apply to the next emission.
//! 3. Emission never fails and never mutates workspace state.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::context::Context;
use crate::snapshot::ViewportSnapshot;

/// Event discriminant used for listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ContextCreated,
    ContextUpdated,
    ContextRemoved,
    SnapshotCreated,
    SnapshotRestored,
}

impl EventKind {
    pub const ALL: [Self; 5] = [
        Self::ContextCreated,
        Self::ContextUpdated,
        Self::ContextRemoved,
        Self::SnapshotCreated,
        Self::SnapshotRestored,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContextCreated => "contextCreated",
            Self::ContextUpdated => "contextUpdated",
            Self::ContextRemoved => "contextRemoved",
            Self::SnapshotCreated => "snapshotCreated",
            Self::SnapshotRestored => "snapshotRestored",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event payloads: `{context}` for context events, `{snapshot}` for snapshot events.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceEvent {
    ContextCreated { context: Context },
    ContextUpdated { context: Context },
    ContextRemoved { context: Context },
    SnapshotCreated { snapshot: ViewportSnapshot },
    SnapshotRestored { snapshot: ViewportSnapshot },
}

impl WorkspaceEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ContextCreated { .. } => EventKind::ContextCreated,
            Self::ContextUpdated { .. } => EventKind::ContextUpdated,
            Self::ContextRemoved { .. } => EventKind::ContextRemoved,
            Self::SnapshotCreated { .. } => EventKind::SnapshotCreated,
            Self::SnapshotRestored { .. } => EventKind::SnapshotRestored,
        }
    }
}

/// Receiver of workspace events, injected into registries.
pub trait NotificationSink {
    fn emit(&self, event: &WorkspaceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn emit(&self, _event: &WorkspaceEvent) {}
}

/// Handle returned by [`EventBus::on`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Rc<dyn Fn(&WorkspaceEvent)>;

/// Single-threaded publish/subscribe bus keyed by [`EventKind`].
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<FxHashMap<EventKind, Vec<(ListenerId, Handler)>>>,
    next_id: Cell<u64>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        let total: usize = listeners.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("listener_count", &total)
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`.
    pub fn on(&self, kind: EventKind, handler: impl Fn(&WorkspaceEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Unregister a listener. Returns `false` if it was not registered for `kind`.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(list) = listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        before != list.len()
    }

    /// Number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.borrow().get(&kind).map_or(0, Vec::len)
    }

    /// Deliver `event` to every listener of its kind.
    pub fn emit(&self, event: &WorkspaceEvent) {
        let handlers: Vec<Handler> = {
            let listeners = self.listeners.borrow();
            match listeners.get(&event.kind()) {
                Some(list) => list.iter().map(|(_, h)| Rc::clone(h)).collect(),
                None => return,
            }
        };
        trace!(event = %event.kind(), listeners = handlers.len(), "emit");
        for handler in &handlers {
            handler(event);
        }
    }
}

impl NotificationSink for EventBus {
    fn emit(&self, event: &WorkspaceEvent) {
        EventBus::emit(self, event);
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for Rc<S> {
    fn emit(&self, event: &WorkspaceEvent) {
        (**self).emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::classify;
    use vista_core::ScreenRect;

    fn created() -> WorkspaceEvent {
        WorkspaceEvent::ContextCreated {
            context: classify(&ScreenRect::from_size(800.0, 600.0)),
        }
    }

    #[test]
    fn listeners_receive_matching_kind_only() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        bus.on(EventKind::ContextCreated, move |_| h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        bus.on(EventKind::ContextRemoved, move |_| h.set(h.get() + 100));

        bus.emit(&created());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listeners_called_in_registration_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let o = Rc::clone(&order);
            bus.on(EventKind::ContextCreated, move |_| o.borrow_mut().push(n));
        }
        bus.emit(&created());
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn off_removes_listener() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = bus.on(EventKind::ContextCreated, move |_| h.set(h.get() + 1));
        assert!(bus.off(EventKind::ContextCreated, id));
        assert!(!bus.off(EventKind::ContextCreated, id));
        assert!(!bus.off(EventKind::SnapshotCreated, id));
        bus.emit(&created());
        assert_eq!(hits.get(), 0);
        assert_eq!(bus.listener_count(EventKind::ContextCreated), 0);
    }

    #[test]
    fn handler_may_register_during_emit() {
        let bus = Rc::new(EventBus::new());
        let hits = Rc::new(Cell::new(0));
        let inner_bus = Rc::clone(&bus);
        let h = Rc::clone(&hits);
        bus.on(EventKind::ContextCreated, move |_| {
            let h = Rc::clone(&h);
            inner_bus.on(EventKind::ContextCreated, move |_| h.set(h.get() + 1));
        });
        bus.emit(&created());
        assert_eq!(hits.get(), 0);
        bus.emit(&created());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(EventKind::SnapshotRestored.to_string(), "snapshotRestored");
        assert_eq!(created().kind(), EventKind::ContextCreated);
    }
}
