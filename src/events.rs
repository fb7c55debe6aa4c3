//! Domain events.
//!
//! Every editor mutation that the host may care about is announced as a
//! [`FlowEvent`]. Handlers subscribe to one [`EventKind`] or to everything.
//! A panicking handler is logged and skipped; the remaining handlers still
//! run and the editor state is unaffected.

use crate::curve::HandleKind;
use crate::model::LineMode;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    NodeAdded { node_hash: String },
    NodeRemoved { node_hash: String },
    NodeMoved { node_hash: String, x: f32, y: f32 },
    NodeUpdated { node_hash: String },
    NodeSelected { node_hash: Option<String> },
    ConnectionCreated { connection_hash: String },
    ConnectionRemoved { connection_hash: String },
    ConnectionSelected { connection_hash: Option<String> },
    ConnectionHandleMoved { connection_hash: String, handle: HandleKind },
    ConnectionModeChanged { connection_hash: String, mode: LineMode },
    PanelOpened { panel_hash: String, node_hash: String },
    PanelClosed { panel_hash: String, node_hash: String },
    PanelMoved { panel_hash: String },
    TetherSelected { panel_hash: Option<String> },
    TetherHandleMoved { panel_hash: String, handle: HandleKind },
    TetherModeChanged { panel_hash: String, mode: LineMode },
    LayoutSaved { layout_hash: String },
    LayoutRestored { layout_hash: String },
    LayoutDeleted { layout_hash: String },
    /// Catch-all, emitted after every event that changed the flow data.
    FlowChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NodeAdded,
    NodeRemoved,
    NodeMoved,
    NodeUpdated,
    NodeSelected,
    ConnectionCreated,
    ConnectionRemoved,
    ConnectionSelected,
    ConnectionHandleMoved,
    ConnectionModeChanged,
    PanelOpened,
    PanelClosed,
    PanelMoved,
    TetherSelected,
    TetherHandleMoved,
    TetherModeChanged,
    LayoutSaved,
    LayoutRestored,
    LayoutDeleted,
    FlowChanged,
}

impl FlowEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            FlowEvent::NodeAdded { .. } => EventKind::NodeAdded,
            FlowEvent::NodeRemoved { .. } => EventKind::NodeRemoved,
            FlowEvent::NodeMoved { .. } => EventKind::NodeMoved,
            FlowEvent::NodeUpdated { .. } => EventKind::NodeUpdated,
            FlowEvent::NodeSelected { .. } => EventKind::NodeSelected,
            FlowEvent::ConnectionCreated { .. } => EventKind::ConnectionCreated,
            FlowEvent::ConnectionRemoved { .. } => EventKind::ConnectionRemoved,
            FlowEvent::ConnectionSelected { .. } => EventKind::ConnectionSelected,
            FlowEvent::ConnectionHandleMoved { .. } => EventKind::ConnectionHandleMoved,
            FlowEvent::ConnectionModeChanged { .. } => EventKind::ConnectionModeChanged,
            FlowEvent::PanelOpened { .. } => EventKind::PanelOpened,
            FlowEvent::PanelClosed { .. } => EventKind::PanelClosed,
            FlowEvent::PanelMoved { .. } => EventKind::PanelMoved,
            FlowEvent::TetherSelected { .. } => EventKind::TetherSelected,
            FlowEvent::TetherHandleMoved { .. } => EventKind::TetherHandleMoved,
            FlowEvent::TetherModeChanged { .. } => EventKind::TetherModeChanged,
            FlowEvent::LayoutSaved { .. } => EventKind::LayoutSaved,
            FlowEvent::LayoutRestored { .. } => EventKind::LayoutRestored,
            FlowEvent::LayoutDeleted { .. } => EventKind::LayoutDeleted,
            FlowEvent::FlowChanged => EventKind::FlowChanged,
        }
    }

    /// Whether this event changed the serialized flow data and so must be
    /// followed by [`FlowEvent::FlowChanged`].
    ///
    /// Selection changes and saved-layout bookkeeping do not count.
    pub fn changes_flow(&self) -> bool {
        !matches!(
            self,
            FlowEvent::NodeSelected { .. }
                | FlowEvent::ConnectionSelected { .. }
                | FlowEvent::TetherSelected { .. }
                | FlowEvent::LayoutSaved { .. }
                | FlowEvent::LayoutDeleted { .. }
                | FlowEvent::FlowChanged
        )
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&FlowEvent)>;

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every event.
    kind: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, kind, handler });
        id
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&FlowEvent) + 'static,
    {
        self.add(Some(kind), Box::new(handler))
    }

    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&FlowEvent) + 'static,
    {
        self.add(None, Box::new(handler))
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers `event` to every matching handler in subscription order.
    pub fn emit(&mut self, event: &FlowEvent) {
        let kind = event.kind();
        for sub in self.subscriptions.iter_mut() {
            if sub.kind.is_some_and(|k| k != kind) {
                continue;
            }
            let handler = &mut sub.handler;
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                tracing::error!(subscription = sub.id.0, ?kind, "event handler panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(bus: &mut EventBus, kind: Option<EventKind>) -> Rc<RefCell<Vec<FlowEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let handler = move |e: &FlowEvent| sink.borrow_mut().push(e.clone());
        match kind {
            Some(k) => bus.subscribe(k, handler),
            None => bus.subscribe_all(handler),
        };
        log
    }

    #[test]
    fn test_kind_filter() {
        let mut bus = EventBus::new();
        let added = recorder(&mut bus, Some(EventKind::NodeAdded));
        let all = recorder(&mut bus, None);

        bus.emit(&FlowEvent::NodeAdded { node_hash: "n".into() });
        bus.emit(&FlowEvent::FlowChanged);

        assert_eq!(added.borrow().len(), 1);
        assert_eq!(all.borrow().len(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = bus.subscribe_all(move |_| *c.borrow_mut() += 1);

        bus.emit(&FlowEvent::FlowChanged);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&FlowEvent::FlowChanged);

        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let mut bus = EventBus::new();
        let before = recorder(&mut bus, None);
        bus.subscribe_all(|_| panic!("handler failure"));
        let after = recorder(&mut bus, None);

        bus.emit(&FlowEvent::FlowChanged);
        bus.emit(&FlowEvent::FlowChanged);

        assert_eq!(before.borrow().len(), 2);
        assert_eq!(after.borrow().len(), 2);
        assert_eq!(bus.len(), 3);
    }

    #[test]
    fn test_changes_flow() {
        assert!(FlowEvent::NodeAdded { node_hash: "n".into() }.changes_flow());
        assert!(FlowEvent::LayoutRestored { layout_hash: "l".into() }.changes_flow());
        assert!(!FlowEvent::NodeSelected { node_hash: None }.changes_flow());
        assert!(!FlowEvent::FlowChanged.changes_flow());
    }
}
