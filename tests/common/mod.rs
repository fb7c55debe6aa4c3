//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint_flow_editor::{EventKind, FlowEditor, FlowEvent, RenderTarget};
use std::cell::RefCell;
use std::rc::Rc;

/// Records every event an editor emits, in order.
#[derive(Default, Clone)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<FlowEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to all events of `editor`.
    pub fn attach<R: RenderTarget>(&self, editor: &mut FlowEditor<R>) {
        let events = self.events.clone();
        editor.subscribe_all(move |event| events.borrow_mut().push(event.clone()));
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(FlowEvent::kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.borrow().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn contains(&self, event: &FlowEvent) -> bool {
        self.events.borrow().contains(event)
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
