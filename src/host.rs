//! Host application state.
//!
//! The editor exchanges its [`FlowData`](crate::model::FlowData) with the
//! host through a JSON value stored at an address (for example
//! `"AppData.Flows.Main"`). Addresses are opaque to the editor.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Address-keyed JSON store owned by the host.
pub trait HostState {
    fn read(&self, address: &str) -> Option<Value>;
    fn write(&mut self, address: &str, value: Value);
}

/// Shared handle, so the host can keep reading what the editor writes.
impl<T: HostState> HostState for Rc<RefCell<T>> {
    fn read(&self, address: &str) -> Option<Value> {
        self.borrow().read(address)
    }

    fn write(&mut self, address: &str, value: Value) {
        self.borrow_mut().write(address, value);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHostState {
    values: HashMap<String, Value>,
}

impl MemoryHostState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostState for MemoryHostState {
    fn read(&self, address: &str) -> Option<Value> {
        self.values.get(address).cloned()
    }

    fn write(&mut self, address: &str, value: Value) {
        self.values.insert(address.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_host_state() {
        let mut state = MemoryHostState::new();
        assert!(state.read("AppData.Flow").is_none());
        state.write("AppData.Flow", json!({ "Nodes": [] }));
        assert_eq!(state.read("AppData.Flow"), Some(json!({ "Nodes": [] })));
    }

    #[test]
    fn test_shared_handle_sees_writes() {
        let shared = Rc::new(RefCell::new(MemoryHostState::new()));
        let mut writer = shared.clone();
        writer.write("a", json!(1));
        assert_eq!(shared.borrow().read("a"), Some(json!(1)));
    }
}
