//! Level 5: Keyboard handling.

mod common;

use common::harness::FlowTestHarness;
use slint_flow_editor::{EventKind, FlowEvent, InteractionState, Key, KeyFocus, Selection};

// ============================================================================
// Delete / Backspace
// ============================================================================

#[test]
fn test_delete_removes_selected_node_and_its_connections() {
    let mut h = FlowTestHarness::new();
    h.click(70.0, 40.0);
    h.recorder.clear();

    assert!(h.key(Key::Delete));

    assert!(h.editor.graph().node(&h.start).is_none());
    assert_eq!(h.editor.graph().connection_count(), 0);
    assert!(h.editor.scene().connection_element(h.conn()).is_none());
    assert_eq!(
        h.recorder.events(),
        vec![
            FlowEvent::NodeSelected { node_hash: None },
            FlowEvent::NodeRemoved { node_hash: h.start.clone() },
            FlowEvent::FlowChanged,
        ]
    );
}

#[test]
fn test_backspace_removes_selected_connection() {
    let mut h = FlowTestHarness::new();
    h.click(270.0, 44.0);

    assert!(h.key(Key::Backspace));

    assert_eq!(h.editor.graph().connection_count(), 0);
    assert_eq!(h.editor.graph().node_count(), 2);
}

#[test]
fn test_delete_ignored_while_typing() {
    let mut h = FlowTestHarness::new();
    h.click(70.0, 40.0);

    assert!(!h.key_in(Key::Delete, KeyFocus::TextInput));
    assert!(!h.key_in(Key::Backspace, KeyFocus::PanelBody));

    assert!(h.editor.graph().node(&h.start).is_some());
    assert_eq!(*h.editor.selection(), Selection::Node(h.start.clone()));
}

#[test]
fn test_delete_without_selection_is_not_consumed() {
    let mut h = FlowTestHarness::new();
    assert!(!h.key(Key::Delete));
    assert!(h.recorder.events().is_empty());
}

#[test]
fn test_delete_leaves_selected_tether() {
    let mut h = FlowTestHarness::new();
    let panel = h.editor.open_panel(&h.start.clone()).unwrap();
    h.editor.select_tether(Some(&panel)).unwrap();

    assert!(!h.key(Key::Delete));
    assert!(h.editor.graph().panel(&panel).is_some());
}

#[test]
fn test_other_keys_ignored() {
    let mut h = FlowTestHarness::new();
    h.click(70.0, 40.0);
    assert!(!h.key(Key::Other));
    assert_eq!(h.editor.graph().node_count(), 2);
}

// ============================================================================
// Escape
// ============================================================================

#[test]
fn test_escape_clears_selection() {
    let mut h = FlowTestHarness::new();
    h.click(270.0, 44.0);
    h.recorder.clear();

    assert!(h.key(Key::Escape));

    assert!(h.editor.selection().is_none());
    assert_eq!(h.recorder.events(), vec![FlowEvent::ConnectionSelected { connection_hash: None }]);
}

#[test]
fn test_escape_leaves_fullscreen_first() {
    let mut h = FlowTestHarness::new();
    h.click(70.0, 40.0);
    h.editor.set_fullscreen(true);

    assert!(h.key(Key::Escape));
    assert!(!h.editor.is_fullscreen());
    assert!(!h.editor.target().is_fullscreen());
    assert_eq!(*h.editor.selection(), Selection::Node(h.start.clone()));

    assert!(h.key(Key::Escape));
    assert!(h.editor.selection().is_none());
}

#[test]
fn test_escape_while_connecting_keeps_selection() {
    let mut h = FlowTestHarness::unconnected();
    h.click(470.0, 40.0);
    h.press(140.0, 44.0);
    assert!(matches!(h.editor.interaction_state(), InteractionState::Connecting { .. }));

    assert!(h.key(Key::Escape));

    assert!(h.editor.interaction_state().is_idle());
    assert_eq!(*h.editor.selection(), Selection::Node(h.end.clone()));
    assert_eq!(h.recorder.count(EventKind::ConnectionCreated), 0);
}
