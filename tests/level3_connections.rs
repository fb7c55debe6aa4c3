//! Level 3: Creating connections by dragging, editing their curves.

mod common;

use common::harness::FlowTestHarness;
use slint_flow_editor::{EventKind, FlowEvent, HandleKind, InteractionState, Key, LineMode, Selection};

// ============================================================================
// Connecting
// ============================================================================

#[test]
fn test_drag_from_output_to_input_connects() {
    let mut h = FlowTestHarness::unconnected();

    h.press(140.0, 44.0);
    assert!(matches!(h.editor.interaction_state(), InteractionState::Connecting { .. }));
    assert!(h.editor.scene().drag_line_element().is_some());

    h.move_to(300.0, 60.0);
    h.release(400.0, 44.0);

    assert!(h.editor.scene().drag_line_element().is_none());
    assert!(h.editor.interaction_state().is_idle());
    let conn = h.editor.graph().connections().next().unwrap().clone();
    assert_eq!(conn.source_node_hash, h.start);
    assert_eq!(conn.source_port_hash, "out");
    assert_eq!(conn.target_node_hash, h.end);
    assert_eq!(conn.target_port_hash, "in");
    assert_eq!(
        h.recorder.events(),
        vec![FlowEvent::ConnectionCreated { connection_hash: conn.hash.clone() }, FlowEvent::FlowChanged]
    );
}

#[test]
fn test_release_near_input_port_connects() {
    let mut h = FlowTestHarness::unconnected();
    h.press(140.0, 44.0);
    // outside the port circle, inside the port hit radius
    h.release(395.0, 50.0);
    assert_eq!(h.editor.graph().connection_count(), 1);
}

#[test]
fn test_release_on_empty_canvas_cancels() {
    let mut h = FlowTestHarness::unconnected();
    h.press(140.0, 44.0);
    h.move_to(300.0, 300.0);
    h.release(300.0, 300.0);

    assert_eq!(h.editor.graph().connection_count(), 0);
    assert!(h.editor.scene().drag_line_element().is_none());
    assert!(h.recorder.events().is_empty());
}

#[test]
fn test_release_on_output_port_does_not_connect() {
    let mut h = FlowTestHarness::unconnected();
    let other = h.editor.add_node("start", 0.0, 200.0, None, None);
    h.press(140.0, 44.0);
    let (x, y) = h.port(&other, "out");
    h.release(x, y);
    assert_eq!(h.editor.graph().connection_count(), 0);
}

#[test]
fn test_input_port_press_drags_node() {
    let mut h = FlowTestHarness::unconnected();
    h.press(400.0, 44.0);
    assert!(matches!(
        h.editor.interaction_state(),
        InteractionState::DraggingNode { node_hash, .. } if *node_hash == h.end
    ));
    assert!(h.editor.scene().drag_line_element().is_none());
}

#[test]
fn test_duplicate_drag_is_rejected() {
    let mut h = FlowTestHarness::new();
    h.press(140.0, 44.0);
    h.release(400.0, 44.0);
    assert_eq!(h.editor.graph().connection_count(), 1);
    assert_eq!(h.recorder.count(EventKind::ConnectionCreated), 0);
}

#[test]
fn test_escape_cancels_connecting() {
    let mut h = FlowTestHarness::unconnected();
    h.press(140.0, 44.0);
    h.move_to(250.0, 44.0);

    assert!(h.key(Key::Escape));

    assert!(h.editor.interaction_state().is_idle());
    assert!(h.editor.scene().drag_line_element().is_none());
    assert!(!h.editor.target().is_captured());
    h.release(400.0, 44.0);
    assert_eq!(h.editor.graph().connection_count(), 0);
}

#[test]
fn test_drag_line_follows_pointer() {
    let mut h = FlowTestHarness::unconnected();
    h.press(140.0, 44.0);
    h.move_to(300.0, 100.0);
    let line = h.editor.scene().drag_line_element().unwrap();
    let d = slint_flow_editor::RenderTarget::attribute(h.editor.target(), line, "d").unwrap();
    assert!(d.starts_with("M 140 44"));
    assert!(d.ends_with("300 100"));
}

// ============================================================================
// Curve editing
// ============================================================================

#[test]
fn test_click_on_curve_selects_connection() {
    let mut h = FlowTestHarness::new();
    h.click(270.0, 46.0);
    assert_eq!(*h.editor.selection(), Selection::Connection(h.conn().to_owned()));
    assert!(h.recorder.contains(&FlowEvent::ConnectionSelected { connection_hash: Some(h.conn().to_owned()) }));
}

#[test]
fn test_drag_bezier_handle() {
    let mut h = FlowTestHarness::new();
    h.click(270.0, 44.0);
    h.recorder.clear();

    h.drag((270.0, 44.0), (270.0, 120.0));

    let data = &h.editor.graph().connection(h.conn()).unwrap().data;
    assert!(data.handle_customized);
    assert_eq!((data.bezier_handle_x, data.bezier_handle_y), (Some(270.0), Some(120.0)));
    assert_eq!(
        h.recorder.events(),
        vec![
            FlowEvent::ConnectionHandleMoved {
                connection_hash: h.conn().to_owned(),
                handle: HandleKind::BezierMidpoint
            },
            FlowEvent::FlowChanged
        ]
    );
}

#[test]
fn test_moving_node_resets_custom_handles() {
    let mut h = FlowTestHarness::new();
    let conn = h.conn().to_owned();
    h.editor.update_connection_handle(&conn, HandleKind::BezierMidpoint, 270.0, 200.0).unwrap();
    assert!(h.editor.graph().connection(&conn).unwrap().data.handle_customized);

    h.drag((470.0, 40.0), (470.0, 80.0));

    assert!(!h.editor.graph().connection(&conn).unwrap().data.handle_customized);
    assert_eq!(h.editor.graph().connection(&conn).unwrap().data.bezier_handle_y, None);
}

#[test]
fn test_double_click_handle_toggles_line_mode() {
    let mut h = FlowTestHarness::new();
    h.click(270.0, 44.0);
    h.recorder.clear();

    h.double_click(270.0, 44.0);

    let conn = h.editor.graph().connection(h.conn()).unwrap();
    assert_eq!(conn.data.line_mode, LineMode::Orthogonal);
    assert!(h.recorder.contains(&FlowEvent::ConnectionModeChanged {
        connection_hash: h.conn().to_owned(),
        mode: LineMode::Orthogonal
    }));
    assert!(!h.editor.connection_path(h.conn()).unwrap().contains('C'));
}

#[test]
fn test_orthogonal_midpoint_drag() {
    let mut h = FlowTestHarness::new();
    let conn = h.conn().to_owned();
    h.editor.set_connection_line_mode(&conn, LineMode::Orthogonal).unwrap();
    h.editor.move_node(&h.end.clone(), 400.0, 200.0).unwrap();

    h.editor.update_connection_handle(&conn, HandleKind::OrthoMidpoint, 300.0, 150.0).unwrap();

    let data = &h.editor.graph().connection(&conn).unwrap().data;
    assert!(data.handle_customized);
    assert!(data.ortho_mid_offset.is_some());
    let path = h.editor.connection_path(&conn).unwrap();
    assert!(path.starts_with("M 140 44"));
    assert!(path.ends_with("400 244"));
}

#[test]
fn test_reset_handles_restores_auto_curve() {
    let mut h = FlowTestHarness::new();
    let conn = h.conn().to_owned();
    let auto = h.editor.connection_path(&conn).unwrap();
    h.editor.update_connection_handle(&conn, HandleKind::BezierMidpoint, 270.0, 200.0).unwrap();
    assert_ne!(h.editor.connection_path(&conn).unwrap(), auto);
    h.recorder.clear();

    h.editor.reset_connection_handles(&conn).unwrap();

    assert_eq!(h.editor.connection_path(&conn).unwrap(), auto);
    assert_eq!(h.recorder.kinds(), vec![EventKind::FlowChanged]);
}

#[test]
fn test_handles_hidden_until_selected() {
    let mut h = FlowTestHarness::new();
    let conn = h.conn().to_owned();
    // the handle sits on the curve, so an unselected press hits the path
    h.press(270.0, 44.0);
    assert!(h.editor.interaction_state().is_idle());
    assert_eq!(*h.editor.selection(), Selection::Connection(conn.clone()));
    h.release(270.0, 44.0);

    h.press(270.0, 44.0);
    assert!(matches!(
        h.editor.interaction_state(),
        InteractionState::DraggingHandle { handle: HandleKind::BezierMidpoint, .. }
    ));
    h.release(270.0, 44.0);
    assert_eq!(h.recorder.count(EventKind::ConnectionHandleMoved), 0);
}
