//! Level 1: Flow data, graph invariants and host round trips.

mod common;

use common::harness::FlowTestHarness;
use common::EventRecorder;
use serde_json::json;
use slint_flow_editor::{
    EventKind, FlowEditor, FlowError, FlowEvent, HeadlessRenderTarget, LineMode, MemoryHostState,
    NodeEdit, NodeTypeSet, Selection,
};
use std::cell::RefCell;
use std::rc::Rc;

fn editor() -> FlowEditor<HeadlessRenderTarget> {
    FlowEditor::new(HeadlessRenderTarget::default(), NodeTypeSet::with_builtin_types())
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_flow_data_round_trip() {
    let mut h = FlowTestHarness::new();
    h.editor.open_panel(&h.start).unwrap();
    h.editor.select_node(Some(&h.end)).unwrap();
    h.editor.update_node(&h.start, NodeEdit::BodyFill(Some("#ffeecc".into()))).unwrap();
    let json = h.editor.flow_data_json().unwrap();

    let mut other = editor();
    other.set_flow_data_json(&json).unwrap();

    assert_eq!(other.get_flow_data(), h.editor.get_flow_data());
    assert_eq!(*other.selection(), Selection::Node(h.end.clone()));
    assert!(other.scene().node_element(&h.start).is_some());
    assert!(other.scene().connection_element(h.conn()).is_some());
}

#[test]
fn test_wire_format_is_pascal_case() {
    let mut h = FlowTestHarness::new();
    let panel = h.editor.open_panel(&h.start.clone()).unwrap();
    h.editor.toggle_tether_line_mode(&panel).unwrap();
    h.editor.select_connection(Some(h.conn.as_deref().unwrap())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&h.editor.flow_data_json().unwrap()).unwrap();

    assert_eq!(value["Nodes"][0]["Type"], json!("start"));
    assert_eq!(value["Nodes"][0]["Ports"][0]["Direction"], json!("output"));
    assert_eq!(value["Connections"][0]["SourceNodeHash"], json!(h.start));
    assert_eq!(value["Connections"][0]["Data"]["LineMode"], json!("bezier"));
    assert_eq!(value["ViewState"]["SelectedConnectionHash"], json!(h.conn()));
    assert_eq!(value["ViewState"]["SelectedNodeHash"], json!(null));
    // tether fields sit flat on the panel
    let open = &value["OpenPanels"][0];
    assert_eq!(open["NodeHash"], json!(h.start));
    assert_eq!(open["TetherLineMode"], json!("orthogonal"));
    assert_eq!(open["TetherHandleCustomized"], json!(false));
    assert!(open.get("Tether").is_none());
}

#[test]
fn test_flat_tether_fields_load() {
    let mut editor = editor();
    editor
        .set_flow_data_json(
            r#"{
                "Nodes": [
                    { "Hash": "a", "Type": "process", "X": 0, "Y": 0, "Width": 180, "Height": 80 }
                ],
                "OpenPanels": [
                    { "Hash": "p1", "NodeHash": "a", "PanelType": "Info", "X": 220, "Y": 0,
                      "Width": 300, "Height": 200,
                      "TetherLineMode": "orthogonal", "TetherHandleCustomized": true,
                      "TetherOrthoCorner1X": 200, "TetherOrthoCorner1Y": 40,
                      "TetherOrthoMidOffset": 12 }
                ]
            }"#,
        )
        .unwrap();

    let tether = &editor.graph().panel("p1").unwrap().tether;
    assert_eq!(tether.line_mode, LineMode::Orthogonal);
    assert!(tether.handle_customized);
    assert_eq!(tether.ortho_corner1_x, Some(200.0));
    assert_eq!(tether.ortho_mid_offset, Some(12.0));

    let json = editor.flow_data_json().unwrap();
    assert!(json.contains("\"TetherOrthoCorner1Y\":40.0"));
}

#[test]
fn test_set_flow_data_drops_invalid_entries() {
    let mut editor = editor();
    editor
        .set_flow_data_json(
            r#"{
                "Nodes": [
                    { "Hash": "a", "Type": "start", "X": 0, "Y": 0, "Width": 140, "Height": 60,
                      "Ports": [{ "Hash": "out", "Direction": "output", "Side": "right" }] },
                    { "Hash": "b", "Type": "end", "X": 400, "Y": 0, "Width": 140, "Height": 60,
                      "Ports": [{ "Hash": "in", "Direction": "input", "Side": "left" }] }
                ],
                "Connections": [
                    { "Hash": "ok", "SourceNodeHash": "a", "SourcePortHash": "out",
                      "TargetNodeHash": "b", "TargetPortHash": "in" },
                    { "Hash": "dangling", "SourceNodeHash": "a", "SourcePortHash": "out",
                      "TargetNodeHash": "ghost", "TargetPortHash": "in" },
                    { "Hash": "bad-port", "SourceNodeHash": "a", "SourcePortHash": "nope",
                      "TargetNodeHash": "b", "TargetPortHash": "in" }
                ],
                "OpenPanels": [
                    { "Hash": "p1", "NodeHash": "ghost", "PanelType": "Info",
                      "X": 0, "Y": 0, "Width": 100, "Height": 100 }
                ],
                "ViewState": { "Zoom": 50, "SelectedConnectionHash": "dangling" }
            }"#,
        )
        .unwrap();

    let graph = editor.graph();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.connection_count(), 1);
    assert!(graph.connection("ok").is_some());
    assert_eq!(graph.panel_count(), 0);
    assert!(editor.selection().is_none());
    assert_eq!(editor.zoom(), editor.options().max_zoom);
}

#[test]
fn test_malformed_json_keeps_graph() {
    let mut h = FlowTestHarness::new();
    let before = h.editor.get_flow_data();
    let result = h.editor.set_flow_data_json(r#"{ "Nodes": 12 }"#);
    assert!(matches!(result, Err(FlowError::InvalidFlowData(_))));
    assert_eq!(h.editor.get_flow_data(), before);
}

#[test]
fn test_set_flow_data_is_silent() {
    let mut h = FlowTestHarness::new();
    let data = h.editor.get_flow_data();
    h.editor.set_flow_data(data);
    assert!(h.recorder.events().is_empty());
}

// ============================================================================
// Nodes
// ============================================================================

#[test]
fn test_add_node_uses_registry_defaults() {
    let mut editor = editor();
    let decision = editor.add_node("decision", 10.0, 20.0, Some("Approved?"), Some(json!({ "rule": 3 })));
    let node = editor.graph().node(&decision).unwrap();
    assert_eq!((node.width, node.height), (180.0, 100.0));
    assert_eq!(node.title, "Approved?");
    assert_eq!(node.data, json!({ "rule": 3 }));
    let ports: Vec<&str> = node.ports.iter().map(|p| p.hash.as_str()).collect();
    assert_eq!(ports, vec!["in", "yes", "no"]);
}

#[test]
fn test_unknown_type_falls_back() {
    let mut editor = editor();
    let hash = editor.add_node("mystery", 0.0, 0.0, None, None);
    let node = editor.graph().node(&hash).unwrap();
    assert_eq!(node.node_type, "mystery");
    assert_eq!(node.ports.len(), 2);
    assert!(node.port("in").is_some());
    assert!(node.port("out").is_some());
}

#[test]
fn test_node_hashes_are_unique() {
    let mut editor = editor();
    let a = editor.add_node("process", 0.0, 0.0, None, None);
    let b = editor.add_node("process", 0.0, 0.0, None, None);
    assert_ne!(a, b);
}

#[test]
fn test_update_node_rejects_bad_size() {
    let mut h = FlowTestHarness::new();
    let result = h.editor.update_node(&h.start, NodeEdit::Width(-5.0));
    assert!(matches!(result, Err(FlowError::InvalidValue { field: "Width", .. })));
    assert_eq!(h.editor.graph().node(&h.start).unwrap().width, 140.0);
    assert!(h.recorder.events().is_empty());
}

#[test]
fn test_resizing_node_reroutes_connection() {
    let mut h = FlowTestHarness::new();
    let before = h.editor.connection_path(h.conn.as_deref().unwrap()).unwrap();
    h.editor.update_node(&h.start, NodeEdit::Width(200.0)).unwrap();
    let after = h.editor.connection_path(h.conn()).unwrap();
    assert_ne!(before, after);
    assert_eq!(h.port(&h.start.clone(), "out"), (200.0, 44.0));
    assert_eq!(
        h.recorder.events(),
        vec![FlowEvent::NodeUpdated { node_hash: h.start.clone() }, FlowEvent::FlowChanged]
    );
}

#[test]
fn test_remove_node_cascades() {
    let mut h = FlowTestHarness::new();
    h.editor.open_panel(&h.start).unwrap();
    h.recorder.clear();

    h.editor.remove_node(&h.start).unwrap();

    assert_eq!(h.editor.graph().node_count(), 1);
    assert_eq!(h.editor.graph().connection_count(), 0);
    assert_eq!(h.editor.graph().panel_count(), 0);
    assert_eq!(h.recorder.count(EventKind::NodeRemoved), 1);
    assert_eq!(h.recorder.count(EventKind::ConnectionRemoved), 0);
    assert!(matches!(h.editor.remove_node(&h.start), Err(FlowError::NodeNotFound(_))));
}

// ============================================================================
// Connections
// ============================================================================

#[test]
fn test_connection_rules() {
    let mut h = FlowTestHarness::new();
    let (start, end) = (h.start.clone(), h.end.clone());

    assert!(matches!(
        h.editor.add_connection(&start, "out", &end, "in", None),
        Err(FlowError::DuplicateConnection { .. })
    ));
    assert!(matches!(
        h.editor.add_connection(&start, "missing", &end, "in", None),
        Err(FlowError::PortNotFound { .. })
    ));
    assert!(matches!(
        h.editor.add_connection(&start, "out", "ghost", "in", None),
        Err(FlowError::NodeNotFound(_))
    ));

    let process = h.editor.add_node("process", 200.0, 200.0, None, None);
    assert!(matches!(
        h.editor.add_connection(&process, "out", &process, "in", None),
        Err(FlowError::SameNode(_))
    ));
    assert_eq!(h.editor.graph().connection_count(), 1);
}

#[test]
fn test_remove_connection_events() {
    let mut h = FlowTestHarness::new();
    let conn = h.conn().to_owned();
    h.editor.select_connection(Some(&conn)).unwrap();
    h.recorder.clear();

    h.editor.remove_connection(&conn).unwrap();

    assert_eq!(
        h.recorder.events(),
        vec![
            FlowEvent::ConnectionSelected { connection_hash: None },
            FlowEvent::ConnectionRemoved { connection_hash: conn.clone() },
            FlowEvent::FlowChanged,
        ]
    );
    assert!(h.editor.scene().connection_element(&conn).is_none());
}

// ============================================================================
// Events and host
// ============================================================================

#[test]
fn test_unsubscribe_stops_delivery() {
    let mut editor = editor();
    let seen = Rc::new(RefCell::new(0));
    let sink = seen.clone();
    let id = editor.subscribe(EventKind::NodeAdded, move |_| *sink.borrow_mut() += 1);
    editor.add_node("start", 0.0, 0.0, None, None);
    assert!(editor.unsubscribe(id));
    editor.add_node("start", 0.0, 0.0, None, None);
    assert_eq!(*seen.borrow(), 1);
    assert!(!editor.unsubscribe(id));
}

#[test]
fn test_every_change_reaches_host() {
    let host = Rc::new(RefCell::new(MemoryHostState::new()));
    let options = slint_flow_editor::EditorOptions {
        flow_data_address: Some("AppData.Flows.Main".into()),
        ..Default::default()
    };
    let mut editor =
        FlowEditor::with_options(HeadlessRenderTarget::default(), NodeTypeSet::with_builtin_types(), options).unwrap();
    editor.set_host(host.clone());
    let recorder = EventRecorder::new();
    recorder.attach(&mut editor);

    let a = editor.add_node("start", 0.0, 0.0, None, None);
    let b = editor.add_node("end", 400.0, 0.0, None, None);
    editor.add_connection(&a, "out", &b, "in", None).unwrap();
    editor.move_node(&b, 500.0, 20.0).unwrap();

    let stored = slint_flow_editor::HostState::read(&host, "AppData.Flows.Main").unwrap();
    assert_eq!(stored["Nodes"][1]["X"], json!(500.0));
    assert_eq!(stored["Connections"].as_array().unwrap().len(), 1);
    assert_eq!(recorder.count(EventKind::FlowChanged), 4);
}
