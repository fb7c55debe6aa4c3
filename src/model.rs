//! Data model of a flow diagram.
//!
//! All types serialize with PascalCase field names. [`FlowData`] is the
//! aggregate exchanged with the host application.

use crate::geometry::{Rect, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generates a fresh `"{prefix}-{uuid}"` identifier.
pub(crate) fn new_hash(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Port {
    pub hash: String,
    pub direction: PortDirection,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub minimum_input_count: u32,
    /// `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_input_count: Option<u32>,
}

/// Per-instance visual overrides of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_bar_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    pub hash: String,
    #[serde(rename = "Type")]
    pub node_type: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ports: Vec<Port>,
    /// Opaque application payload.
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
}

impl Node {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn port(&self, hash: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.hash == hash)
    }

    /// Index of `port` among the ports sharing its side, plus that count.
    pub fn port_slot(&self, hash: &str) -> Option<(usize, usize)> {
        let port = self.port(hash)?;
        let same_side: Vec<&Port> = self.ports.iter().filter(|p| p.side == port.side).collect();
        let index = same_side.iter().position(|p| p.hash == hash)?;
        Some((index, same_side.len()))
    }
}

/// How a connection or tether is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    #[default]
    Bezier,
    Orthogonal,
}

impl LineMode {
    pub fn toggled(self) -> LineMode {
        match self {
            LineMode::Bezier => LineMode::Orthogonal,
            LineMode::Orthogonal => LineMode::Bezier,
        }
    }
}

/// Line mode plus the user-overridden handle positions of a curve.
///
/// Unset coordinates mean "auto"; see [`crate::curve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CurveHandles {
    pub line_mode: LineMode,
    pub handle_customized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bezier_handle_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bezier_handle_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ortho_corner1_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ortho_corner1_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ortho_corner2_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ortho_corner2_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ortho_mid_offset: Option<f32>,
}

impl CurveHandles {
    pub fn with_mode(line_mode: LineMode) -> Self {
        Self { line_mode, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Connection {
    pub hash: String,
    pub source_node_hash: String,
    pub source_port_hash: String,
    pub target_node_hash: String,
    pub target_port_hash: String,
    #[serde(default)]
    pub data: CurveHandles,
}

impl Connection {
    pub fn touches(&self, node_hash: &str) -> bool {
        self.source_node_hash == node_hash || self.target_node_hash == node_hash
    }

    /// True if this connects the same four endpoints.
    pub fn same_endpoints(&self, src_node: &str, src_port: &str, tgt_node: &str, tgt_port: &str) -> bool {
        self.source_node_hash == src_node
            && self.source_port_hash == src_port
            && self.target_node_hash == tgt_node
            && self.target_port_hash == tgt_port
    }
}

/// Floating properties panel tethered to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PanelRecord", into = "PanelRecord")]
pub struct Panel {
    pub hash: String,
    pub node_hash: String,
    pub panel_type: String,
    pub title: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub tether: CurveHandles,
}

impl Panel {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Wire shape of [`Panel`]: the tether handles sit flat on the panel with
/// a `Tether` prefix.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PanelRecord {
    hash: String,
    node_hash: String,
    panel_type: String,
    #[serde(default)]
    title: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default)]
    tether_line_mode: LineMode,
    #[serde(default)]
    tether_handle_customized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tether_bezier_handle_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tether_bezier_handle_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tether_ortho_corner1_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tether_ortho_corner1_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tether_ortho_corner2_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tether_ortho_corner2_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tether_ortho_mid_offset: Option<f32>,
}

impl From<PanelRecord> for Panel {
    fn from(r: PanelRecord) -> Self {
        Panel {
            hash: r.hash,
            node_hash: r.node_hash,
            panel_type: r.panel_type,
            title: r.title,
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
            tether: CurveHandles {
                line_mode: r.tether_line_mode,
                handle_customized: r.tether_handle_customized,
                bezier_handle_x: r.tether_bezier_handle_x,
                bezier_handle_y: r.tether_bezier_handle_y,
                ortho_corner1_x: r.tether_ortho_corner1_x,
                ortho_corner1_y: r.tether_ortho_corner1_y,
                ortho_corner2_x: r.tether_ortho_corner2_x,
                ortho_corner2_y: r.tether_ortho_corner2_y,
                ortho_mid_offset: r.tether_ortho_mid_offset,
            },
        }
    }
}

impl From<Panel> for PanelRecord {
    fn from(p: Panel) -> Self {
        let t = p.tether;
        PanelRecord {
            hash: p.hash,
            node_hash: p.node_hash,
            panel_type: p.panel_type,
            title: p.title,
            x: p.x,
            y: p.y,
            width: p.width,
            height: p.height,
            tether_line_mode: t.line_mode,
            tether_handle_customized: t.handle_customized,
            tether_bezier_handle_x: t.bezier_handle_x,
            tether_bezier_handle_y: t.bezier_handle_y,
            tether_ortho_corner1_x: t.ortho_corner1_x,
            tether_ortho_corner1_y: t.ortho_corner1_y,
            tether_ortho_corner2_x: t.ortho_corner2_x,
            tether_ortho_corner2_y: t.ortho_corner2_y,
            tether_ortho_mid_offset: t.ortho_mid_offset,
        }
    }
}

/// The single selected element, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Node(String),
    Connection(String),
    /// Tethers are identified by their panel hash.
    Tether(String),
}

impl Selection {
    pub fn node(&self) -> Option<&str> {
        match self {
            Selection::Node(h) => Some(h),
            _ => None,
        }
    }

    pub fn connection(&self) -> Option<&str> {
        match self {
            Selection::Connection(h) => Some(h),
            _ => None,
        }
    }

    pub fn tether(&self) -> Option<&str> {
        match self {
            Selection::Tether(h) => Some(h),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

/// Pan, zoom and selection of the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ViewStateRecord", into = "ViewStateRecord")]
pub struct ViewState {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
    pub selection: Selection,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0, selection: Selection::None }
    }
}

/// Wire shape of [`ViewState`]: one nullable field per selectable kind.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ViewStateRecord {
    pan_x: f32,
    pan_y: f32,
    zoom: f32,
    selected_node_hash: Option<String>,
    selected_connection_hash: Option<String>,
    selected_tether_hash: Option<String>,
}

impl Default for ViewStateRecord {
    fn default() -> Self {
        ViewState::default().into()
    }
}

impl From<ViewStateRecord> for ViewState {
    fn from(r: ViewStateRecord) -> Self {
        // At most one survives; nodes win over connections over tethers.
        let selection = match (r.selected_node_hash, r.selected_connection_hash, r.selected_tether_hash) {
            (Some(n), _, _) => Selection::Node(n),
            (None, Some(c), _) => Selection::Connection(c),
            (None, None, Some(t)) => Selection::Tether(t),
            (None, None, None) => Selection::None,
        };
        let zoom = if r.zoom.is_finite() && r.zoom > 0.0 { r.zoom } else { 1.0 };
        ViewState { pan_x: r.pan_x, pan_y: r.pan_y, zoom, selection }
    }
}

impl From<ViewState> for ViewStateRecord {
    fn from(v: ViewState) -> Self {
        ViewStateRecord {
            pan_x: v.pan_x,
            pan_y: v.pan_y,
            zoom: v.zoom,
            selected_node_hash: v.selection.node().map(str::to_owned),
            selected_connection_hash: v.selection.connection().map(str::to_owned),
            selected_tether_hash: v.selection.tether().map(str::to_owned),
        }
    }
}

/// The whole graph, as exchanged with the host application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FlowData {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub open_panels: Vec<Panel>,
    pub view_state: ViewState,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Rect> for SavedRect {
    fn from(r: Rect) -> Self {
        Self { x: r.x, y: r.y, width: r.width, height: r.height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedView {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

/// Named snapshot of node/panel geometry and the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedLayout {
    pub hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Keyed by node hash.
    pub node_positions: BTreeMap<String, SavedRect>,
    /// Keyed by the hash of the node the panel belongs to.
    pub panel_positions: BTreeMap<String, SavedRect>,
    pub view_state: SavedView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_hash_has_prefix_and_is_unique() {
        let a = new_hash("node");
        let b = new_hash("node");
        assert!(a.starts_with("node-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_node_serializes_pascal_case() {
        let node = Node {
            hash: "n1".into(),
            node_type: "start".into(),
            x: 1.0,
            y: 2.0,
            width: 100.0,
            height: 50.0,
            title: "Start".into(),
            ports: vec![Port {
                hash: "out".into(),
                direction: PortDirection::Output,
                side: Side::Right,
                label: String::new(),
                minimum_input_count: 0,
                maximum_input_count: None,
            }],
            data: serde_json::Value::Null,
            style: None,
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["Hash"], "n1");
        assert_eq!(value["Type"], "start");
        assert_eq!(value["Ports"][0]["Direction"], "output");
        assert_eq!(value["Ports"][0]["Side"], "right");
        assert!(value.get("Style").is_none());
    }

    #[test]
    fn test_curve_handles_field_names() {
        let handles = CurveHandles {
            handle_customized: true,
            ortho_corner1_x: Some(5.0),
            ..Default::default()
        };
        let value = serde_json::to_value(&handles).unwrap();
        assert_eq!(value["LineMode"], "bezier");
        assert_eq!(value["HandleCustomized"], true);
        assert_eq!(value["OrthoCorner1X"], 5.0);
        assert!(value.get("BezierHandleX").is_none());
    }

    #[test]
    fn test_view_state_wire_shape() {
        let view = ViewState {
            pan_x: 10.0,
            pan_y: -5.0,
            zoom: 2.0,
            selection: Selection::Connection("c1".into()),
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["SelectedConnectionHash"], "c1");
        assert!(value["SelectedNodeHash"].is_null());
        assert!(value["SelectedTetherHash"].is_null());

        let back: ViewState = serde_json::from_value(value).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn test_view_state_conflicting_selection_keeps_one() {
        let view: ViewState = serde_json::from_value(json!({
            "PanX": 0.0, "PanY": 0.0, "Zoom": 1.0,
            "SelectedNodeHash": "n1",
            "SelectedConnectionHash": "c1"
        }))
        .unwrap();
        assert_eq!(view.selection, Selection::Node("n1".into()));
    }

    #[test]
    fn test_view_state_rejects_non_positive_zoom() {
        let view: ViewState = serde_json::from_value(json!({ "Zoom": 0.0 })).unwrap();
        assert_eq!(view.zoom, 1.0);
    }

    #[test]
    fn test_flow_data_defaults_from_empty_object() {
        let flow: FlowData = serde_json::from_value(json!({})).unwrap();
        assert!(flow.nodes.is_empty());
        assert_eq!(flow.view_state.zoom, 1.0);
    }

    #[test]
    fn test_port_slot() {
        let port = |hash: &str, side| Port {
            hash: hash.into(),
            direction: PortDirection::Input,
            side,
            label: String::new(),
            minimum_input_count: 0,
            maximum_input_count: None,
        };
        let node = Node {
            hash: "n".into(),
            node_type: "t".into(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            title: String::new(),
            ports: vec![port("a", Side::Left), port("b", Side::Top), port("c", Side::Left)],
            data: serde_json::Value::Null,
            style: None,
        };
        assert_eq!(node.port_slot("c"), Some((1, 2)));
        assert_eq!(node.port_slot("b"), Some((0, 1)));
        assert_eq!(node.port_slot("zzz"), None);
    }
}
