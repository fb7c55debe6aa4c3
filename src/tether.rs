//! Panel-to-node tethers.
//!
//! Tethers run from a node to its open properties panel. Unlike connections
//! their anchors are not fixed: each render picks the node and panel edges
//! facing each other with [`smart_anchors`].

use crate::config::EditorOptions;
use crate::connections::CurveRenderer;
use crate::curve::CurveEnds;
use crate::error::FlowError;
use crate::geometry::{edge_center, Anchor, Rect, Side};
use crate::graph::GraphModel;
use crate::model::CurveHandles;

/// Picks the node and panel edges a tether connects.
///
/// The axis with the larger center delta wins; ties go horizontal. Returns
/// `(node_anchor, panel_anchor)`.
pub fn smart_anchors(node: &Rect, panel: &Rect) -> (Anchor, Anchor) {
    let nc = node.center();
    let pc = panel.center();
    let dx = pc.x - nc.x;
    let dy = pc.y - nc.y;

    let (node_side, panel_side) = if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    };

    let from = edge_center(node, node_side);
    let to = edge_center(panel, panel_side);
    (Anchor { point: from, side: node_side }, Anchor { point: to, side: panel_side })
}

/// Geometry of tethers, addressed by panel hash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetherEngine {
    standoff: f32,
}

impl TetherEngine {
    pub fn new(standoff: f32) -> Self {
        Self { standoff }
    }

    pub fn from_options(options: &EditorOptions) -> Self {
        Self::new(options.standoff)
    }

    /// Resets the tether of the panel belonging to `node_hash`, if one is
    /// open, and returns the panel hash.
    pub fn reset_for_node(&self, graph: &mut GraphModel, node_hash: &str) -> Option<String> {
        let hash = graph.panel_for_node(node_hash)?.hash.clone();
        if let Some(panel) = graph.panel_mut(&hash) {
            panel.tether.reset();
        }
        Some(hash)
    }
}

impl CurveRenderer for TetherEngine {
    fn ends(&self, graph: &GraphModel, hash: &str) -> Option<CurveEnds> {
        let panel = graph.panel(hash)?;
        let node = graph.node(&panel.node_hash)?;
        let (from, to) = smart_anchors(&node.rect(), &panel.rect());
        Some(CurveEnds::new(from, to, self.standoff))
    }

    fn handles<'g>(&self, graph: &'g GraphModel, hash: &str) -> Option<&'g CurveHandles> {
        graph.panel(hash).map(|p| &p.tether)
    }

    fn handles_mut<'g>(&self, graph: &'g mut GraphModel, hash: &str) -> Option<&'g mut CurveHandles> {
        graph.panel_mut(hash).map(|p| &mut p.tether)
    }

    fn not_found(&self, hash: &str) -> FlowError {
        FlowError::PanelNotFound(hash.to_owned())
    }
}
