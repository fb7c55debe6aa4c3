//! Connection geometry.
//!
//! [`ConnectionRenderer`] turns port positions into anchors and hands them
//! to the path generator. The handle and line-mode operations it shares with
//! [`TetherEngine`](crate::tether::TetherEngine) live on the [`CurveRenderer`]
//! trait, so both are driven the same way by the interaction layer.

use crate::config::EditorOptions;
use crate::curve::{CurveEnds, HandleKind};
use crate::error::FlowError;
use crate::geometry::{port_local_position, Anchor, Point};
use crate::graph::GraphModel;
use crate::model::{CurveHandles, LineMode, Node};
use crate::path::bezier_path;

/// Curve operations of an entity addressed by hash (a connection, or a
/// panel for tethers).
pub trait CurveRenderer {
    /// Anchors of the entity's curve, or `None` if it cannot be resolved.
    fn ends(&self, graph: &GraphModel, hash: &str) -> Option<CurveEnds>;

    fn handles<'g>(&self, graph: &'g GraphModel, hash: &str) -> Option<&'g CurveHandles>;

    fn handles_mut<'g>(&self, graph: &'g mut GraphModel, hash: &str) -> Option<&'g mut CurveHandles>;

    fn not_found(&self, hash: &str) -> FlowError;

    /// SVG path of the entity's curve.
    fn path(&self, graph: &GraphModel, hash: &str) -> Option<String> {
        let ends = self.ends(graph, hash)?;
        Some(self.handles(graph, hash)?.path(&ends))
    }

    fn handle_positions(&self, graph: &GraphModel, hash: &str) -> Vec<(HandleKind, Point)> {
        match (self.ends(graph, hash), self.handles(graph, hash)) {
            (Some(ends), Some(handles)) => handles.handle_positions(&ends),
            _ => Vec::new(),
        }
    }

    /// Moves one handle and marks the curve customized.
    fn update_handle_position(
        &self,
        graph: &mut GraphModel,
        hash: &str,
        kind: HandleKind,
        x: f32,
        y: f32,
    ) -> Result<(), FlowError> {
        let Some(ends) = self.ends(graph, hash) else {
            let err = self.not_found(hash);
            tracing::warn!(hash, %err, "update_handle_position rejected");
            return Err(err);
        };
        let handles = self.handles_mut(graph, hash).ok_or_else(|| self.not_found(hash))?;
        handles.move_handle(kind, Point::new(x, y), &ends);
        Ok(())
    }

    fn reset_handle_positions(&self, graph: &mut GraphModel, hash: &str) -> Result<(), FlowError> {
        match self.handles_mut(graph, hash) {
            Some(handles) => {
                handles.reset();
                Ok(())
            }
            None => {
                let err = self.not_found(hash);
                tracing::warn!(hash, %err, "reset_handle_positions rejected");
                Err(err)
            }
        }
    }

    fn toggle_line_mode(&self, graph: &mut GraphModel, hash: &str) -> Result<LineMode, FlowError> {
        match self.handles_mut(graph, hash) {
            Some(handles) => Ok(handles.toggle_line_mode()),
            None => {
                let err = self.not_found(hash);
                tracing::warn!(hash, %err, "toggle_line_mode rejected");
                Err(err)
            }
        }
    }

    fn set_line_mode(&self, graph: &mut GraphModel, hash: &str, mode: LineMode) -> Result<(), FlowError> {
        match self.handles_mut(graph, hash) {
            Some(handles) => {
                handles.set_line_mode(mode);
                Ok(())
            }
            None => {
                let err = self.not_found(hash);
                tracing::warn!(hash, %err, "set_line_mode rejected");
                Err(err)
            }
        }
    }
}

/// Geometry of port-to-port connections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionRenderer {
    standoff: f32,
    title_bar_height: f32,
}

impl ConnectionRenderer {
    pub fn new(standoff: f32, title_bar_height: f32) -> Self {
        Self { standoff, title_bar_height }
    }

    pub fn from_options(options: &EditorOptions) -> Self {
        Self::new(options.standoff, options.title_bar_height)
    }

    pub fn standoff(&self) -> f32 {
        self.standoff
    }

    /// Absolute model position of a port, facing its side.
    pub fn port_anchor(&self, node: &Node, port_hash: &str) -> Option<Anchor> {
        let port = node.port(port_hash)?;
        let (index, count) = node.port_slot(port_hash)?;
        let local = port_local_position(port.side, index, count, node.width, node.height, self.title_bar_height);
        Some(Anchor::new(node.x + local.x, node.y + local.y, port.side))
    }

    /// Provisional line from a port to the pointer while connecting.
    pub fn drag_line_path(&self, from: Anchor, to: Point) -> String {
        let to = Anchor { point: to, side: from.side.opposite() };
        bezier_path(&from, &to, self.standoff)
    }

    /// Resets the handles of every connection attached to `node_hash` and
    /// returns their hashes.
    pub fn reset_for_node(&self, graph: &mut GraphModel, node_hash: &str) -> Vec<String> {
        let hashes = graph.connections_for_node(node_hash);
        for hash in &hashes {
            if let Some(conn) = graph.connection_mut(hash) {
                conn.data.reset();
            }
        }
        hashes
    }
}

impl CurveRenderer for ConnectionRenderer {
    fn ends(&self, graph: &GraphModel, hash: &str) -> Option<CurveEnds> {
        let conn = graph.connection(hash)?;
        let from = self.port_anchor(graph.node(&conn.source_node_hash)?, &conn.source_port_hash)?;
        let to = self.port_anchor(graph.node(&conn.target_node_hash)?, &conn.target_port_hash)?;
        Some(CurveEnds::new(from, to, self.standoff))
    }

    fn handles<'g>(&self, graph: &'g GraphModel, hash: &str) -> Option<&'g CurveHandles> {
        graph.connection(hash).map(|c| &c.data)
    }

    fn handles_mut<'g>(&self, graph: &'g mut GraphModel, hash: &str) -> Option<&'g mut CurveHandles> {
        graph.connection_mut(hash).map(|c| &mut c.data)
    }

    fn not_found(&self, hash: &str) -> FlowError {
        FlowError::ConnectionNotFound(hash.to_owned())
    }
}
