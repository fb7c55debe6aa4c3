//! In-memory graph store.
//!
//! Nodes, connections and panels live in insertion-ordered maps keyed by
//! their hash, so every other component works with stable ids instead of
//! object identity. All mutations validate their input; rejections are
//! logged and returned as [`FlowError`].

use crate::error::FlowError;
use crate::model::{
    new_hash, Connection, CurveHandles, FlowData, Node, NodeStyle, Panel, Selection, ViewState,
};
use crate::registry::{NodeTypeConfig, NodeTypeRegistry, PanelConfig};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Horizontal gap between a node and a freshly opened panel.
pub const PANEL_GAP: f32 = 40.0;

/// Closed set of editable node fields.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEdit {
    Title(String),
    Width(f32),
    Height(f32),
    BodyFill(Option<String>),
    BorderColor(Option<String>),
    TitleBarColor(Option<String>),
    TextColor(Option<String>),
    Data(serde_json::Value),
}

impl NodeEdit {
    fn apply(self, node: &mut Node) -> Result<(), FlowError> {
        fn positive(field: &'static str, v: f32) -> Result<f32, FlowError> {
            if v.is_finite() && v > 0.0 {
                Ok(v)
            } else {
                Err(FlowError::InvalidValue { field, value: v.to_string() })
            }
        }
        fn style(node: &mut Node) -> &mut NodeStyle {
            node.style.get_or_insert_with(NodeStyle::default)
        }
        match self {
            NodeEdit::Title(title) => node.title = title,
            NodeEdit::Width(w) => node.width = positive("Width", w)?,
            NodeEdit::Height(h) => node.height = positive("Height", h)?,
            NodeEdit::BodyFill(v) => style(node).body_fill = v,
            NodeEdit::BorderColor(v) => style(node).border_color = v,
            NodeEdit::TitleBarColor(v) => style(node).title_bar_color = v,
            NodeEdit::TextColor(v) => style(node).text_color = v,
            NodeEdit::Data(data) => node.data = data,
        }
        Ok(())
    }
}

/// Everything [`GraphModel::remove_node`] took out of the graph.
#[derive(Debug, Clone)]
pub struct RemovedNode {
    pub node: Node,
    pub connections: Vec<Connection>,
    pub panel: Option<Panel>,
    pub selection_cleared: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: IndexMap<String, Node>,
    connections: IndexMap<String, Connection>,
    panels: IndexMap<String, Panel>,
    view_state: ViewState,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from host data, dropping anything that would violate
    /// the graph invariants.
    pub fn from_flow_data(data: FlowData) -> Self {
        let mut model = GraphModel::new();

        for node in data.nodes {
            if model.nodes.contains_key(&node.hash) {
                tracing::warn!(node = %node.hash, "dropping node with duplicate hash");
                continue;
            }
            model.nodes.insert(node.hash.clone(), node);
        }

        for conn in data.connections {
            if model.connections.contains_key(&conn.hash) {
                tracing::warn!(connection = %conn.hash, "dropping connection with duplicate hash");
                continue;
            }
            if let Err(err) = model.check_connection(
                &conn.source_node_hash,
                &conn.source_port_hash,
                &conn.target_node_hash,
                &conn.target_port_hash,
            ) {
                tracing::warn!(connection = %conn.hash, %err, "dropping invalid connection");
                continue;
            }
            model.connections.insert(conn.hash.clone(), conn);
        }

        for panel in data.open_panels {
            if !model.nodes.contains_key(&panel.node_hash) {
                tracing::warn!(panel = %panel.hash, node = %panel.node_hash, "dropping panel of unknown node");
                continue;
            }
            if model.panel_for_node(&panel.node_hash).is_some() || model.panels.contains_key(&panel.hash) {
                tracing::warn!(panel = %panel.hash, "dropping duplicate panel");
                continue;
            }
            model.panels.insert(panel.hash.clone(), panel);
        }

        model.view_state = data.view_state;
        let dangling = match &model.view_state.selection {
            Selection::None => false,
            Selection::Node(h) => !model.nodes.contains_key(h),
            Selection::Connection(h) => !model.connections.contains_key(h),
            Selection::Tether(h) => !model.panels.contains_key(h),
        };
        if dangling {
            tracing::warn!(selection = ?model.view_state.selection, "clearing dangling selection");
            model.view_state.selection = Selection::None;
        }
        model
    }

    pub fn to_flow_data(&self) -> FlowData {
        FlowData {
            nodes: self.nodes.values().cloned().collect(),
            connections: self.connections.values().cloned().collect(),
            open_panels: self.panels.values().cloned().collect(),
            view_state: self.view_state.clone(),
        }
    }

    // === Accessors ===

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, hash: &str) -> Option<&Node> {
        self.nodes.get(hash)
    }

    pub fn node_mut(&mut self, hash: &str) -> Option<&mut Node> {
        self.nodes.get_mut(hash)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection(&self, hash: &str) -> Option<&Connection> {
        self.connections.get(hash)
    }

    pub fn connection_mut(&mut self, hash: &str) -> Option<&mut Connection> {
        self.connections.get_mut(hash)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Hashes of all connections with `node_hash` as source or target.
    pub fn connections_for_node(&self, node_hash: &str) -> Vec<String> {
        self.connections
            .values()
            .filter(|c| c.touches(node_hash))
            .map(|c| c.hash.clone())
            .collect()
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    pub fn panel(&self, hash: &str) -> Option<&Panel> {
        self.panels.get(hash)
    }

    pub fn panel_mut(&mut self, hash: &str) -> Option<&mut Panel> {
        self.panels.get_mut(hash)
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn panel_for_node(&self, node_hash: &str) -> Option<&Panel> {
        self.panels.values().find(|p| p.node_hash == node_hash)
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn view_state_mut(&mut self) -> &mut ViewState {
        &mut self.view_state
    }

    /// Mutable access to nodes and connections at once, for layout passes.
    pub(crate) fn nodes_and_connections_mut(&mut self) -> (&mut IndexMap<String, Node>, &IndexMap<String, Connection>) {
        (&mut self.nodes, &self.connections)
    }

    // === Nodes ===

    /// Creates a node of `node_type` using the registry's defaults (or the
    /// fallback type when the key is unknown) and returns its hash.
    pub fn add_node(
        &mut self,
        registry: &dyn NodeTypeRegistry,
        node_type: &str,
        x: f32,
        y: f32,
        title: Option<&str>,
        data: Option<serde_json::Value>,
    ) -> String {
        let fallback;
        let config: &NodeTypeConfig = match registry.node_type(node_type) {
            Some(config) => config,
            None => {
                tracing::debug!(node_type, "unknown node type, using fallback defaults");
                fallback = NodeTypeConfig::fallback();
                &fallback
            }
        };

        let mut used = HashSet::new();
        let ports = config
            .default_ports
            .iter()
            .enumerate()
            .map(|(i, template)| {
                let hash = if template.hash.is_empty() || used.contains(&template.hash) {
                    format!("port-{}", i)
                } else {
                    template.hash.clone()
                };
                used.insert(hash.clone());
                template.instantiate(hash)
            })
            .collect();

        let hash = new_hash("node");
        let node = Node {
            hash: hash.clone(),
            node_type: node_type.to_owned(),
            x,
            y,
            width: config.default_width,
            height: config.default_height,
            title: title.map(str::to_owned).unwrap_or_else(|| config.label.clone()),
            ports,
            data: data.unwrap_or(serde_json::Value::Null),
            style: None,
        };
        self.nodes.insert(hash.clone(), node);
        hash
    }

    /// Inserts a fully specified node. Rejects duplicate hashes.
    pub fn insert_node(&mut self, node: Node) -> Result<(), FlowError> {
        if self.nodes.contains_key(&node.hash) {
            tracing::warn!(node = %node.hash, "insert_node: hash already in use");
            return Err(FlowError::InvalidFlowData(format!("duplicate node hash {}", node.hash)));
        }
        self.nodes.insert(node.hash.clone(), node);
        Ok(())
    }

    /// Removes a node together with its connections and panel.
    pub fn remove_node(&mut self, hash: &str) -> Result<RemovedNode, FlowError> {
        let Some(node) = self.nodes.shift_remove(hash) else {
            tracing::warn!(node = hash, "remove_node: unknown node");
            return Err(FlowError::NodeNotFound(hash.to_owned()));
        };

        let removed_conns: Vec<String> = self.connections_for_node(hash);
        let connections: Vec<Connection> = removed_conns
            .iter()
            .filter_map(|h| self.connections.shift_remove(h))
            .collect();

        let panel_hash = self.panel_for_node(hash).map(|p| p.hash.clone());
        let panel = panel_hash.and_then(|h| self.panels.shift_remove(&h));

        let selection_cleared = match &self.view_state.selection {
            Selection::Node(h) => h == hash,
            Selection::Connection(h) => connections.iter().any(|c| &c.hash == h),
            Selection::Tether(h) => panel.as_ref().is_some_and(|p| &p.hash == h),
            Selection::None => false,
        };
        if selection_cleared {
            self.view_state.selection = Selection::None;
        }

        Ok(RemovedNode { node, connections, panel, selection_cleared })
    }

    pub fn set_node_position(&mut self, hash: &str, x: f32, y: f32) -> Result<(), FlowError> {
        let Some(node) = self.nodes.get_mut(hash) else {
            tracing::warn!(node = hash, "set_node_position: unknown node");
            return Err(FlowError::NodeNotFound(hash.to_owned()));
        };
        node.x = x;
        node.y = y;
        Ok(())
    }

    pub fn update_node(&mut self, hash: &str, edit: NodeEdit) -> Result<(), FlowError> {
        let Some(node) = self.nodes.get_mut(hash) else {
            tracing::warn!(node = hash, "update_node: unknown node");
            return Err(FlowError::NodeNotFound(hash.to_owned()));
        };
        edit.apply(node).map_err(|err| {
            tracing::warn!(node = hash, %err, "update_node: rejected edit");
            err
        })
    }

    // === Connections ===

    fn check_connection(
        &self,
        src_node: &str,
        src_port: &str,
        tgt_node: &str,
        tgt_port: &str,
    ) -> Result<(), FlowError> {
        let source = self
            .nodes
            .get(src_node)
            .ok_or_else(|| FlowError::NodeNotFound(src_node.to_owned()))?;
        let target = self
            .nodes
            .get(tgt_node)
            .ok_or_else(|| FlowError::NodeNotFound(tgt_node.to_owned()))?;
        if source.port(src_port).is_none() {
            return Err(FlowError::PortNotFound { node: src_node.to_owned(), port: src_port.to_owned() });
        }
        if target.port(tgt_port).is_none() {
            return Err(FlowError::PortNotFound { node: tgt_node.to_owned(), port: tgt_port.to_owned() });
        }
        if src_node == tgt_node {
            return Err(FlowError::SameNode(src_node.to_owned()));
        }
        if self
            .connections
            .values()
            .any(|c| c.same_endpoints(src_node, src_port, tgt_node, tgt_port))
        {
            return Err(FlowError::DuplicateConnection {
                source_node: src_node.to_owned(),
                source_port: src_port.to_owned(),
                target_node: tgt_node.to_owned(),
                target_port: tgt_port.to_owned(),
            });
        }
        Ok(())
    }

    /// Connects two ports and returns the new connection's hash.
    ///
    /// Port directions are not checked here; the interaction layer only
    /// starts connections on outputs and completes them on inputs.
    pub fn add_connection(
        &mut self,
        src_node: &str,
        src_port: &str,
        tgt_node: &str,
        tgt_port: &str,
        data: Option<CurveHandles>,
    ) -> Result<String, FlowError> {
        if let Err(err) = self.check_connection(src_node, src_port, tgt_node, tgt_port) {
            tracing::warn!(%err, "add_connection rejected");
            return Err(err);
        }
        let hash = new_hash("conn");
        self.connections.insert(
            hash.clone(),
            Connection {
                hash: hash.clone(),
                source_node_hash: src_node.to_owned(),
                source_port_hash: src_port.to_owned(),
                target_node_hash: tgt_node.to_owned(),
                target_port_hash: tgt_port.to_owned(),
                data: data.unwrap_or_default(),
            },
        );
        Ok(hash)
    }

    pub fn remove_connection(&mut self, hash: &str) -> Result<Connection, FlowError> {
        let Some(conn) = self.connections.shift_remove(hash) else {
            tracing::warn!(connection = hash, "remove_connection: unknown connection");
            return Err(FlowError::ConnectionNotFound(hash.to_owned()));
        };
        if self.view_state.selection.connection() == Some(hash) {
            self.view_state.selection = Selection::None;
        }
        Ok(conn)
    }

    // === Panels ===

    /// Opens the properties panel of a node.
    ///
    /// Returns the panel hash and whether it was newly created; an already
    /// open panel is returned unchanged.
    pub fn open_panel(
        &mut self,
        registry: &dyn NodeTypeRegistry,
        node_hash: &str,
        tether: CurveHandles,
    ) -> Result<(String, bool), FlowError> {
        let Some(node) = self.nodes.get(node_hash) else {
            tracing::warn!(node = node_hash, "open_panel: unknown node");
            return Err(FlowError::NodeNotFound(node_hash.to_owned()));
        };
        if let Some(existing) = self.panel_for_node(node_hash) {
            return Ok((existing.hash.clone(), false));
        }

        let config = registry
            .node_type(&node.node_type)
            .and_then(|t| t.properties_panel.clone())
            .unwrap_or_else(PanelConfig::default);

        let hash = new_hash("panel");
        let panel = Panel {
            hash: hash.clone(),
            node_hash: node_hash.to_owned(),
            panel_type: config.panel_type,
            title: config.title.unwrap_or_else(|| node.title.clone()),
            x: node.x + node.width + PANEL_GAP,
            y: node.y,
            width: config.width,
            height: config.height,
            tether,
        };
        self.panels.insert(hash.clone(), panel);
        Ok((hash, true))
    }

    pub fn close_panel(&mut self, panel_hash: &str) -> Result<Panel, FlowError> {
        let Some(panel) = self.panels.shift_remove(panel_hash) else {
            tracing::warn!(panel = panel_hash, "close_panel: unknown panel");
            return Err(FlowError::PanelNotFound(panel_hash.to_owned()));
        };
        if self.view_state.selection.tether() == Some(panel_hash) {
            self.view_state.selection = Selection::None;
        }
        Ok(panel)
    }

    pub fn close_panel_for_node(&mut self, node_hash: &str) -> Result<Panel, FlowError> {
        match self.panel_for_node(node_hash).map(|p| p.hash.clone()) {
            Some(hash) => self.close_panel(&hash),
            None => {
                tracing::warn!(node = node_hash, "close_panel_for_node: no open panel");
                Err(FlowError::PanelNotFound(node_hash.to_owned()))
            }
        }
    }

    pub fn set_panel_rect(&mut self, panel_hash: &str, x: f32, y: f32, width: f32, height: f32) -> Result<(), FlowError> {
        let Some(panel) = self.panels.get_mut(panel_hash) else {
            tracing::warn!(panel = panel_hash, "set_panel_rect: unknown panel");
            return Err(FlowError::PanelNotFound(panel_hash.to_owned()));
        };
        panel.x = x;
        panel.y = y;
        panel.width = width;
        panel.height = height;
        Ok(())
    }
}
