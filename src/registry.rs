//! Node type registry.
//!
//! The registry is owned by the host application; the editor only reads the
//! defaults it needs to create nodes and size their properties panels.

use crate::geometry::Side;
use crate::model::{Port, PortDirection};
use std::collections::HashMap;

pub const FALLBACK_NODE_WIDTH: f32 = 180.0;
pub const FALLBACK_NODE_HEIGHT: f32 = 80.0;
pub const FALLBACK_PANEL_TYPE: &str = "Info";
pub const FALLBACK_PANEL_WIDTH: f32 = 300.0;
pub const FALLBACK_PANEL_HEIGHT: f32 = 200.0;

/// Port definition copied onto every new node of a type.
#[derive(Debug, Clone, PartialEq)]
pub struct PortTemplate {
    pub hash: String,
    pub direction: PortDirection,
    pub side: Side,
    pub label: String,
    pub minimum_input_count: u32,
    pub maximum_input_count: Option<u32>,
}

impl PortTemplate {
    pub fn input(hash: &str, side: Side) -> Self {
        Self {
            hash: hash.to_owned(),
            direction: PortDirection::Input,
            side,
            label: String::new(),
            minimum_input_count: 0,
            maximum_input_count: None,
        }
    }

    pub fn output(hash: &str, side: Side) -> Self {
        Self { direction: PortDirection::Output, ..Self::input(hash, side) }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub(crate) fn instantiate(&self, hash: String) -> Port {
        Port {
            hash,
            direction: self.direction,
            side: self.side,
            label: self.label.clone(),
            minimum_input_count: self.minimum_input_count,
            maximum_input_count: self.maximum_input_count,
        }
    }
}

/// Default properties panel of a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    pub panel_type: String,
    /// Panel title; `None` uses the node title.
    pub title: Option<String>,
    pub width: f32,
    pub height: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            panel_type: FALLBACK_PANEL_TYPE.to_owned(),
            title: None,
            width: FALLBACK_PANEL_WIDTH,
            height: FALLBACK_PANEL_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeTypeConfig {
    pub label: String,
    pub default_width: f32,
    pub default_height: f32,
    pub default_ports: Vec<PortTemplate>,
    pub properties_panel: Option<PanelConfig>,
    /// Opaque content descriptor for the host's body renderer.
    pub body_content: Option<String>,
}

impl NodeTypeConfig {
    pub fn new(label: &str, default_width: f32, default_height: f32) -> Self {
        Self {
            label: label.to_owned(),
            default_width,
            default_height,
            default_ports: Vec::new(),
            properties_panel: None,
            body_content: None,
        }
    }

    pub fn with_port(mut self, port: PortTemplate) -> Self {
        self.default_ports.push(port);
        self
    }

    pub fn with_panel(mut self, panel: PanelConfig) -> Self {
        self.properties_panel = Some(panel);
        self
    }

    /// One input on the left, one output on the right.
    pub fn fallback() -> Self {
        NodeTypeConfig::new("Node", FALLBACK_NODE_WIDTH, FALLBACK_NODE_HEIGHT)
            .with_port(PortTemplate::input("in", Side::Left))
            .with_port(PortTemplate::output("out", Side::Right))
    }
}

/// Source of node type defaults.
pub trait NodeTypeRegistry {
    fn node_type(&self, key: &str) -> Option<&NodeTypeConfig>;
}

/// HashMap-backed registry with a few built-in flowchart types.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeSet {
    types: HashMap<String, NodeTypeConfig>,
}

impl NodeTypeSet {
    /// Empty registry; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `start`, `end`, `process` and `decision`.
    pub fn with_builtin_types() -> Self {
        let mut set = Self::new();
        set.register(
            "start",
            NodeTypeConfig::new("Start", 140.0, 60.0).with_port(PortTemplate::output("out", Side::Right)),
        );
        set.register(
            "end",
            NodeTypeConfig::new("End", 140.0, 60.0).with_port(PortTemplate::input("in", Side::Left)),
        );
        set.register("process", NodeTypeConfig::fallback());
        set.register(
            "decision",
            NodeTypeConfig::new("Decision", 180.0, 100.0)
                .with_port(PortTemplate::input("in", Side::Left))
                .with_port(PortTemplate::output("yes", Side::Right).with_label("Yes"))
                .with_port(PortTemplate::output("no", Side::Bottom).with_label("No")),
        );
        set
    }

    pub fn register(&mut self, key: &str, config: NodeTypeConfig) {
        self.types.insert(key.to_owned(), config);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl NodeTypeRegistry for NodeTypeSet {
    fn node_type(&self, key: &str) -> Option<&NodeTypeConfig> {
        self.types.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_misses() {
        let set = NodeTypeSet::new();
        assert!(set.is_empty());
        assert!(set.node_type("start").is_none());
    }

    #[test]
    fn test_builtin_types() {
        let set = NodeTypeSet::with_builtin_types();
        let start = set.node_type("start").unwrap();
        assert_eq!(start.default_ports.len(), 1);
        assert_eq!(start.default_ports[0].direction, PortDirection::Output);

        let decision = set.node_type("decision").unwrap();
        assert_eq!(decision.default_ports.len(), 3);
        assert_eq!(decision.default_ports[2].side, Side::Bottom);
    }

    #[test]
    fn test_register_overrides() {
        let mut set = NodeTypeSet::with_builtin_types();
        set.register("start", NodeTypeConfig::new("Begin", 10.0, 10.0));
        assert_eq!(set.node_type("start").unwrap().label, "Begin");
    }

    #[test]
    fn test_fallback_panel_config() {
        let panel = PanelConfig::default();
        assert_eq!(panel.panel_type, "Info");
        assert_eq!(panel.width, FALLBACK_PANEL_WIDTH);
    }
}
