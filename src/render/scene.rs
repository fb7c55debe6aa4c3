//! Scene construction and patching.
//!
//! [`SceneRenderer`] remembers which elements belong to which node,
//! connection, panel and tether, so live drags can patch only the affected
//! visuals. Every operation is best effort: a missing layer or element
//! turns the operation into a no-op.

use super::{attr, element_type, ElementId, ElementKind, RenderTarget, DEFAULT_PATH_HIT_WIDTH};
use crate::config::EditorOptions;
use crate::connections::{ConnectionRenderer, CurveRenderer};
use crate::curve::HandleKind;
use crate::geometry::{port_local_position, Point};
use crate::graph::GraphModel;
use crate::model::{LineMode, Selection};
use crate::tether::TetherEngine;
use std::collections::HashMap;

const DEFAULT_BODY_FILL: &str = "#ffffff";
const DEFAULT_BORDER_COLOR: &str = "#5a6270";
const DEFAULT_TITLE_BAR_COLOR: &str = "#e8ecf1";
const DEFAULT_TEXT_COLOR: &str = "#1f2328";
const INDICATOR_RADIUS: f32 = 4.0;
const CLOSE_BUTTON_SIZE: f32 = 16.0;

/// Everything a scene update reads.
#[derive(Clone, Copy)]
pub struct SceneContext<'a> {
    pub graph: &'a GraphModel,
    pub connections: &'a ConnectionRenderer,
    pub tethers: &'a TetherEngine,
    pub options: &'a EditorOptions,
}

#[derive(Debug, Clone, Copy)]
struct Layers {
    root: ElementId,
    connections: ElementId,
    nodes: ElementId,
    tethers: ElementId,
    panels: ElementId,
    overlay: ElementId,
}

#[derive(Debug, Clone)]
struct NodeElements {
    group: ElementId,
    body: ElementId,
    title: ElementId,
    label: ElementId,
    indicator: ElementId,
    ports: Vec<(String, ElementId)>,
}

#[derive(Debug, Clone)]
struct CurveElements {
    group: ElementId,
    path: ElementId,
    handles: Vec<ElementId>,
}

#[derive(Debug, Clone)]
struct PanelElements {
    group: ElementId,
    body: ElementId,
    titlebar: ElementId,
    label: ElementId,
    close: ElementId,
}

fn fmt(v: f32) -> String {
    v.to_string()
}

fn set_rect<T: RenderTarget + ?Sized>(target: &mut T, id: ElementId, x: f32, y: f32, w: f32, h: f32) {
    target.set_attribute(id, "x", &fmt(x));
    target.set_attribute(id, "y", &fmt(y));
    target.set_attribute(id, "width", &fmt(w));
    target.set_attribute(id, "height", &fmt(h));
}

fn set_circle<T: RenderTarget + ?Sized>(target: &mut T, id: ElementId, center: Point, r: f32) {
    target.set_attribute(id, "cx", &fmt(center.x));
    target.set_attribute(id, "cy", &fmt(center.y));
    target.set_attribute(id, "r", &fmt(r));
}

fn mode_str(mode: LineMode) -> &'static str {
    match mode {
        LineMode::Bezier => "bezier",
        LineMode::Orthogonal => "orthogonal",
    }
}

#[derive(Debug, Default)]
pub struct SceneRenderer {
    layers: Option<Layers>,
    nodes: HashMap<String, NodeElements>,
    connections: HashMap<String, CurveElements>,
    panels: HashMap<String, PanelElements>,
    tethers: HashMap<String, CurveElements>,
    drag_line: Option<ElementId>,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.layers.is_some()
    }

    pub fn node_element(&self, hash: &str) -> Option<ElementId> {
        self.nodes.get(hash).map(|n| n.group)
    }

    pub fn node_body_element(&self, hash: &str) -> Option<ElementId> {
        self.nodes.get(hash).map(|n| n.body)
    }

    pub fn port_element(&self, node_hash: &str, port_hash: &str) -> Option<ElementId> {
        self.nodes
            .get(node_hash)?
            .ports
            .iter()
            .find(|(h, _)| h == port_hash)
            .map(|(_, id)| *id)
    }

    pub fn connection_element(&self, hash: &str) -> Option<ElementId> {
        self.connections.get(hash).map(|c| c.group)
    }

    pub fn connection_path_element(&self, hash: &str) -> Option<ElementId> {
        self.connections.get(hash).map(|c| c.path)
    }

    pub fn panel_element(&self, hash: &str) -> Option<ElementId> {
        self.panels.get(hash).map(|p| p.group)
    }

    pub fn tether_element(&self, panel_hash: &str) -> Option<ElementId> {
        self.tethers.get(panel_hash).map(|t| t.group)
    }

    pub fn drag_line_element(&self) -> Option<ElementId> {
        self.drag_line
    }

    /// Removes every element the renderer created.
    pub fn clear<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        if let Some(layers) = self.layers.take() {
            target.remove_element(layers.root);
        }
        self.nodes.clear();
        self.connections.clear();
        self.panels.clear();
        self.tethers.clear();
        self.drag_line = None;
    }

    fn mount<T: RenderTarget + ?Sized>(&mut self, target: &mut T) -> Layers {
        let root = target.create_element(ElementKind::Group, None);
        let mut layer = |name: &str| {
            let id = target.create_element(ElementKind::Group, Some(root));
            target.set_attribute(id, "data-layer", name);
            id
        };
        let layers = Layers {
            root,
            connections: layer("connections"),
            nodes: layer("nodes"),
            tethers: layer("tethers"),
            panels: layer("panels"),
            overlay: layer("overlay"),
        };
        target.set_attribute(layers.overlay, attr::POINTER_EVENTS, "none");
        self.layers = Some(layers);
        layers
    }

    /// Rebuilds the whole scene from the graph.
    pub fn render_all<T: RenderTarget + ?Sized>(&mut self, target: &mut T, ctx: &SceneContext<'_>) {
        self.clear(target);
        self.mount(target);
        let graph = ctx.graph;
        for node in graph.nodes() {
            self.update_node(target, ctx, &node.hash);
        }
        for conn in graph.connections() {
            self.update_connection(target, ctx, &conn.hash);
        }
        for panel in graph.panels() {
            self.update_panel(target, ctx, &panel.hash);
        }
        self.apply_selection(target, &graph.view_state().selection);
        let view = graph.view_state();
        target.set_view_transform(view.pan_x, view.pan_y, view.zoom);
    }

    // === Nodes ===

    pub fn remove_node<T: RenderTarget + ?Sized>(&mut self, target: &mut T, hash: &str) {
        if let Some(elements) = self.nodes.remove(hash) {
            target.remove_element(elements.group);
        }
    }

    /// Creates or patches the visuals of one node. Removes them if the node
    /// no longer exists.
    pub fn update_node<T: RenderTarget + ?Sized>(&mut self, target: &mut T, ctx: &SceneContext<'_>, hash: &str) {
        let Some(layers) = self.layers else {
            tracing::debug!(node = hash, "scene not mounted, skipping node update");
            return;
        };
        let Some(node) = ctx.graph.node(hash) else {
            self.remove_node(target, hash);
            return;
        };

        let port_hashes: Vec<&str> = node.ports.iter().map(|p| p.hash.as_str()).collect();
        let stale = self.nodes.get(hash).is_some_and(|e| {
            !target.contains(e.group)
                || e.ports.len() != port_hashes.len()
                || e.ports.iter().zip(&port_hashes).any(|((h, _), p)| h != p)
        });
        if stale {
            self.remove_node(target, hash);
        }

        if !self.nodes.contains_key(hash) {
            let group = target.create_element(ElementKind::Group, Some(layers.nodes));
            target.set_attribute(group, attr::ELEMENT_TYPE, element_type::NODE);
            target.set_attribute(group, attr::NODE_HASH, hash);
            target.set_attribute(group, "data-node-type", &node.node_type);

            let mut child = |kind: ElementKind, ty: &str| {
                let id = target.create_element(kind, Some(group));
                target.set_attribute(id, attr::ELEMENT_TYPE, ty);
                target.set_attribute(id, attr::NODE_HASH, hash);
                id
            };
            let body = child(ElementKind::Rect, element_type::NODE_BODY);
            let title = child(ElementKind::Rect, element_type::NODE_TITLE);
            let label = child(ElementKind::Text, element_type::NODE_TITLE);
            let indicator = child(ElementKind::Circle, element_type::PANEL_INDICATOR);
            let ports = node
                .ports
                .iter()
                .map(|port| {
                    let id = child(ElementKind::Circle, element_type::PORT);
                    (port.hash.clone(), id)
                })
                .collect::<Vec<_>>();
            for (port, (_, id)) in node.ports.iter().zip(&ports) {
                target.set_attribute(*id, attr::PORT_HASH, &port.hash);
                target.set_attribute(*id, attr::PORT_DIRECTION, port.direction.as_str());
                target.set_attribute(*id, "data-port-side", port.side.as_str());
            }
            self.nodes.insert(hash.to_owned(), NodeElements { group, body, title, label, indicator, ports });
        }

        let Some(elements) = self.nodes.get(hash) else { return };
        let style = node.style.clone().unwrap_or_default();
        let title_h = ctx.options.title_bar_height.min(node.height);

        set_rect(target, elements.body, node.x, node.y, node.width, node.height);
        target.set_attribute(elements.body, "fill", style.body_fill.as_deref().unwrap_or(DEFAULT_BODY_FILL));
        target.set_attribute(elements.body, "stroke", style.border_color.as_deref().unwrap_or(DEFAULT_BORDER_COLOR));

        set_rect(target, elements.title, node.x, node.y, node.width, title_h);
        target.set_attribute(
            elements.title,
            "fill",
            style.title_bar_color.as_deref().unwrap_or(DEFAULT_TITLE_BAR_COLOR),
        );

        target.set_attribute(elements.label, "x", &fmt(node.x + 8.0));
        target.set_attribute(elements.label, "y", &fmt(node.y + title_h * 0.5));
        target.set_attribute(elements.label, "text", &node.title);
        target.set_attribute(elements.label, "fill", style.text_color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR));

        let indicator_center = Point::new(node.x + node.width - 2.0 * INDICATOR_RADIUS, node.y + title_h * 0.5);
        set_circle(target, elements.indicator, indicator_center, INDICATOR_RADIUS);
        let panel_open = ctx.graph.panel_for_node(hash).is_some();
        target.set_attribute(elements.indicator, "data-panel-open", if panel_open { "true" } else { "false" });

        for (port_hash, id) in &elements.ports {
            let Some((index, count)) = node.port_slot(port_hash) else { continue };
            let Some(port) = node.port(port_hash) else { continue };
            let local = port_local_position(
                port.side,
                index,
                count,
                node.width,
                node.height,
                ctx.options.title_bar_height,
            );
            set_circle(target, *id, Point::new(node.x + local.x, node.y + local.y), ctx.options.port_radius);
        }
    }

    // === Connections ===

    pub fn remove_connection<T: RenderTarget + ?Sized>(&mut self, target: &mut T, hash: &str) {
        if let Some(elements) = self.connections.remove(hash) {
            target.remove_element(elements.group);
        }
    }

    pub fn update_connection<T: RenderTarget + ?Sized>(
        &mut self,
        target: &mut T,
        ctx: &SceneContext<'_>,
        hash: &str,
    ) {
        let Some(layers) = self.layers else {
            tracing::debug!(connection = hash, "scene not mounted, skipping connection update");
            return;
        };
        let (Some(conn), Some(d)) = (ctx.graph.connection(hash), ctx.connections.path(ctx.graph, hash)) else {
            self.remove_connection(target, hash);
            return;
        };
        let handles = ctx.connections.handle_positions(ctx.graph, hash);
        let selected = ctx.graph.view_state().selection.connection() == Some(hash);

        let elements = update_curve(
            target,
            self.connections.remove(hash),
            layers.connections,
            CurveMarkers {
                group: element_type::CONNECTION,
                path: element_type::CONNECTION_PATH,
                handle: element_type::CONNECTION_HANDLE,
                hash_attr: attr::CONNECTION_HASH,
            },
            hash,
            &d,
            conn.data.line_mode,
            &handles,
            ctx.options.port_radius,
            selected,
        );
        self.connections.insert(hash.to_owned(), elements);
    }

    pub fn update_connections_for_node<T: RenderTarget + ?Sized>(
        &mut self,
        target: &mut T,
        ctx: &SceneContext<'_>,
        node_hash: &str,
    ) {
        for hash in ctx.graph.connections_for_node(node_hash) {
            self.update_connection(target, ctx, &hash);
        }
    }

    // === Panels and tethers ===

    pub fn remove_panel<T: RenderTarget + ?Sized>(&mut self, target: &mut T, hash: &str) {
        if let Some(elements) = self.panels.remove(hash) {
            target.remove_element(elements.group);
        }
        if let Some(elements) = self.tethers.remove(hash) {
            target.remove_element(elements.group);
        }
    }

    /// Creates or patches a panel and its tether.
    pub fn update_panel<T: RenderTarget + ?Sized>(&mut self, target: &mut T, ctx: &SceneContext<'_>, hash: &str) {
        let Some(layers) = self.layers else {
            tracing::debug!(panel = hash, "scene not mounted, skipping panel update");
            return;
        };
        let Some(panel) = ctx.graph.panel(hash) else {
            self.remove_panel(target, hash);
            return;
        };

        if self.panels.get(hash).is_some_and(|e| !target.contains(e.group)) {
            self.panels.remove(hash);
        }
        if !self.panels.contains_key(hash) {
            let group = target.create_element(ElementKind::Group, Some(layers.panels));
            target.set_attribute(group, attr::ELEMENT_TYPE, element_type::PANEL);
            target.set_attribute(group, attr::PANEL_HASH, hash);
            target.set_attribute(group, attr::NODE_HASH, &panel.node_hash);
            target.set_attribute(group, "data-panel-type", &panel.panel_type);

            let mut child = |kind: ElementKind, ty: &str| {
                let id = target.create_element(kind, Some(group));
                target.set_attribute(id, attr::ELEMENT_TYPE, ty);
                target.set_attribute(id, attr::PANEL_HASH, hash);
                id
            };
            let body = child(ElementKind::Rect, element_type::PANEL_BODY);
            let titlebar = child(ElementKind::Rect, element_type::PANEL_TITLEBAR);
            let label = child(ElementKind::Text, element_type::PANEL_TITLEBAR);
            let close = child(ElementKind::Rect, element_type::PANEL_CLOSE);
            self.panels.insert(hash.to_owned(), PanelElements { group, body, titlebar, label, close });
        }

        if let Some(elements) = self.panels.get(hash) {
            let title_h = ctx.options.title_bar_height.min(panel.height);
            set_rect(target, elements.body, panel.x, panel.y, panel.width, panel.height);
            set_rect(target, elements.titlebar, panel.x, panel.y, panel.width, title_h);
            target.set_attribute(elements.label, "x", &fmt(panel.x + 8.0));
            target.set_attribute(elements.label, "y", &fmt(panel.y + title_h * 0.5));
            target.set_attribute(elements.label, "text", &panel.title);
            let size = CLOSE_BUTTON_SIZE.min(title_h);
            let inset = (title_h - size) * 0.5;
            set_rect(target, elements.close, panel.x + panel.width - size - inset, panel.y + inset, size, size);
        }

        self.update_tether(target, ctx, hash);
    }

    pub fn update_tether<T: RenderTarget + ?Sized>(&mut self, target: &mut T, ctx: &SceneContext<'_>, panel_hash: &str) {
        let Some(layers) = self.layers else { return };
        let (Some(panel), Some(d)) = (ctx.graph.panel(panel_hash), ctx.tethers.path(ctx.graph, panel_hash)) else {
            if let Some(elements) = self.tethers.remove(panel_hash) {
                target.remove_element(elements.group);
            }
            return;
        };
        let handles = ctx.tethers.handle_positions(ctx.graph, panel_hash);
        let selected = ctx.graph.view_state().selection.tether() == Some(panel_hash);

        let elements = update_curve(
            target,
            self.tethers.remove(panel_hash),
            layers.tethers,
            CurveMarkers {
                group: element_type::TETHER,
                path: element_type::TETHER_PATH,
                handle: element_type::TETHER_HANDLE,
                hash_attr: attr::PANEL_HASH,
            },
            panel_hash,
            &d,
            panel.tether.line_mode,
            &handles,
            ctx.options.port_radius,
            selected,
        );
        self.tethers.insert(panel_hash.to_owned(), elements);
    }

    /// Re-renders the panel indicator and tether of a node after it moved
    /// or its panel opened or closed.
    pub fn update_node_panel<T: RenderTarget + ?Sized>(&mut self, target: &mut T, ctx: &SceneContext<'_>, node_hash: &str) {
        if let Some(panel) = ctx.graph.panel_for_node(node_hash) {
            self.update_tether(target, ctx, &panel.hash);
        }
        if let Some(elements) = self.nodes.get(node_hash) {
            let open = ctx.graph.panel_for_node(node_hash).is_some();
            target.set_attribute(elements.indicator, "data-panel-open", if open { "true" } else { "false" });
        }
    }

    // === Drag line ===

    pub fn show_drag_line<T: RenderTarget + ?Sized>(&mut self, target: &mut T, d: &str) {
        let Some(layers) = self.layers else { return };
        if let Some(old) = self.drag_line.take() {
            target.remove_element(old);
        }
        let id = target.create_element(ElementKind::Path, Some(layers.overlay));
        target.set_attribute(id, attr::ELEMENT_TYPE, element_type::DRAG_LINE);
        target.set_attribute(id, attr::POINTER_EVENTS, "none");
        target.set_attribute(id, "d", d);
        self.drag_line = Some(id);
    }

    pub fn update_drag_line<T: RenderTarget + ?Sized>(&mut self, target: &mut T, d: &str) {
        match self.drag_line {
            Some(id) if target.contains(id) => target.set_attribute(id, "d", d),
            _ => self.show_drag_line(target, d),
        }
    }

    pub fn remove_drag_line<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        if let Some(id) = self.drag_line.take() {
            target.remove_element(id);
        }
    }

    // === Selection and view ===

    /// Marks the selected element and shows handles of a selected curve.
    pub fn apply_selection<T: RenderTarget + ?Sized>(&mut self, target: &mut T, selection: &Selection) {
        let flag = |on: bool| if on { "true" } else { "false" };
        for (hash, e) in &self.nodes {
            target.set_attribute(e.group, attr::SELECTED, flag(selection.node() == Some(hash.as_str())));
        }
        for (hash, e) in &self.connections {
            let on = selection.connection() == Some(hash.as_str());
            target.set_attribute(e.group, attr::SELECTED, flag(on));
            for h in &e.handles {
                target.set_attribute(*h, attr::VISIBILITY, if on { "visible" } else { "hidden" });
            }
        }
        for (hash, e) in &self.tethers {
            let on = selection.tether() == Some(hash.as_str());
            target.set_attribute(e.group, attr::SELECTED, flag(on));
            for h in &e.handles {
                target.set_attribute(*h, attr::VISIBILITY, if on { "visible" } else { "hidden" });
            }
        }
    }

    pub fn apply_view<T: RenderTarget + ?Sized>(&mut self, target: &mut T, pan_x: f32, pan_y: f32, zoom: f32) {
        target.set_view_transform(pan_x, pan_y, zoom);
        if let Some(layers) = self.layers {
            target.set_attribute(
                layers.root,
                "transform",
                &format!("translate({} {}) scale({})", pan_x, pan_y, zoom),
            );
        }
    }
}

struct CurveMarkers {
    group: &'static str,
    path: &'static str,
    handle: &'static str,
    hash_attr: &'static str,
}

#[allow(clippy::too_many_arguments)]
fn update_curve<T: RenderTarget + ?Sized>(
    target: &mut T,
    existing: Option<CurveElements>,
    layer: ElementId,
    markers: CurveMarkers,
    hash: &str,
    d: &str,
    mode: LineMode,
    handles: &[(HandleKind, Point)],
    handle_radius: f32,
    selected: bool,
) -> CurveElements {
    let mut elements = match existing.filter(|e| target.contains(e.group)) {
        Some(e) => e,
        None => {
            let group = target.create_element(ElementKind::Group, Some(layer));
            target.set_attribute(group, attr::ELEMENT_TYPE, markers.group);
            target.set_attribute(group, markers.hash_attr, hash);
            let path = target.create_element(ElementKind::Path, Some(group));
            target.set_attribute(path, attr::ELEMENT_TYPE, markers.path);
            target.set_attribute(path, markers.hash_attr, hash);
            target.set_attribute(path, attr::HIT_WIDTH, &DEFAULT_PATH_HIT_WIDTH.to_string());
            CurveElements { group, path, handles: Vec::new() }
        }
    };

    target.set_attribute(elements.group, attr::LINE_MODE, mode_str(mode));
    target.set_attribute(elements.group, attr::SELECTED, if selected { "true" } else { "false" });
    target.set_attribute(elements.path, "d", d);

    // The handle set depends on the line mode, so handles are rebuilt.
    for h in elements.handles.drain(..) {
        target.remove_element(h);
    }
    for (kind, p) in handles {
        let id = target.create_element(ElementKind::Circle, Some(elements.group));
        target.set_attribute(id, attr::ELEMENT_TYPE, markers.handle);
        target.set_attribute(id, markers.hash_attr, hash);
        target.set_attribute(id, attr::HANDLE_TYPE, kind.as_str());
        target.set_attribute(id, attr::VISIBILITY, if selected { "visible" } else { "hidden" });
        set_circle(target, id, *p, handle_radius);
        elements.handles.push(id);
    }
    elements
}
