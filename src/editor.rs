//! The editor facade.
//!
//! [`FlowEditor`] owns the graph and every service working on it, keeps the
//! scene on its [`RenderTarget`] in sync after each mutation and announces
//! changes on its [`EventBus`]. Selection, viewport and pointer handling
//! live in their own modules as further `impl` blocks.

use crate::config::EditorOptions;
use crate::connections::{ConnectionRenderer, CurveRenderer};
use crate::curve::HandleKind;
use crate::error::FlowError;
use crate::events::{EventBus, EventKind, FlowEvent, SubscriptionId};
use crate::graph::{GraphModel, NodeEdit};
use crate::host::HostState;
use crate::interaction::InteractionController;
use crate::layout::LayoutEngine;
use crate::model::{new_hash, CurveHandles, FlowData, LineMode, SavedLayout, SavedRect, SavedView, Selection};
use crate::registry::NodeTypeRegistry;
use crate::render::{RenderTarget, SceneContext, SceneRenderer};
use crate::tether::TetherEngine;
use crate::viewport::ViewportController;
use indexmap::IndexMap;

pub struct FlowEditor<R: RenderTarget> {
    pub(crate) graph: GraphModel,
    pub(crate) registry: Box<dyn NodeTypeRegistry>,
    pub(crate) options: EditorOptions,
    pub(crate) connections: ConnectionRenderer,
    pub(crate) tethers: TetherEngine,
    pub(crate) layout: LayoutEngine,
    pub(crate) viewport: ViewportController,
    pub(crate) scene: SceneRenderer,
    pub(crate) target: R,
    pub(crate) events: EventBus,
    pub(crate) interaction: InteractionController,
    pub(crate) saved_layouts: IndexMap<String, SavedLayout>,
    pub(crate) host: Option<Box<dyn HostState>>,
}

impl<R: RenderTarget> FlowEditor<R> {
    /// Creates an editor with default options and mounts the empty scene.
    pub fn new(target: R, registry: impl NodeTypeRegistry + 'static) -> Self {
        Self::build(target, Box::new(registry), EditorOptions::default())
    }

    pub fn with_options(
        target: R,
        registry: impl NodeTypeRegistry + 'static,
        options: EditorOptions,
    ) -> Result<Self, FlowError> {
        options.validate().map_err(|err| {
            tracing::warn!(%err, "rejected editor options");
            err
        })?;
        Ok(Self::build(target, Box::new(registry), options))
    }

    fn build(target: R, registry: Box<dyn NodeTypeRegistry>, options: EditorOptions) -> Self {
        let mut editor = Self {
            graph: GraphModel::new(),
            registry,
            connections: ConnectionRenderer::from_options(&options),
            tethers: TetherEngine::from_options(&options),
            layout: LayoutEngine::new(options.layout.clone()),
            viewport: ViewportController::new(),
            scene: SceneRenderer::new(),
            target,
            events: EventBus::new(),
            interaction: InteractionController::new(),
            saved_layouts: IndexMap::new(),
            host: None,
            options,
        };
        editor.render();
        editor
    }

    /// Attaches the host state used by [`marshal_to_view`](Self::marshal_to_view)
    /// and [`marshal_from_view`](Self::marshal_from_view).
    pub fn set_host(&mut self, host: impl HostState + 'static) {
        self.host = Some(Box::new(host));
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn registry(&self) -> &dyn NodeTypeRegistry {
        self.registry.as_ref()
    }

    pub fn scene(&self) -> &SceneRenderer {
        &self.scene
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    // === Events ===

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&FlowEvent) + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&FlowEvent) + 'static,
    {
        self.events.subscribe_all(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Dispatches `event`, followed by `FlowChanged` and a host write when
    /// the event changed the flow data.
    pub(crate) fn emit(&mut self, event: FlowEvent) {
        self.events.emit(&event);
        if event.changes_flow() {
            self.flow_changed();
        }
    }

    pub(crate) fn flow_changed(&mut self) {
        self.events.emit(&FlowEvent::FlowChanged);
        self.sync_host();
    }

    /// Writes the flow data to the host without announcing a change. Used
    /// for view state (pan, zoom, selection) that is not a domain event.
    pub(crate) fn sync_host(&mut self) {
        if let Err(err) = self.marshal_from_view() {
            tracing::warn!(%err, "failed to write flow data to host");
        }
    }

    /// Runs a scene update with disjoint borrows of the editor state, then
    /// flushes the target.
    pub(crate) fn with_scene<F>(&mut self, f: F)
    where
        F: FnOnce(&mut SceneRenderer, &mut R, &SceneContext<'_>),
    {
        let ctx = SceneContext {
            graph: &self.graph,
            connections: &self.connections,
            tethers: &self.tethers,
            options: &self.options,
        };
        f(&mut self.scene, &mut self.target, &ctx);
        self.target.flush();
    }

    /// Full rebuild of the scene.
    pub fn render(&mut self) {
        self.with_scene(|scene, target, ctx| scene.render_all(target, ctx));
        let fullscreen = self.viewport.is_fullscreen();
        self.target.set_fullscreen(fullscreen);
    }

    // === Flow data ===

    pub fn get_flow_data(&self) -> FlowData {
        self.graph.to_flow_data()
    }

    /// Replaces the whole graph. Invalid entries are dropped with a warning;
    /// any interaction in progress is cancelled.
    pub fn set_flow_data(&mut self, data: FlowData) {
        self.cancel_interaction();
        self.graph = GraphModel::from_flow_data(data);
        let zoom = self.options.clamp_zoom(self.graph.view_state().zoom);
        self.graph.view_state_mut().zoom = zoom;
        self.render();
    }

    pub fn set_flow_data_json(&mut self, json: &str) -> Result<(), FlowError> {
        let data: FlowData = serde_json::from_str(json).map_err(|err| {
            tracing::warn!(%err, "set_flow_data_json: malformed payload");
            FlowError::from(err)
        })?;
        self.set_flow_data(data);
        Ok(())
    }

    pub fn flow_data_json(&self) -> Result<String, FlowError> {
        Ok(serde_json::to_string(&self.get_flow_data())?)
    }

    /// Loads the flow data stored at the configured host address.
    ///
    /// Returns `Ok(false)` when no address or host is configured or the
    /// address holds nothing.
    pub fn marshal_to_view(&mut self) -> Result<bool, FlowError> {
        let (Some(address), Some(host)) = (self.options.flow_data_address.as_deref(), self.host.as_ref()) else {
            tracing::debug!("marshal_to_view: no host address configured");
            return Ok(false);
        };
        let Some(value) = host.read(address) else {
            tracing::debug!(address, "marshal_to_view: nothing stored at address");
            return Ok(false);
        };
        let data: FlowData = serde_json::from_value(value).map_err(|err| {
            tracing::warn!(address, %err, "marshal_to_view: malformed flow data");
            FlowError::from(err)
        })?;
        self.set_flow_data(data);
        Ok(true)
    }

    /// Writes the current flow data to the configured host address.
    pub fn marshal_from_view(&mut self) -> Result<bool, FlowError> {
        let Some(address) = self.options.flow_data_address.clone() else {
            return Ok(false);
        };
        let value = serde_json::to_value(self.graph.to_flow_data())?;
        match self.host.as_mut() {
            Some(host) => {
                host.write(&address, value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // === Nodes ===

    pub fn add_node(
        &mut self,
        node_type: &str,
        x: f32,
        y: f32,
        title: Option<&str>,
        data: Option<serde_json::Value>,
    ) -> String {
        let hash = self.graph.add_node(self.registry.as_ref(), node_type, x, y, title, data);
        self.with_scene(|scene, target, ctx| scene.update_node(target, ctx, &hash));
        self.emit(FlowEvent::NodeAdded { node_hash: hash.clone() });
        hash
    }

    /// Removes a node with its connections and panel.
    pub fn remove_node(&mut self, hash: &str) -> Result<(), FlowError> {
        let previous = self.graph.view_state().selection.clone();
        let removed = self.graph.remove_node(hash)?;
        self.with_scene(|scene, target, ctx| {
            scene.remove_node(target, hash);
            for conn in &removed.connections {
                scene.remove_connection(target, &conn.hash);
            }
            if let Some(panel) = &removed.panel {
                scene.remove_panel(target, &panel.hash);
            }
        });
        if removed.selection_cleared {
            self.selection_changed(&previous);
        }
        self.emit(FlowEvent::NodeRemoved { node_hash: hash.to_owned() });
        Ok(())
    }

    /// Moves a node, resetting the curves attached to it.
    pub fn move_node(&mut self, hash: &str, x: f32, y: f32) -> Result<(), FlowError> {
        self.reposition_node(hash, x, y)?;
        self.emit(FlowEvent::NodeMoved { node_hash: hash.to_owned(), x, y });
        Ok(())
    }

    /// Moves a node and patches its visuals without announcing it.
    pub(crate) fn reposition_node(&mut self, hash: &str, x: f32, y: f32) -> Result<(), FlowError> {
        self.graph.set_node_position(hash, x, y)?;
        self.refresh_node_geometry(hash);
        Ok(())
    }

    fn refresh_node_geometry(&mut self, hash: &str) {
        self.connections.reset_for_node(&mut self.graph, hash);
        self.tethers.reset_for_node(&mut self.graph, hash);
        self.with_scene(|scene, target, ctx| {
            scene.update_node(target, ctx, hash);
            scene.update_connections_for_node(target, ctx, hash);
            scene.update_node_panel(target, ctx, hash);
        });
    }

    pub fn update_node(&mut self, hash: &str, edit: NodeEdit) -> Result<(), FlowError> {
        let resized = matches!(edit, NodeEdit::Width(_) | NodeEdit::Height(_));
        self.graph.update_node(hash, edit)?;
        if resized {
            self.refresh_node_geometry(hash);
        } else {
            self.with_scene(|scene, target, ctx| scene.update_node(target, ctx, hash));
        }
        self.emit(FlowEvent::NodeUpdated { node_hash: hash.to_owned() });
        Ok(())
    }

    // === Connections ===

    /// Connects two ports. New connections use the default line mode unless
    /// `data` is given.
    pub fn add_connection(
        &mut self,
        source_node: &str,
        source_port: &str,
        target_node: &str,
        target_port: &str,
        data: Option<CurveHandles>,
    ) -> Result<String, FlowError> {
        let data = data.unwrap_or_else(|| CurveHandles::with_mode(self.options.default_line_mode));
        let hash = self
            .graph
            .add_connection(source_node, source_port, target_node, target_port, Some(data))?;
        self.with_scene(|scene, target, ctx| scene.update_connection(target, ctx, &hash));
        self.emit(FlowEvent::ConnectionCreated { connection_hash: hash.clone() });
        Ok(hash)
    }

    pub fn remove_connection(&mut self, hash: &str) -> Result<(), FlowError> {
        let previous = self.graph.view_state().selection.clone();
        self.graph.remove_connection(hash)?;
        self.with_scene(|scene, target, _| scene.remove_connection(target, hash));
        if previous != self.graph.view_state().selection {
            self.selection_changed(&previous);
        }
        self.emit(FlowEvent::ConnectionRemoved { connection_hash: hash.to_owned() });
        Ok(())
    }

    pub fn update_connection_handle(&mut self, hash: &str, handle: HandleKind, x: f32, y: f32) -> Result<(), FlowError> {
        self.connections.update_handle_position(&mut self.graph, hash, handle, x, y)?;
        self.with_scene(|scene, target, ctx| scene.update_connection(target, ctx, hash));
        self.emit(FlowEvent::ConnectionHandleMoved { connection_hash: hash.to_owned(), handle });
        Ok(())
    }

    pub fn reset_connection_handles(&mut self, hash: &str) -> Result<(), FlowError> {
        self.connections.reset_handle_positions(&mut self.graph, hash)?;
        self.with_scene(|scene, target, ctx| scene.update_connection(target, ctx, hash));
        self.flow_changed();
        Ok(())
    }

    pub fn toggle_connection_line_mode(&mut self, hash: &str) -> Result<LineMode, FlowError> {
        let mode = self.connections.toggle_line_mode(&mut self.graph, hash)?;
        self.with_scene(|scene, target, ctx| scene.update_connection(target, ctx, hash));
        self.emit(FlowEvent::ConnectionModeChanged { connection_hash: hash.to_owned(), mode });
        Ok(mode)
    }

    pub fn set_connection_line_mode(&mut self, hash: &str, mode: LineMode) -> Result<(), FlowError> {
        self.connections.set_line_mode(&mut self.graph, hash, mode)?;
        self.with_scene(|scene, target, ctx| scene.update_connection(target, ctx, hash));
        self.emit(FlowEvent::ConnectionModeChanged { connection_hash: hash.to_owned(), mode });
        Ok(())
    }

    pub fn connection_path(&self, hash: &str) -> Option<String> {
        self.connections.path(&self.graph, hash)
    }

    // === Panels ===

    /// Opens the properties panel of a node, or returns the one already open.
    pub fn open_panel(&mut self, node_hash: &str) -> Result<String, FlowError> {
        let tether = CurveHandles::with_mode(self.options.default_line_mode);
        let (hash, created) = self.graph.open_panel(self.registry.as_ref(), node_hash, tether)?;
        if created {
            self.with_scene(|scene, target, ctx| {
                scene.update_panel(target, ctx, &hash);
                scene.update_node_panel(target, ctx, node_hash);
            });
            self.emit(FlowEvent::PanelOpened { panel_hash: hash.clone(), node_hash: node_hash.to_owned() });
        }
        Ok(hash)
    }

    pub fn close_panel(&mut self, panel_hash: &str) -> Result<(), FlowError> {
        let previous = self.graph.view_state().selection.clone();
        let panel = self.graph.close_panel(panel_hash)?;
        self.with_scene(|scene, target, ctx| {
            scene.remove_panel(target, panel_hash);
            scene.update_node_panel(target, ctx, &panel.node_hash);
        });
        if previous != self.graph.view_state().selection {
            self.selection_changed(&previous);
        }
        self.emit(FlowEvent::PanelClosed { panel_hash: panel.hash, node_hash: panel.node_hash });
        Ok(())
    }

    pub fn close_panel_for_node(&mut self, node_hash: &str) -> Result<(), FlowError> {
        match self.graph.panel_for_node(node_hash).map(|p| p.hash.clone()) {
            Some(hash) => self.close_panel(&hash),
            None => self.graph.close_panel_for_node(node_hash).map(|_| ()),
        }
    }

    /// Opens the panel of a node, or closes it if open. Returns whether the
    /// panel is open afterwards.
    pub fn toggle_panel(&mut self, node_hash: &str) -> Result<bool, FlowError> {
        if self.graph.panel_for_node(node_hash).is_some() {
            self.close_panel_for_node(node_hash)?;
            Ok(false)
        } else {
            self.open_panel(node_hash)?;
            Ok(true)
        }
    }

    pub fn move_panel(&mut self, panel_hash: &str, x: f32, y: f32) -> Result<(), FlowError> {
        self.reposition_panel(panel_hash, x, y)?;
        self.emit(FlowEvent::PanelMoved { panel_hash: panel_hash.to_owned() });
        Ok(())
    }

    pub(crate) fn reposition_panel(&mut self, panel_hash: &str, x: f32, y: f32) -> Result<(), FlowError> {
        let Some(panel) = self.graph.panel(panel_hash) else {
            tracing::warn!(panel = panel_hash, "move_panel: unknown panel");
            return Err(FlowError::PanelNotFound(panel_hash.to_owned()));
        };
        let (width, height) = (panel.width, panel.height);
        self.graph.set_panel_rect(panel_hash, x, y, width, height)?;
        self.tethers.reset_handle_positions(&mut self.graph, panel_hash)?;
        self.with_scene(|scene, target, ctx| scene.update_panel(target, ctx, panel_hash));
        Ok(())
    }

    pub fn resize_panel(&mut self, panel_hash: &str, width: f32, height: f32) -> Result<(), FlowError> {
        for (field, value) in [("Width", width), ("Height", height)] {
            if !(value.is_finite() && value > 0.0) {
                tracing::warn!(panel = panel_hash, field, value, "resize_panel: rejected size");
                return Err(FlowError::InvalidValue { field, value: value.to_string() });
            }
        }
        let Some(panel) = self.graph.panel(panel_hash) else {
            tracing::warn!(panel = panel_hash, "resize_panel: unknown panel");
            return Err(FlowError::PanelNotFound(panel_hash.to_owned()));
        };
        let (x, y) = (panel.x, panel.y);
        self.graph.set_panel_rect(panel_hash, x, y, width, height)?;
        self.tethers.reset_handle_positions(&mut self.graph, panel_hash)?;
        self.with_scene(|scene, target, ctx| scene.update_panel(target, ctx, panel_hash));
        self.emit(FlowEvent::PanelMoved { panel_hash: panel_hash.to_owned() });
        Ok(())
    }

    // === Tethers ===

    pub fn update_tether_handle(&mut self, panel_hash: &str, handle: HandleKind, x: f32, y: f32) -> Result<(), FlowError> {
        self.tethers.update_handle_position(&mut self.graph, panel_hash, handle, x, y)?;
        self.with_scene(|scene, target, ctx| scene.update_tether(target, ctx, panel_hash));
        self.emit(FlowEvent::TetherHandleMoved { panel_hash: panel_hash.to_owned(), handle });
        Ok(())
    }

    pub fn reset_tether_handles(&mut self, panel_hash: &str) -> Result<(), FlowError> {
        self.tethers.reset_handle_positions(&mut self.graph, panel_hash)?;
        self.with_scene(|scene, target, ctx| scene.update_tether(target, ctx, panel_hash));
        self.flow_changed();
        Ok(())
    }

    pub fn toggle_tether_line_mode(&mut self, panel_hash: &str) -> Result<LineMode, FlowError> {
        let mode = self.tethers.toggle_line_mode(&mut self.graph, panel_hash)?;
        self.with_scene(|scene, target, ctx| scene.update_tether(target, ctx, panel_hash));
        self.emit(FlowEvent::TetherModeChanged { panel_hash: panel_hash.to_owned(), mode });
        Ok(mode)
    }

    pub fn set_tether_line_mode(&mut self, panel_hash: &str, mode: LineMode) -> Result<(), FlowError> {
        self.tethers.set_line_mode(&mut self.graph, panel_hash, mode)?;
        self.with_scene(|scene, target, ctx| scene.update_tether(target, ctx, panel_hash));
        self.emit(FlowEvent::TetherModeChanged { panel_hash: panel_hash.to_owned(), mode });
        Ok(())
    }

    pub fn tether_path(&self, panel_hash: &str) -> Option<String> {
        self.tethers.path(&self.graph, panel_hash)
    }

    // === Layout ===

    fn reset_all_handles(&mut self) {
        let connections: Vec<String> = self.graph.connections().map(|c| c.hash.clone()).collect();
        for hash in connections {
            if let Some(conn) = self.graph.connection_mut(&hash) {
                conn.data.reset();
            }
        }
        let panels: Vec<String> = self.graph.panels().map(|p| p.hash.clone()).collect();
        for hash in panels {
            if let Some(panel) = self.graph.panel_mut(&hash) {
                panel.tether.reset();
            }
        }
    }

    /// Lays out every node and re-renders. Returns the moved node hashes.
    pub fn auto_layout(&mut self) -> Vec<String> {
        let moved = self.layout.auto_layout(&mut self.graph);
        tracing::debug!(nodes = moved.len(), "auto layout applied");
        self.reset_all_handles();
        self.render();
        self.flow_changed();
        moved
    }

    // === Saved layouts ===

    /// Snapshots node and panel geometry plus the view under `name`.
    pub fn save_layout(&mut self, name: &str) -> String {
        let view = self.graph.view_state();
        let layout = SavedLayout {
            hash: new_hash("layout"),
            name: name.to_owned(),
            created_at: chrono::Utc::now(),
            node_positions: self.graph.nodes().map(|n| (n.hash.clone(), SavedRect::from(n.rect()))).collect(),
            panel_positions: self
                .graph
                .panels()
                .map(|p| (p.node_hash.clone(), SavedRect::from(p.rect())))
                .collect(),
            view_state: SavedView { pan_x: view.pan_x, pan_y: view.pan_y, zoom: view.zoom },
        };
        let hash = layout.hash.clone();
        self.saved_layouts.insert(hash.clone(), layout);
        self.emit(FlowEvent::LayoutSaved { layout_hash: hash.clone() });
        hash
    }

    /// Applies a saved layout. Nodes it does not know are laid out to the
    /// right of the restored ones.
    pub fn restore_layout(&mut self, hash: &str) -> Result<(), FlowError> {
        let Some(layout) = self.saved_layouts.get(hash).cloned() else {
            tracing::warn!(layout = hash, "restore_layout: unknown layout");
            return Err(FlowError::LayoutNotFound(hash.to_owned()));
        };

        let node_hashes: Vec<String> = self.graph.nodes().map(|n| n.hash.clone()).collect();
        let (matched, unmatched): (Vec<String>, Vec<String>) =
            node_hashes.into_iter().partition(|h| layout.node_positions.contains_key(h));

        for node_hash in &matched {
            let (Some(rect), Some(node)) = (layout.node_positions.get(node_hash), self.graph.node_mut(node_hash)) else {
                continue;
            };
            node.x = rect.x;
            node.y = rect.y;
            if rect.width.is_finite() && rect.width > 0.0 {
                node.width = rect.width;
            }
            if rect.height.is_finite() && rect.height > 0.0 {
                node.height = rect.height;
            }
        }
        self.layout.auto_layout_subset(&mut self.graph, &unmatched, &matched);

        let panels: Vec<(String, String)> = self.graph.panels().map(|p| (p.hash.clone(), p.node_hash.clone())).collect();
        for (panel_hash, node_hash) in panels {
            let (Some(rect), Some(panel)) = (layout.panel_positions.get(&node_hash), self.graph.panel(&panel_hash)) else {
                continue;
            };
            let valid = |v: f32| v.is_finite() && v > 0.0;
            if !valid(rect.width) || !valid(rect.height) {
                tracing::warn!(
                    panel = %panel_hash,
                    width = rect.width,
                    height = rect.height,
                    "restore_layout: keeping panel size"
                );
            }
            let width = if valid(rect.width) { rect.width } else { panel.width };
            let height = if valid(rect.height) { rect.height } else { panel.height };
            self.graph.set_panel_rect(&panel_hash, rect.x, rect.y, width, height)?;
        }

        let zoom = self.options.clamp_zoom(layout.view_state.zoom);
        let view = self.graph.view_state_mut();
        view.pan_x = layout.view_state.pan_x;
        view.pan_y = layout.view_state.pan_y;
        view.zoom = zoom;

        self.reset_all_handles();
        self.render();
        self.emit(FlowEvent::LayoutRestored { layout_hash: hash.to_owned() });
        Ok(())
    }

    pub fn delete_layout(&mut self, hash: &str) -> Result<(), FlowError> {
        if self.saved_layouts.shift_remove(hash).is_none() {
            tracing::warn!(layout = hash, "delete_layout: unknown layout");
            return Err(FlowError::LayoutNotFound(hash.to_owned()));
        }
        self.emit(FlowEvent::LayoutDeleted { layout_hash: hash.to_owned() });
        Ok(())
    }

    pub fn saved_layouts(&self) -> impl Iterator<Item = &SavedLayout> {
        self.saved_layouts.values()
    }

    /// Replaces the saved layouts, e.g. with ones loaded by the host.
    pub fn load_saved_layouts(&mut self, layouts: Vec<SavedLayout>) {
        self.saved_layouts = layouts.into_iter().map(|l| (l.hash.clone(), l)).collect();
    }

    /// Announces that the selection moved away from `previous`.
    pub(crate) fn selection_changed(&mut self, previous: &Selection) {
        let selection = self.graph.view_state().selection.clone();
        self.scene.apply_selection(&mut self.target, &selection);
        self.target.flush();
        let event = match previous {
            Selection::Node(_) => FlowEvent::NodeSelected { node_hash: None },
            Selection::Connection(_) => FlowEvent::ConnectionSelected { connection_hash: None },
            Selection::Tether(_) => FlowEvent::TetherSelected { panel_hash: None },
            Selection::None => return,
        };
        self.emit(event);
    }
}
