//! Pointer and keyboard state machine.
//!
//! Exactly one [`InteractionState`] is active. Entering any state other
//! than `Idle` captures the pointer and leaving it always releases the
//! capture. Live drags mutate the graph and patch only the affected
//! visuals; pointer-up finalizes (snapping, events, host write).

use crate::connections::CurveRenderer;
use crate::curve::HandleKind;
use crate::editor::FlowEditor;
use crate::events::FlowEvent;
use crate::geometry::Point;
use crate::hit_test::{classify, find_port_at, HitTarget};
use crate::layout::snap_to_grid;
use crate::model::PortDirection;
use crate::render::{ElementId, RenderTarget};

/// A connection or a tether, addressed by connection or panel hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveTarget {
    Connection(String),
    Tether(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingNode {
        node_hash: String,
        /// Model position of the pointer at press time.
        start: Point,
        /// Node position at press time.
        origin: Point,
        moved: bool,
    },
    DraggingPanel {
        panel_hash: String,
        start: Point,
        origin: Point,
        moved: bool,
    },
    DraggingHandle {
        target: CurveTarget,
        handle: HandleKind,
        moved: bool,
    },
    Connecting {
        node_hash: String,
        port_hash: String,
    },
    Panning {
        /// Canvas position of the pointer at press time.
        start: Point,
        origin_pan: Point,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::DraggingNode { .. } => "dragging-node",
            InteractionState::DraggingPanel { .. } => "dragging-panel",
            InteractionState::DraggingHandle { .. } => "dragging-handle",
            InteractionState::Connecting { .. } => "connecting",
            InteractionState::Panning { .. } => "panning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
    /// Element under the pointer, if the host already knows it. Otherwise
    /// the render target is asked.
    pub target: Option<ElementId>,
    /// Wall-clock milliseconds, used for double-click detection.
    pub timestamp_ms: u64,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self { x, y, button: PointerButton::Primary, target: None, timestamp_ms }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Other,
}

/// Where keyboard focus was when a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFocus {
    #[default]
    Canvas,
    TextInput,
    PanelBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub focus: KeyFocus,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, focus: KeyFocus::Canvas }
    }

    pub fn with_focus(mut self, focus: KeyFocus) -> Self {
        self.focus = focus;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClickKey {
    Node(String),
    Curve(CurveTarget),
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
    last_click: Option<(ClickKey, u64)>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Records a click and tells whether it completes a double click on the
    /// same thing. A completed double click is forgotten, so a third click
    /// starts over.
    fn register_click(&mut self, key: ClickKey, timestamp_ms: u64, threshold_ms: u64) -> bool {
        if let Some((last, at)) = &self.last_click {
            if *last == key && timestamp_ms.saturating_sub(*at) <= threshold_ms {
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((key, timestamp_ms));
        false
    }

    /// A press on anything that cannot be double-clicked breaks a pending
    /// double click.
    fn forget_click(&mut self) {
        self.last_click = None;
    }
}

impl<R: RenderTarget> FlowEditor<R> {
    pub fn interaction_state(&self) -> &InteractionState {
        self.interaction.state()
    }

    fn enter(&mut self, state: InteractionState) {
        tracing::debug!(from = self.interaction.state.name(), to = state.name(), "interaction state");
        self.target.capture_pointer();
        self.interaction.state = state;
    }

    fn leave(&mut self) -> InteractionState {
        let state = std::mem::take(&mut self.interaction.state);
        if !state.is_idle() {
            tracing::debug!(from = state.name(), "interaction state back to idle");
            self.target.release_pointer();
        }
        state
    }

    /// Drops the active interaction without finalizing it.
    pub fn cancel_interaction(&mut self) {
        if let InteractionState::Connecting { .. } = self.leave() {
            self.scene.remove_drag_line(&mut self.target);
            self.target.flush();
        }
    }

    fn set_moved(&mut self) {
        match &mut self.interaction.state {
            InteractionState::DraggingNode { moved, .. }
            | InteractionState::DraggingPanel { moved, .. }
            | InteractionState::DraggingHandle { moved, .. } => *moved = true,
            _ => {}
        }
    }

    fn hit_at(&self, event: &PointerEvent) -> HitTarget {
        let element = event.target.or_else(|| self.target.element_at(event.x, event.y));
        classify(&self.target, element)
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        if event.button != PointerButton::Primary {
            return;
        }
        if !self.interaction.state.is_idle() {
            tracing::debug!(state = self.interaction.state.name(), "pointer down while busy, finalizing");
            self.finish_interaction(&event);
        }
        let Some(model) = self.screen_to_model(event.x, event.y) else {
            tracing::warn!("pointer down: screen transform not invertible");
            return;
        };

        let hit = self.hit_at(&event);
        if !matches!(
            hit,
            HitTarget::Port { direction: PortDirection::Input, .. }
                | HitTarget::NodeBody { .. }
                | HitTarget::ConnectionHandle { .. }
                | HitTarget::TetherHandle { .. }
        ) {
            self.interaction.forget_click();
        }

        match hit {
            HitTarget::Port { node_hash, port_hash, direction: PortDirection::Output } => {
                let Some(from) = self
                    .graph
                    .node(&node_hash)
                    .and_then(|n| self.connections.port_anchor(n, &port_hash))
                else {
                    return;
                };
                let d = self.connections.drag_line_path(from, model);
                self.scene.show_drag_line(&mut self.target, &d);
                self.target.flush();
                self.enter(InteractionState::Connecting { node_hash, port_hash });
            }
            HitTarget::Port { node_hash, .. } | HitTarget::NodeBody { node_hash } => {
                self.node_pressed(node_hash, model, event.timestamp_ms);
            }
            HitTarget::PanelTitlebar { panel_hash } => {
                let Some(panel) = self.graph.panel(&panel_hash) else { return };
                let origin = Point::new(panel.x, panel.y);
                self.enter(InteractionState::DraggingPanel { panel_hash, start: model, origin, moved: false });
            }
            HitTarget::PanelClose { panel_hash } => {
                let _ = self.close_panel(&panel_hash);
            }
            HitTarget::PanelBody { .. } => {}
            HitTarget::ConnectionHandle { connection_hash, handle } => {
                self.handle_pressed(CurveTarget::Connection(connection_hash), handle, event.timestamp_ms);
            }
            HitTarget::TetherHandle { panel_hash, handle } => {
                self.handle_pressed(CurveTarget::Tether(panel_hash), handle, event.timestamp_ms);
            }
            HitTarget::Connection { connection_hash } => {
                let _ = self.select_connection(Some(&connection_hash));
            }
            HitTarget::Tether { panel_hash } => {
                let _ = self.select_tether(Some(&panel_hash));
            }
            HitTarget::Background => {
                self.clear_selection();
                if self.options.enable_panning {
                    if let Some(start) = self.screen_to_canvas(event.x, event.y) {
                        let origin_pan = self.pan();
                        self.enter(InteractionState::Panning { start, origin_pan });
                    }
                }
            }
        }
    }

    fn node_pressed(&mut self, node_hash: String, model: Point, timestamp_ms: u64) {
        let threshold = self.options.double_click_threshold_ms;
        if self.interaction.register_click(ClickKey::Node(node_hash.clone()), timestamp_ms, threshold) {
            if let Err(err) = self.toggle_panel(&node_hash) {
                tracing::warn!(node = %node_hash, %err, "double click: failed to toggle panel");
            }
            return;
        }
        if self.select_node(Some(&node_hash)).is_err() {
            return;
        }
        let Some(node) = self.graph.node(&node_hash) else { return };
        let origin = Point::new(node.x, node.y);
        self.enter(InteractionState::DraggingNode { node_hash, start: model, origin, moved: false });
    }

    fn handle_pressed(&mut self, target: CurveTarget, handle: HandleKind, timestamp_ms: u64) {
        let threshold = self.options.double_click_threshold_ms;
        if self.interaction.register_click(ClickKey::Curve(target.clone()), timestamp_ms, threshold) {
            let _ = match &target {
                CurveTarget::Connection(hash) => self.toggle_connection_line_mode(hash),
                CurveTarget::Tether(hash) => self.toggle_tether_line_mode(hash),
            };
            return;
        }
        let selected = match &target {
            CurveTarget::Connection(hash) => self.select_connection(Some(hash)),
            CurveTarget::Tether(hash) => self.select_tether(Some(hash)),
        };
        if selected.is_ok() {
            self.enter(InteractionState::DraggingHandle { target, handle, moved: false });
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let state = self.interaction.state.clone();
        if state.is_idle() {
            return;
        }
        let Some(model) = self.screen_to_model(event.x, event.y) else { return };

        match state {
            InteractionState::Idle => {}
            InteractionState::DraggingNode { node_hash, start, origin, .. } => {
                let to = origin.add(model.sub(start));
                if self.reposition_node(&node_hash, to.x, to.y).is_ok() {
                    self.set_moved();
                }
            }
            InteractionState::DraggingPanel { panel_hash, start, origin, .. } => {
                let to = origin.add(model.sub(start));
                if self.reposition_panel(&panel_hash, to.x, to.y).is_ok() {
                    self.set_moved();
                }
            }
            InteractionState::DraggingHandle { target, handle, .. } => {
                let updated = match &target {
                    CurveTarget::Connection(hash) => {
                        let updated = self
                            .connections
                            .update_handle_position(&mut self.graph, hash, handle, model.x, model.y)
                            .is_ok();
                        if updated {
                            self.with_scene(|scene, t, ctx| scene.update_connection(t, ctx, hash));
                        }
                        updated
                    }
                    CurveTarget::Tether(hash) => {
                        let updated = self
                            .tethers
                            .update_handle_position(&mut self.graph, hash, handle, model.x, model.y)
                            .is_ok();
                        if updated {
                            self.with_scene(|scene, t, ctx| scene.update_tether(t, ctx, hash));
                        }
                        updated
                    }
                };
                if updated {
                    self.set_moved();
                }
            }
            InteractionState::Connecting { node_hash, port_hash } => {
                let Some(from) = self
                    .graph
                    .node(&node_hash)
                    .and_then(|n| self.connections.port_anchor(n, &port_hash))
                else {
                    return;
                };
                let d = self.connections.drag_line_path(from, model);
                self.scene.update_drag_line(&mut self.target, &d);
                self.target.flush();
            }
            InteractionState::Panning { start, origin_pan } => {
                if let Some(canvas) = self.screen_to_canvas(event.x, event.y) {
                    let pan = origin_pan.add(canvas.sub(start));
                    let zoom = self.zoom();
                    self.apply_view(pan, zoom);
                }
            }
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        if event.button != PointerButton::Primary {
            return;
        }
        self.finish_interaction(&event);
    }

    /// Finalizes the active interaction. The host copy is refreshed after
    /// every pointer-up, including pans and plain clicks.
    fn finish_interaction(&mut self, event: &PointerEvent) {
        self.finalize(event);
        self.sync_host();
    }

    fn finalize(&mut self, event: &PointerEvent) {
        match self.leave() {
            InteractionState::Idle | InteractionState::Panning { .. } => {}
            InteractionState::DraggingNode { node_hash, moved: true, .. } => {
                let Some(node) = self.graph.node(&node_hash) else { return };
                let (mut x, mut y) = (node.x, node.y);
                if self.options.snap_to_grid {
                    x = snap_to_grid(x, self.options.grid_size);
                    y = snap_to_grid(y, self.options.grid_size);
                }
                if let Err(err) = self.move_node(&node_hash, x, y) {
                    tracing::warn!(node = %node_hash, %err, "failed to finalize node drag");
                }
            }
            InteractionState::DraggingPanel { panel_hash, moved: true, .. } => {
                self.with_scene(|scene, target, ctx| scene.update_panel(target, ctx, &panel_hash));
                self.emit(FlowEvent::PanelMoved { panel_hash });
            }
            InteractionState::DraggingHandle { target, handle, moved: true } => match target {
                CurveTarget::Connection(connection_hash) => {
                    self.emit(FlowEvent::ConnectionHandleMoved { connection_hash, handle })
                }
                CurveTarget::Tether(panel_hash) => self.emit(FlowEvent::TetherHandleMoved { panel_hash, handle }),
            },
            InteractionState::DraggingNode { .. }
            | InteractionState::DraggingPanel { .. }
            | InteractionState::DraggingHandle { .. } => {}
            InteractionState::Connecting { node_hash, port_hash } => {
                self.scene.remove_drag_line(&mut self.target);
                self.target.flush();
                if let Some((target_node, target_port)) = self.input_port_at(event) {
                    let _ = self.add_connection(&node_hash, &port_hash, &target_node, &target_port, None);
                } else {
                    tracing::debug!("connection dropped away from an input port");
                }
            }
        }
    }

    /// Input port under a pointer event: the element first, then a model
    /// space search within the port hit radius.
    fn input_port_at(&self, event: &PointerEvent) -> Option<(String, String)> {
        if let HitTarget::Port { node_hash, port_hash, direction: PortDirection::Input } = self.hit_at(event) {
            return Some((node_hash, port_hash));
        }
        let model = self.screen_to_model(event.x, event.y)?;
        find_port_at(
            &self.graph,
            &self.connections,
            model,
            self.options.port_hit_radius,
            Some(PortDirection::Input),
        )
    }

    /// Handles a key press. Returns whether the key was consumed.
    pub fn key_down(&mut self, event: KeyEvent) -> bool {
        match event.key {
            Key::Escape => {
                if let InteractionState::Connecting { .. } = self.interaction.state {
                    self.cancel_interaction();
                } else if self.is_fullscreen() {
                    self.set_fullscreen(false);
                } else {
                    self.clear_selection();
                }
                true
            }
            Key::Delete | Key::Backspace => {
                if event.focus != KeyFocus::Canvas {
                    return false;
                }
                self.delete_selected().unwrap_or(false)
            }
            Key::Other => false,
        }
    }
}
