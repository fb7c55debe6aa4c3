//! Exclusive selection.
//!
//! At most one node, connection or tether is selected. Selecting one kind
//! clears the others; the matching `*Selected` event fires only when the
//! selection actually changed.

use crate::editor::FlowEditor;
use crate::error::FlowError;
use crate::events::FlowEvent;
use crate::model::Selection;
use crate::render::RenderTarget;

impl<R: RenderTarget> FlowEditor<R> {
    pub fn selection(&self) -> &Selection {
        &self.graph.view_state().selection
    }

    /// Stores `selection` and re-marks the scene. Returns false if nothing
    /// changed.
    fn replace_selection(&mut self, selection: Selection) -> bool {
        if self.graph.view_state().selection == selection {
            return false;
        }
        tracing::debug!(?selection, "selection changed");
        self.graph.view_state_mut().selection = selection;
        let selection = self.graph.view_state().selection.clone();
        self.scene.apply_selection(&mut self.target, &selection);
        self.target.flush();
        self.sync_host();
        true
    }

    pub fn select_node(&mut self, hash: Option<&str>) -> Result<(), FlowError> {
        let selection = match hash {
            Some(h) if self.graph.node(h).is_none() => {
                tracing::warn!(node = h, "select_node: unknown node");
                return Err(FlowError::NodeNotFound(h.to_owned()));
            }
            Some(h) => Selection::Node(h.to_owned()),
            None if self.graph.view_state().selection.node().is_none() => return Ok(()),
            None => Selection::None,
        };
        if self.replace_selection(selection) {
            self.emit(FlowEvent::NodeSelected { node_hash: hash.map(str::to_owned) });
        }
        Ok(())
    }

    pub fn select_connection(&mut self, hash: Option<&str>) -> Result<(), FlowError> {
        let selection = match hash {
            Some(h) if self.graph.connection(h).is_none() => {
                tracing::warn!(connection = h, "select_connection: unknown connection");
                return Err(FlowError::ConnectionNotFound(h.to_owned()));
            }
            Some(h) => Selection::Connection(h.to_owned()),
            None if self.graph.view_state().selection.connection().is_none() => return Ok(()),
            None => Selection::None,
        };
        if self.replace_selection(selection) {
            self.emit(FlowEvent::ConnectionSelected { connection_hash: hash.map(str::to_owned) });
        }
        Ok(())
    }

    /// Selects the tether of a panel.
    pub fn select_tether(&mut self, panel_hash: Option<&str>) -> Result<(), FlowError> {
        let selection = match panel_hash {
            Some(h) if self.graph.panel(h).is_none() => {
                tracing::warn!(panel = h, "select_tether: unknown panel");
                return Err(FlowError::PanelNotFound(h.to_owned()));
            }
            Some(h) => Selection::Tether(h.to_owned()),
            None if self.graph.view_state().selection.tether().is_none() => return Ok(()),
            None => Selection::None,
        };
        if self.replace_selection(selection) {
            self.emit(FlowEvent::TetherSelected { panel_hash: panel_hash.map(str::to_owned) });
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        let previous = self.graph.view_state().selection.clone();
        if self.replace_selection(Selection::None) {
            match previous {
                Selection::Node(_) => self.emit(FlowEvent::NodeSelected { node_hash: None }),
                Selection::Connection(_) => self.emit(FlowEvent::ConnectionSelected { connection_hash: None }),
                Selection::Tether(_) => self.emit(FlowEvent::TetherSelected { panel_hash: None }),
                Selection::None => {}
            }
        }
    }

    /// Removes the selected node or connection. A selected tether is left
    /// alone; panels close through their own button. Returns whether
    /// anything was deleted.
    pub fn delete_selected(&mut self) -> Result<bool, FlowError> {
        match self.graph.view_state().selection.clone() {
            Selection::Node(hash) => self.remove_node(&hash).map(|_| true),
            Selection::Connection(hash) => self.remove_connection(&hash).map(|_| true),
            Selection::Tether(_) | Selection::None => Ok(false),
        }
    }
}
