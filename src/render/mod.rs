//! Render target abstraction.
//!
//! The editor never draws directly. It creates and patches a tree of
//! elements on a [`RenderTarget`] and reads them back for hit testing.
//! [`HeadlessRenderTarget`] keeps that tree in memory; [`ModelRenderTarget`]
//! additionally mirrors it into a Slint `VecModel` for a `.slint` scene.
//!
//! Coordinates: element geometry is in model space. The target maps model
//! space to canvas space with the view (pan/zoom) and canvas space to screen
//! space with [`RenderTarget::screen_transform`].

pub mod headless;
pub mod model;
pub mod scene;

pub use headless::HeadlessRenderTarget;
pub use model::{ElementRecord, ModelRenderTarget};
pub use scene::{SceneContext, SceneRenderer};

use euclid::Transform2D;

/// Unit marker for the canvas root, after pan and zoom are applied.
#[derive(Debug, Clone, Copy)]
pub struct CanvasSpace;

/// Unit marker for host screen (pointer event) coordinates.
#[derive(Debug, Clone, Copy)]
pub struct ScreenSpace;

/// Canvas-to-screen transform of a render target.
pub type ScreenTransform = Transform2D<f32, CanvasSpace, ScreenSpace>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Group,
    Rect,
    Circle,
    Path,
    Text,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Group => "g",
            ElementKind::Rect => "rect",
            ElementKind::Circle => "circle",
            ElementKind::Path => "path",
            ElementKind::Text => "text",
        }
    }
}

/// Attribute names the scene sets and hit testing reads.
pub mod attr {
    pub const ELEMENT_TYPE: &str = "data-element-type";
    pub const NODE_HASH: &str = "data-node-hash";
    pub const PORT_HASH: &str = "data-port-hash";
    pub const PORT_DIRECTION: &str = "data-port-direction";
    pub const CONNECTION_HASH: &str = "data-connection-hash";
    pub const PANEL_HASH: &str = "data-panel-hash";
    pub const HANDLE_TYPE: &str = "data-handle-type";
    pub const SELECTED: &str = "data-selected";
    pub const LINE_MODE: &str = "data-line-mode";
    pub const VISIBILITY: &str = "visibility";
    pub const POINTER_EVENTS: &str = "pointer-events";
    /// Extra pick distance around path strokes.
    pub const HIT_WIDTH: &str = "data-hit-width";
}

/// Pick tolerance around path strokes, in screen units, when a path sets
/// no [`attr::HIT_WIDTH`].
pub const DEFAULT_PATH_HIT_WIDTH: f32 = 6.0;

/// Values of [`attr::ELEMENT_TYPE`].
pub mod element_type {
    pub const NODE: &str = "node";
    pub const NODE_BODY: &str = "node-body";
    pub const NODE_TITLE: &str = "node-title";
    pub const PORT: &str = "port";
    pub const PANEL_INDICATOR: &str = "panel-indicator";
    pub const CONNECTION: &str = "connection";
    pub const CONNECTION_PATH: &str = "connection-path";
    pub const CONNECTION_HANDLE: &str = "connection-handle";
    pub const PANEL: &str = "panel";
    pub const PANEL_TITLEBAR: &str = "panel-titlebar";
    pub const PANEL_BODY: &str = "panel-body";
    pub const PANEL_CLOSE: &str = "panel-close";
    pub const TETHER: &str = "tether";
    pub const TETHER_PATH: &str = "tether-path";
    pub const TETHER_HANDLE: &str = "tether-handle";
    pub const DRAG_LINE: &str = "drag-line";
}

/// Scene backend consumed by the editor.
///
/// Operations on unknown elements are no-ops.
pub trait RenderTarget {
    fn create_element(&mut self, kind: ElementKind, parent: Option<ElementId>) -> ElementId;

    /// Removes the element and its whole subtree.
    fn remove_element(&mut self, id: ElementId);

    fn contains(&self, id: ElementId) -> bool;

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str);

    fn attribute(&self, id: ElementId, name: &str) -> Option<String>;

    fn parent(&self, id: ElementId) -> Option<ElementId>;

    /// Topmost pickable element under a screen position.
    fn element_at(&self, screen_x: f32, screen_y: f32) -> Option<ElementId>;

    fn screen_transform(&self) -> ScreenTransform;

    /// Canvas size in canvas units.
    fn viewport_size(&self) -> (f32, f32);

    fn set_view_transform(&mut self, pan_x: f32, pan_y: f32, zoom: f32);

    fn set_fullscreen(&mut self, fullscreen: bool);

    fn capture_pointer(&mut self);

    fn release_pointer(&mut self);

    /// Called after a batch of scene changes.
    fn flush(&mut self) {}
}
