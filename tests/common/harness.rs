//! Test harness driving a complete editor through pointer and keyboard
//! events.
//!
//! The default scene holds a `start` node at (0, 0) and an `end` node at
//! (400, 0), both 140x60 with a 28px title bar, connected `out` -> `in`.
//! Pointer helpers take model coordinates and convert them with the
//! current view, so they keep working after pan and zoom.

#![allow(dead_code)]

use super::EventRecorder;
use slint_flow_editor::{
    ConnectionRenderer, EditorOptions, ElementId, FlowEditor, HeadlessRenderTarget, Key, KeyEvent,
    KeyFocus, NodeTypeSet, Point, PointerEvent,
};

/// Gap between two harness events; larger than the double-click threshold.
const EVENT_GAP_MS: u64 = 1000;

pub struct FlowTestHarness {
    pub editor: FlowEditor<HeadlessRenderTarget>,
    pub recorder: EventRecorder,
    pub start: String,
    pub end: String,
    pub conn: Option<String>,
    clock: u64,
}

impl FlowTestHarness {
    /// `start` and `end` nodes, connected.
    pub fn new() -> Self {
        let mut harness = Self::unconnected();
        let conn = harness
            .editor
            .add_connection(&harness.start, "out", &harness.end, "in", None)
            .unwrap();
        harness.conn = Some(conn);
        harness.recorder.clear();
        harness
    }

    /// `start` and `end` nodes without a connection.
    pub fn unconnected() -> Self {
        Self::with_options(EditorOptions::default())
    }

    pub fn with_options(options: EditorOptions) -> Self {
        let mut editor = FlowEditor::with_options(
            HeadlessRenderTarget::new(1024.0, 768.0),
            NodeTypeSet::with_builtin_types(),
            options,
        )
        .unwrap();
        let start = editor.add_node("start", 0.0, 0.0, None, None);
        let end = editor.add_node("end", 400.0, 0.0, None, None);
        let recorder = EventRecorder::new();
        recorder.attach(&mut editor);
        Self { editor, recorder, start, end, conn: None, clock: 0 }
    }

    pub fn conn(&self) -> &str {
        self.conn.as_deref().unwrap()
    }

    fn tick(&mut self, gap: u64) -> u64 {
        self.clock += gap;
        self.clock
    }

    fn event_at(&mut self, x: f32, y: f32, gap: u64) -> PointerEvent {
        let screen = self.editor.model_to_screen(x, y);
        let t = self.tick(gap);
        PointerEvent::new(screen.x, screen.y, t)
    }

    // === Pointer, model coordinates ===

    pub fn press(&mut self, x: f32, y: f32) {
        let event = self.event_at(x, y, EVENT_GAP_MS);
        self.editor.pointer_down(event);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let event = self.event_at(x, y, 16);
        self.editor.pointer_move(event);
    }

    pub fn release(&mut self, x: f32, y: f32) {
        let event = self.event_at(x, y, 16);
        self.editor.pointer_up(event);
    }

    pub fn click(&mut self, x: f32, y: f32) {
        self.press(x, y);
        self.release(x, y);
    }

    /// Press `gap_ms` after the previous event, for double-click timing.
    pub fn press_after(&mut self, x: f32, y: f32, gap_ms: u64) {
        let event = self.event_at(x, y, gap_ms);
        self.editor.pointer_down(event);
    }

    /// Two clicks 100ms apart.
    pub fn double_click(&mut self, x: f32, y: f32) {
        self.click(x, y);
        self.press_after(x, y, 100);
        self.release(x, y);
    }

    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.press(from.0, from.1);
        let mid = ((from.0 + to.0) * 0.5, (from.1 + to.1) * 0.5);
        self.move_to(mid.0, mid.1);
        self.move_to(to.0, to.1);
        self.release(to.0, to.1);
    }

    // === Pointer, screen coordinates ===

    pub fn press_screen(&mut self, x: f32, y: f32) {
        let t = self.tick(EVENT_GAP_MS);
        self.editor.pointer_down(PointerEvent::new(x, y, t));
    }

    pub fn move_screen(&mut self, x: f32, y: f32) {
        let t = self.tick(16);
        self.editor.pointer_move(PointerEvent::new(x, y, t));
    }

    pub fn release_screen(&mut self, x: f32, y: f32) {
        let t = self.tick(16);
        self.editor.pointer_up(PointerEvent::new(x, y, t));
    }

    /// Click reported by the host on a known element.
    pub fn click_element(&mut self, element: ElementId) {
        let t = self.tick(EVENT_GAP_MS);
        self.editor.pointer_down(PointerEvent::new(0.0, 0.0, t).with_target(element));
        let t = self.tick(16);
        self.editor.pointer_up(PointerEvent::new(0.0, 0.0, t).with_target(element));
    }

    // === Keyboard ===

    pub fn key(&mut self, key: Key) -> bool {
        self.editor.key_down(KeyEvent::new(key))
    }

    pub fn key_in(&mut self, key: Key, focus: KeyFocus) -> bool {
        self.editor.key_down(KeyEvent::new(key).with_focus(focus))
    }

    // === Geometry ===

    /// A point inside the body of a node, below the title bar.
    pub fn node_body(&self, hash: &str) -> (f32, f32) {
        let node = self.editor.graph().node(hash).unwrap();
        (node.x + node.width * 0.5, node.y + 40.0)
    }

    pub fn port(&self, node_hash: &str, port_hash: &str) -> (f32, f32) {
        let node = self.editor.graph().node(node_hash).unwrap();
        let anchor = ConnectionRenderer::from_options(self.editor.options())
            .port_anchor(node, port_hash)
            .unwrap();
        (anchor.point.x, anchor.point.y)
    }

    pub fn node_position(&self, hash: &str) -> Point {
        let node = self.editor.graph().node(hash).unwrap();
        Point::new(node.x, node.y)
    }
}
