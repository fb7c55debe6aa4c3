//! Pan, zoom and fullscreen.
//!
//! Model space maps to canvas space as `canvas = model * zoom + pan`; the
//! render target's [`ScreenTransform`] maps canvas space to screen space.
//! Viewport changes update [`ViewState`](crate::model::ViewState) and are
//! written to the host, but are not domain events.

use crate::editor::FlowEditor;
use crate::geometry::{Point, Rect};
use crate::layout::bounding_box;
use crate::render::{RenderTarget, ScreenTransform};
use euclid::point2;

/// Pan that keeps the canvas point `focus` fixed while zooming from
/// `zoom_old` to `zoom_new`.
pub fn zoom_about(pan: Point, zoom_old: f32, zoom_new: f32, focus: Point) -> Point {
    let ratio = zoom_new / zoom_old;
    focus.sub(focus.sub(pan).scale(ratio))
}

/// Pan and zoom that center `bounds` (plus `padding` on every side) in a
/// viewport, never zooming in past 1.
pub fn fit_view(bounds: Rect, padding: f32, viewport: (f32, f32), min_zoom: f32, max_zoom: f32) -> (Point, f32) {
    let (vw, vh) = viewport;
    let bw = (bounds.width + 2.0 * padding).max(1.0);
    let bh = (bounds.height + 2.0 * padding).max(1.0);
    let zoom = (vw / bw).min(vh / bh).min(1.0).clamp(min_zoom, max_zoom);
    let center = bounds.center();
    (Point::new(vw * 0.5 - center.x * zoom, vh * 0.5 - center.y * zoom), zoom)
}

/// Exact inverse of [`model_to_screen`]. `None` when the screen transform
/// is not invertible.
pub fn screen_to_model(transform: &ScreenTransform, pan: Point, zoom: f32, screen: Point) -> Option<Point> {
    let canvas = transform.inverse()?.transform_point(point2(screen.x, screen.y));
    Some(Point::new((canvas.x - pan.x) / zoom, (canvas.y - pan.y) / zoom))
}

pub fn model_to_screen(transform: &ScreenTransform, pan: Point, zoom: f32, model: Point) -> Point {
    let screen = transform.transform_point(point2(model.x * zoom + pan.x, model.y * zoom + pan.y));
    Point::new(screen.x, screen.y)
}

/// View state that is not part of the flow data.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    fullscreen: bool,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }
}

impl<R: RenderTarget> FlowEditor<R> {
    pub fn zoom(&self) -> f32 {
        self.graph.view_state().zoom
    }

    pub fn pan(&self) -> Point {
        let view = self.graph.view_state();
        Point::new(view.pan_x, view.pan_y)
    }

    pub(crate) fn apply_view(&mut self, pan: Point, zoom: f32) {
        let view = self.graph.view_state_mut();
        view.pan_x = pan.x;
        view.pan_y = pan.y;
        view.zoom = zoom;
        self.scene.apply_view(&mut self.target, pan.x, pan.y, zoom);
        self.target.flush();
    }

    /// [`apply_view`](Self::apply_view) followed by a host write.
    fn commit_view(&mut self, pan: Point, zoom: f32) {
        self.apply_view(pan, zoom);
        self.sync_host();
    }

    /// Sets the zoom, clamped to the configured bounds. With a `focus` in
    /// canvas coordinates, the model point under it stays in place.
    /// Returns the applied zoom.
    pub fn set_zoom(&mut self, zoom: f32, focus: Option<Point>) -> f32 {
        let old = self.zoom();
        let new = self.options.clamp_zoom(zoom);
        let pan = match focus {
            Some(focus) => zoom_about(self.pan(), old, new, focus),
            None => self.pan(),
        };
        self.commit_view(pan, new);
        new
    }

    pub fn set_pan(&mut self, pan_x: f32, pan_y: f32) {
        let zoom = self.zoom();
        self.commit_view(Point::new(pan_x, pan_y), zoom);
    }

    fn viewport_center(&self) -> Point {
        let (w, h) = self.target.viewport_size();
        Point::new(w * 0.5, h * 0.5)
    }

    pub fn zoom_in(&mut self) -> f32 {
        let focus = self.viewport_center();
        self.set_zoom(self.zoom() * self.options.zoom_step, Some(focus))
    }

    pub fn zoom_out(&mut self) -> f32 {
        let focus = self.viewport_center();
        self.set_zoom(self.zoom() / self.options.zoom_step, Some(focus))
    }

    /// Wheel zoom about the pointer. Negative `delta_y` zooms in.
    pub fn wheel(&mut self, delta_y: f32, screen_x: f32, screen_y: f32) -> f32 {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return self.zoom();
        }
        let factor = if delta_y < 0.0 { self.options.zoom_step } else { 1.0 / self.options.zoom_step };
        let focus = self.screen_to_canvas(screen_x, screen_y);
        self.set_zoom(self.zoom() * factor, focus)
    }

    /// Fits all nodes into the viewport. Returns false when there are none.
    pub fn zoom_to_fit(&mut self) -> bool {
        let hashes: Vec<String> = self.graph.nodes().map(|n| n.hash.clone()).collect();
        let Some(bounds) = bounding_box(&self.graph, &hashes) else {
            tracing::debug!("zoom_to_fit: no nodes");
            return false;
        };
        let (pan, zoom) = fit_view(
            bounds,
            self.options.fit_padding,
            self.target.viewport_size(),
            self.options.min_zoom,
            self.options.max_zoom,
        );
        self.commit_view(pan, zoom);
        true
    }

    pub fn reset_view(&mut self) {
        let zoom = self.options.clamp_zoom(1.0);
        self.commit_view(Point::new(0.0, 0.0), zoom);
    }

    pub fn is_fullscreen(&self) -> bool {
        self.viewport.is_fullscreen()
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if self.viewport.is_fullscreen() == fullscreen {
            return;
        }
        self.viewport.set_fullscreen(fullscreen);
        self.target.set_fullscreen(fullscreen);
        self.target.flush();
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        let fullscreen = !self.is_fullscreen();
        self.set_fullscreen(fullscreen);
        fullscreen
    }

    pub(crate) fn screen_to_canvas(&self, screen_x: f32, screen_y: f32) -> Option<Point> {
        let canvas = self
            .target
            .screen_transform()
            .inverse()?
            .transform_point(point2(screen_x, screen_y));
        Some(Point::new(canvas.x, canvas.y))
    }

    /// Screen position to model coordinates.
    pub fn screen_to_model(&self, screen_x: f32, screen_y: f32) -> Option<Point> {
        screen_to_model(&self.target.screen_transform(), self.pan(), self.zoom(), Point::new(screen_x, screen_y))
    }

    pub fn model_to_screen(&self, x: f32, y: f32) -> Point {
        model_to_screen(&self.target.screen_transform(), self.pan(), self.zoom(), Point::new(x, y))
    }
}
