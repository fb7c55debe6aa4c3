//! Line mode and drag-handle state shared by connections and tethers.
//!
//! A curve is described by its two anchors plus a [`CurveHandles`] record.
//! Unset handle coordinates mean "auto": the bezier midpoint at t=0.5 and
//! the orthogonal corridor corners. Dragging a handle stores concrete
//! coordinates and marks the curve customized until it is reset.

use crate::geometry::{Anchor, Point};
use crate::model::{CurveHandles, LineMode};
use crate::path::{
    bezier_midpoint, bezier_path, orthogonal_corners, orthogonal_mid_offset, orthogonal_path,
    split_bezier_path, stand_off_points,
};

/// Which drag handle of a curve is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    BezierMidpoint,
    OrthoCorner1,
    OrthoCorner2,
    /// Dragging the midpoint shifts the whole corridor.
    OrthoMidpoint,
}

impl HandleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HandleKind::BezierMidpoint => "bezier-midpoint",
            HandleKind::OrthoCorner1 => "ortho-corner1",
            HandleKind::OrthoCorner2 => "ortho-corner2",
            HandleKind::OrthoMidpoint => "ortho-midpoint",
        }
    }

    pub fn parse(s: &str) -> Option<HandleKind> {
        match s {
            "bezier-midpoint" => Some(HandleKind::BezierMidpoint),
            "ortho-corner1" => Some(HandleKind::OrthoCorner1),
            "ortho-corner2" => Some(HandleKind::OrthoCorner2),
            "ortho-midpoint" => Some(HandleKind::OrthoMidpoint),
            _ => None,
        }
    }
}

/// The two anchors of a curve and its stand-off distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveEnds {
    pub from: Anchor,
    pub to: Anchor,
    pub standoff: f32,
}

impl CurveEnds {
    pub fn new(from: Anchor, to: Anchor, standoff: f32) -> Self {
        Self { from, to, standoff }
    }

    fn auto_corners(&self, mid_offset: f32) -> (Point, Point) {
        let (departure, approach) = stand_off_points(&self.from, &self.to, self.standoff);
        orthogonal_corners(departure, self.from.side, approach, self.to.side, mid_offset)
    }
}

fn pair(x: Option<f32>, y: Option<f32>) -> Option<Point> {
    Some(Point::new(x?, y?))
}

impl CurveHandles {
    /// Back to auto handles, keeping the line mode.
    pub fn reset(&mut self) {
        *self = CurveHandles::with_mode(self.line_mode);
    }

    /// Flips bezier/orthogonal and resets the handles.
    pub fn toggle_line_mode(&mut self) -> LineMode {
        *self = CurveHandles::with_mode(self.line_mode.toggled());
        self.line_mode
    }

    /// Sets the line mode. Handles are reset even if the mode is unchanged.
    pub fn set_line_mode(&mut self, mode: LineMode) {
        *self = CurveHandles::with_mode(mode);
    }

    fn custom_bezier_handle(&self) -> Option<Point> {
        if !self.handle_customized {
            return None;
        }
        pair(self.bezier_handle_x, self.bezier_handle_y)
    }

    /// Effective corners of the orthogonal corridor.
    pub fn corners(&self, ends: &CurveEnds) -> (Point, Point) {
        let auto = ends.auto_corners(if self.handle_customized {
            self.ortho_mid_offset.unwrap_or(0.0)
        } else {
            0.0
        });
        if !self.handle_customized {
            return auto;
        }
        (
            pair(self.ortho_corner1_x, self.ortho_corner1_y).unwrap_or(auto.0),
            pair(self.ortho_corner2_x, self.ortho_corner2_y).unwrap_or(auto.1),
        )
    }

    /// SVG path for the current mode and handles.
    pub fn path(&self, ends: &CurveEnds) -> String {
        match self.line_mode {
            LineMode::Bezier => match self.custom_bezier_handle() {
                Some(handle) => split_bezier_path(&ends.from, &ends.to, handle, ends.standoff),
                None => bezier_path(&ends.from, &ends.to, ends.standoff),
            },
            LineMode::Orthogonal => orthogonal_path(&ends.from, &ends.to, self.corners(ends), ends.standoff),
        }
    }

    /// Positions of the draggable handles for the current mode.
    pub fn handle_positions(&self, ends: &CurveEnds) -> Vec<(HandleKind, Point)> {
        match self.line_mode {
            LineMode::Bezier => {
                let p = self
                    .custom_bezier_handle()
                    .unwrap_or_else(|| bezier_midpoint(&ends.from, &ends.to, ends.standoff));
                vec![(HandleKind::BezierMidpoint, p)]
            }
            LineMode::Orthogonal => {
                let (c1, c2) = self.corners(ends);
                vec![
                    (HandleKind::OrthoCorner1, c1),
                    (HandleKind::OrthoCorner2, c2),
                    (HandleKind::OrthoMidpoint, c1.midpoint(c2)),
                ]
            }
        }
    }

    /// Moves one handle to `p` and marks the curve customized.
    ///
    /// Corner drags pin both corners so the untouched one stays where it was
    /// drawn. A midpoint drag is stored as a corridor offset plus the
    /// recomputed corners.
    pub fn move_handle(&mut self, kind: HandleKind, p: Point, ends: &CurveEnds) {
        match kind {
            HandleKind::BezierMidpoint => {
                self.bezier_handle_x = Some(p.x);
                self.bezier_handle_y = Some(p.y);
            }
            HandleKind::OrthoCorner1 | HandleKind::OrthoCorner2 => {
                let (c1, c2) = self.corners(ends);
                let (c1, c2) = if kind == HandleKind::OrthoCorner1 { (p, c2) } else { (c1, p) };
                self.ortho_corner1_x = Some(c1.x);
                self.ortho_corner1_y = Some(c1.y);
                self.ortho_corner2_x = Some(c2.x);
                self.ortho_corner2_y = Some(c2.y);
            }
            HandleKind::OrthoMidpoint => {
                let (departure, approach) = stand_off_points(&ends.from, &ends.to, ends.standoff);
                let offset = orthogonal_mid_offset(departure, ends.from.side, approach, ends.to.side, p);
                let (c1, c2) = ends.auto_corners(offset);
                self.ortho_mid_offset = Some(offset);
                self.ortho_corner1_x = Some(c1.x);
                self.ortho_corner1_y = Some(c1.y);
                self.ortho_corner2_x = Some(c2.x);
                self.ortho_corner2_y = Some(c2.y);
            }
        }
        self.handle_customized = true;
    }
}
