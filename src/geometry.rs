//! Geometry primitives shared by connections, tethers and the scene.
//!
//! Everything here is a pure function over model-space coordinates.

use serde::{Deserialize, Serialize};

/// Edge of a node or panel a port or tether anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

impl Side {
    /// True for `Left` and `Right`.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// Name used for scene attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

/// A point (or vector) in model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        self.sub(other).length()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn normalized(self) -> Option<Point> {
        let len = self.length();
        if len < f32::EPSILON {
            None
        } else {
            Some(self.scale(1.0 / len))
        }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Axis-aligned rectangle; nodes and panels both expose one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// A connection or tether endpoint: position plus the side it leaves from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub point: Point,
    pub side: Side,
}

impl Anchor {
    pub fn new(x: f32, y: f32, side: Side) -> Self {
        Self { point: Point::new(x, y), side }
    }
}

/// Unit outward vector for a side.
pub fn side_direction(side: Side) -> Point {
    match side {
        Side::Left => Point::new(-1.0, 0.0),
        Side::Right => Point::new(1.0, 0.0),
        Side::Top => Point::new(0.0, -1.0),
        Side::Bottom => Point::new(0.0, 1.0),
    }
}

/// Midpoint of the requested edge of `rect`.
pub fn edge_center(rect: &Rect, side: Side) -> Point {
    match side {
        Side::Left => Point::new(rect.x, rect.y + rect.height * 0.5),
        Side::Right => Point::new(rect.right(), rect.y + rect.height * 0.5),
        Side::Top => Point::new(rect.x + rect.width * 0.5, rect.y),
        Side::Bottom => Point::new(rect.x + rect.width * 0.5, rect.bottom()),
    }
}

/// Position of the `index`-th of `count_on_side` ports on `side`, relative to
/// the node's top-left corner.
///
/// Left/right ports are spread over the body below the title bar; top/bottom
/// ports are spread over the full width.
pub fn port_local_position(
    side: Side,
    index: usize,
    count_on_side: usize,
    width: f32,
    height: f32,
    title_bar_height: f32,
) -> Point {
    let count = count_on_side.max(1) as f32;
    let slot = (index as f32 + 1.0) / (count + 1.0);
    match side {
        Side::Left | Side::Right => {
            let band = title_bar_height.clamp(0.0, height);
            let y = band + (height - band) * slot;
            let x = if side == Side::Left { 0.0 } else { width };
            Point::new(x, y)
        }
        Side::Top => Point::new(width * slot, 0.0),
        Side::Bottom => Point::new(width * slot, height),
    }
}
