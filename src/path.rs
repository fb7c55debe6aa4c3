//! Path generation for connections, tethers and the provisional drag line.
//!
//! Every path starts with a short straight stand-off leaving the start anchor
//! in its side direction and ends with one entering the end anchor, so curves
//! never start tangent to the node border. Between the stand-offs the path is
//! either a cubic bezier (optionally split at a user-dragged handle) or an
//! orthogonal polyline.
//!
//! Output is SVG path syntax (e.g. `"M 0 50 L 20 50 C 92 50 108 50 180 50 L 200 50"`).

use crate::geometry::{side_direction, Anchor, Point, Side};

/// Default distance of the straight stand-off segments.
pub const DEFAULT_STANDOFF: f32 = 20.0;
/// Lower bound for the bezier control point distance.
pub const MIN_CURVE_OFFSET: f32 = 30.0;
/// Upper bound for the bezier control point distance.
pub const MAX_CURVE_OFFSET: f32 = 180.0;
/// Minimum control point distance for same-axis anchors that do not face
/// each other; pushes the loop clear of both nodes.
pub const NON_FACING_MIN_OFFSET: f32 = 100.0;

/// Anchors closer than this are joined with a straight line.
const DEGENERATE_DISTANCE: f32 = 1.0;
const POINT_EPSILON: f32 = 0.01;

/// Cubic bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBezier {
    /// Evaluate the curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> Point {
        evaluate_cubic_bezier(self.p0, self.p1, self.p2, self.p3, t)
    }
}

/// Bernstein-form evaluation of a cubic bezier.
pub fn evaluate_cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    let x = mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x;
    let y = mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y;
    Point::new(x, y)
}

/// Departure and approach points, `standoff` outward from each anchor.
pub fn stand_off_points(from: &Anchor, to: &Anchor, standoff: f32) -> (Point, Point) {
    let departure = from.point.add(side_direction(from.side).scale(standoff));
    let approach = to.point.add(side_direction(to.side).scale(standoff));
    (departure, approach)
}

/// Whether two same-axis anchors point at each other across the gap.
fn facing(from_side: Side, departure: Point, to_side: Side, approach: Point) -> bool {
    let dir_a = side_direction(from_side);
    let dir_b = side_direction(to_side);
    dir_a.dot(dir_b) < 0.0 && dir_a.dot(approach.sub(departure)) > 0.0
}

/// Control point distance for the direct bezier between two stand-off points.
///
/// Facing pairs get a span-proportional offset (tight S-curve); same-axis
/// pairs that do not face each other get at least [`NON_FACING_MIN_OFFSET`]
/// (wide loop); perpendicular pairs use the clamped span offset.
pub fn curve_offset(from_side: Side, departure: Point, to_side: Side, approach: Point) -> f32 {
    let base = (departure.distance(approach) * 0.4).clamp(MIN_CURVE_OFFSET, MAX_CURVE_OFFSET);
    if from_side.is_horizontal() != to_side.is_horizontal() {
        return base;
    }
    if facing(from_side, departure, to_side, approach) {
        let delta = approach.sub(departure);
        let along = if from_side.is_horizontal() { delta.x.abs() } else { delta.y.abs() };
        (along * 0.5).clamp(MIN_CURVE_OFFSET, MAX_CURVE_OFFSET)
    } else {
        base.max(NON_FACING_MIN_OFFSET)
    }
}

/// The auto-computed bezier between the two stand-off points.
pub fn direct_bezier(from: &Anchor, to: &Anchor, standoff: f32) -> CubicBezier {
    let (departure, approach) = stand_off_points(from, to, standoff);
    let offset = curve_offset(from.side, departure, to.side, approach);
    CubicBezier {
        p0: departure,
        p1: departure.add(side_direction(from.side).scale(offset)),
        p2: approach.add(side_direction(to.side).scale(offset)),
        p3: approach,
    }
}

/// Default (non-customized) midpoint handle position of a bezier path.
pub fn bezier_midpoint(from: &Anchor, to: &Anchor, standoff: f32) -> Point {
    direct_bezier(from, to, standoff).eval(0.5)
}

/// Two cubics meeting at `handle` with a shared tangent there.
///
/// The tangent at the handle follows the straight departure→approach
/// direction and has the same magnitude on both sides, so the joined curve
/// stays C¹-continuous through the handle.
pub fn split_bezier(
    from: &Anchor,
    to: &Anchor,
    handle: Point,
    standoff: f32,
) -> (CubicBezier, CubicBezier) {
    let (departure, approach) = stand_off_points(from, to, standoff);
    let tangent = approach
        .sub(departure)
        .normalized()
        .unwrap_or_else(|| side_direction(from.side));

    let len1 = departure.distance(handle);
    let len2 = handle.distance(approach);
    let k = len1.min(len2) * 0.4;
    let out1 = (len1 * 0.5).clamp(MIN_CURVE_OFFSET, MAX_CURVE_OFFSET);
    let out2 = (len2 * 0.5).clamp(MIN_CURVE_OFFSET, MAX_CURVE_OFFSET);

    let first = CubicBezier {
        p0: departure,
        p1: departure.add(side_direction(from.side).scale(out1)),
        p2: handle.sub(tangent.scale(k)),
        p3: handle,
    };
    let second = CubicBezier {
        p0: handle,
        p1: handle.add(tangent.scale(k)),
        p2: approach.add(side_direction(to.side).scale(out2)),
        p3: approach,
    };
    (first, second)
}

fn fmt_point(p: Point) -> String {
    format!("{} {}", p.x, p.y)
}

fn straight_path(from: &Anchor, to: &Anchor) -> Option<String> {
    if from.point.distance(to.point) < DEGENERATE_DISTANCE {
        Some(format!("M {} L {}", fmt_point(from.point), fmt_point(to.point)))
    } else {
        None
    }
}

/// Stand-off → cubic → stand-off path using auto control points.
pub fn bezier_path(from: &Anchor, to: &Anchor, standoff: f32) -> String {
    if let Some(line) = straight_path(from, to) {
        return line;
    }
    let c = direct_bezier(from, to, standoff);
    format!(
        "M {} L {} C {} {} {} L {}",
        fmt_point(from.point),
        fmt_point(c.p0),
        fmt_point(c.p1),
        fmt_point(c.p2),
        fmt_point(c.p3),
        fmt_point(to.point)
    )
}

/// Stand-off → two cubics through `handle` → stand-off.
pub fn split_bezier_path(from: &Anchor, to: &Anchor, handle: Point, standoff: f32) -> String {
    if let Some(line) = straight_path(from, to) {
        return line;
    }
    let (a, b) = split_bezier(from, to, handle, standoff);
    format!(
        "M {} L {} C {} {} {} C {} {} {} L {}",
        fmt_point(from.point),
        fmt_point(a.p0),
        fmt_point(a.p1),
        fmt_point(a.p2),
        fmt_point(a.p3),
        fmt_point(b.p1),
        fmt_point(b.p2),
        fmt_point(b.p3),
        fmt_point(to.point)
    )
}

/// Corner points of the orthogonal corridor between two stand-off points.
///
/// Both horizontal: a vertical corridor at the mid x (Z shape). Both
/// vertical: a horizontal corridor at the mid y. `mid_offset` shifts the
/// corridor perpendicular to its axis. Mixed directions produce a single
/// bend, so both corners coincide and `mid_offset` is ignored.
pub fn orthogonal_corners(
    departure: Point,
    from_side: Side,
    approach: Point,
    to_side: Side,
    mid_offset: f32,
) -> (Point, Point) {
    match (from_side.is_horizontal(), to_side.is_horizontal()) {
        (true, true) => {
            let mid_x = (departure.x + approach.x) * 0.5 + mid_offset;
            (Point::new(mid_x, departure.y), Point::new(mid_x, approach.y))
        }
        (false, false) => {
            let mid_y = (departure.y + approach.y) * 0.5 + mid_offset;
            (Point::new(departure.x, mid_y), Point::new(approach.x, mid_y))
        }
        (true, false) => {
            let corner = Point::new(approach.x, departure.y);
            (corner, corner)
        }
        (false, true) => {
            let corner = Point::new(departure.x, approach.y);
            (corner, corner)
        }
    }
}

/// Converts a dragged orthogonal midpoint into a corridor offset.
pub fn orthogonal_mid_offset(
    departure: Point,
    from_side: Side,
    approach: Point,
    to_side: Side,
    handle: Point,
) -> f32 {
    match (from_side.is_horizontal(), to_side.is_horizontal()) {
        (true, true) => handle.x - (departure.x + approach.x) * 0.5,
        (false, false) => handle.y - (departure.y + approach.y) * 0.5,
        _ => 0.0,
    }
}

fn aligned(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < POINT_EPSILON || (a.y - b.y).abs() < POINT_EPSILON
}

/// Full orthogonal polyline: anchor, departure, corners, approach, anchor.
///
/// Corners that are not axis-aligned with their neighbours (a user dragged
/// one freely) get an extra elbow so every segment stays horizontal or
/// vertical. Coincident and collinear points are removed.
pub fn orthogonal_points(
    from: &Anchor,
    to: &Anchor,
    corners: (Point, Point),
    standoff: f32,
) -> Vec<Point> {
    let (departure, approach) = stand_off_points(from, to, standoff);
    let (c1, c2) = corners;

    let mut points = vec![from.point, departure];
    if !aligned(departure, c1) {
        points.push(if from.side.is_horizontal() {
            Point::new(c1.x, departure.y)
        } else {
            Point::new(departure.x, c1.y)
        });
    }
    points.push(c1);
    if !aligned(c1, c2) {
        points.push(Point::new(c1.x, c2.y));
    }
    points.push(c2);
    if !aligned(c2, approach) {
        points.push(if to.side.is_horizontal() {
            Point::new(c2.x, approach.y)
        } else {
            Point::new(approach.x, c2.y)
        });
    }
    points.push(approach);
    points.push(to.point);

    simplify_polyline(points)
}

fn simplify_polyline(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if let Some(last) = out.last() {
            if last.distance(p) < POINT_EPSILON {
                continue;
            }
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let same_x = (a.x - b.x).abs() < POINT_EPSILON && (b.x - p.x).abs() < POINT_EPSILON;
            let same_y = (a.y - b.y).abs() < POINT_EPSILON && (b.y - p.y).abs() < POINT_EPSILON;
            if same_x || same_y {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

/// `M x y L x y ...` for a polyline.
pub fn polyline_path(points: &[Point]) -> String {
    let mut commands = String::with_capacity(points.len() * 16);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            commands.push(' ');
        }
        commands.push_str(if i == 0 { "M " } else { "L " });
        commands.push_str(&fmt_point(*p));
    }
    commands
}

/// Orthogonal path through the given corners.
pub fn orthogonal_path(from: &Anchor, to: &Anchor, corners: (Point, Point), standoff: f32) -> String {
    polyline_path(&orthogonal_points(from, to, corners, standoff))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right(x: f32, y: f32) -> Anchor {
        Anchor::new(x, y, Side::Right)
    }

    fn left(x: f32, y: f32) -> Anchor {
        Anchor::new(x, y, Side::Left)
    }

    // ========================================================================
    // evaluate_cubic_bezier()
    // ========================================================================

    #[test]
    fn test_eval_endpoints() {
        let c = CubicBezier {
            p0: Point::new(10.0, 20.0),
            p1: Point::new(50.0, 20.0),
            p2: Point::new(60.0, 80.0),
            p3: Point::new(100.0, 80.0),
        };
        assert!(c.eval(0.0).distance(c.p0) < 1e-4);
        assert!(c.eval(1.0).distance(c.p3) < 1e-4);
    }

    #[test]
    fn test_eval_straight_line_midpoint() {
        let mid = evaluate_cubic_bezier(
            Point::new(0.0, 0.0),
            Point::new(33.333_332, 33.333_332),
            Point::new(66.666_664, 66.666_664),
            Point::new(100.0, 100.0),
            0.5,
        );
        assert!((mid.x - 50.0).abs() < 1e-3);
        assert!((mid.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_eval_degenerate_point() {
        let p = Point::new(50.0, 50.0);
        assert_eq!(evaluate_cubic_bezier(p, p, p, p, 0.3), p);
    }

    // ========================================================================
    // curve_offset() - facing / non-facing / perpendicular
    // ========================================================================

    #[test]
    fn test_facing_pair_gets_span_proportional_offset() {
        let offset = curve_offset(Side::Right, Point::new(0.0, 0.0), Side::Left, Point::new(200.0, 0.0));
        assert_eq!(offset, 100.0);
    }

    #[test]
    fn test_non_facing_same_axis_gets_wide_loop() {
        // Output facing right, target input on the far left of it
        let offset = curve_offset(Side::Right, Point::new(200.0, 0.0), Side::Left, Point::new(0.0, 0.0));
        assert!(offset >= NON_FACING_MIN_OFFSET);

        // Both pointing the same way
        let offset = curve_offset(Side::Right, Point::new(0.0, 0.0), Side::Right, Point::new(60.0, 0.0));
        assert!(offset >= NON_FACING_MIN_OFFSET);
    }

    #[test]
    fn test_facing_offset_smaller_than_non_facing() {
        let facing = curve_offset(Side::Right, Point::new(0.0, 0.0), Side::Left, Point::new(80.0, 0.0));
        let wide = curve_offset(Side::Right, Point::new(80.0, 0.0), Side::Left, Point::new(0.0, 0.0));
        assert!(facing < wide);
    }

    #[test]
    fn test_offset_is_clamped() {
        let small = curve_offset(Side::Right, Point::new(0.0, 0.0), Side::Top, Point::new(5.0, 5.0));
        let large = curve_offset(Side::Right, Point::new(0.0, 0.0), Side::Top, Point::new(5000.0, 5000.0));
        assert_eq!(small, MIN_CURVE_OFFSET);
        assert_eq!(large, MAX_CURVE_OFFSET);
    }

    // ========================================================================
    // bezier_path() / split_bezier_path()
    // ========================================================================

    #[test]
    fn test_bezier_path_format() {
        let path = bezier_path(&right(0.0, 50.0), &left(200.0, 50.0), 20.0);
        assert!(path.starts_with("M 0 50 L 20 50 C"));
        assert!(path.ends_with("L 200 50"));
    }

    #[test]
    fn test_bezier_control_points_follow_side_directions() {
        let c = direct_bezier(&right(0.0, 0.0), &left(300.0, 100.0), 20.0);
        assert!(c.p1.x > c.p0.x);
        assert_eq!(c.p1.y, c.p0.y);
        assert!(c.p2.x < c.p3.x);
        assert_eq!(c.p2.y, c.p3.y);
    }

    #[test]
    fn test_degenerate_anchors_use_straight_line() {
        let path = bezier_path(&right(50.0, 50.0), &left(50.0, 50.0), 20.0);
        assert_eq!(path, "M 50 50 L 50 50");
    }

    #[test]
    fn test_midpoint_of_symmetric_curve() {
        let mid = bezier_midpoint(&right(0.0, 0.0), &left(200.0, 0.0), 20.0);
        assert!((mid.x - 100.0).abs() < 1e-3);
        assert!(mid.y.abs() < 1e-3);
    }

    #[test]
    fn test_split_bezier_passes_through_handle() {
        let handle = Point::new(120.0, 90.0);
        let (a, b) = split_bezier(&right(0.0, 0.0), &left(300.0, 0.0), handle, 20.0);
        assert_eq!(a.p3, handle);
        assert_eq!(b.p0, handle);
    }

    #[test]
    fn test_split_bezier_is_c1_at_handle() {
        let handle = Point::new(120.0, 90.0);
        let (a, b) = split_bezier(&right(0.0, 0.0), &left(300.0, 40.0), handle, 20.0);
        let incoming = a.p3.sub(a.p2);
        let outgoing = b.p1.sub(b.p0);
        assert!((incoming.x - outgoing.x).abs() < 1e-4);
        assert!((incoming.y - outgoing.y).abs() < 1e-4);
    }

    #[test]
    fn test_split_path_has_two_cubics() {
        let path = split_bezier_path(&right(0.0, 0.0), &left(300.0, 0.0), Point::new(150.0, 60.0), 20.0);
        assert_eq!(path.matches(" C ").count(), 2);
    }

    // ========================================================================
    // orthogonal_corners() / orthogonal_points()
    // ========================================================================

    #[test]
    fn test_horizontal_corridor_corners() {
        let (c1, c2) = orthogonal_corners(
            Point::new(20.0, 0.0),
            Side::Right,
            Point::new(180.0, 100.0),
            Side::Left,
            0.0,
        );
        assert_eq!(c1, Point::new(100.0, 0.0));
        assert_eq!(c2, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_vertical_corridor_with_offset() {
        let (c1, c2) = orthogonal_corners(
            Point::new(0.0, 20.0),
            Side::Bottom,
            Point::new(100.0, 180.0),
            Side::Top,
            10.0,
        );
        assert_eq!(c1, Point::new(0.0, 110.0));
        assert_eq!(c2, Point::new(100.0, 110.0));
    }

    #[test]
    fn test_mixed_directions_collapse_to_single_bend() {
        let (c1, c2) = orthogonal_corners(
            Point::new(20.0, 0.0),
            Side::Right,
            Point::new(200.0, 180.0),
            Side::Top,
            25.0,
        );
        assert_eq!(c1, c2);
        assert_eq!(c1, Point::new(200.0, 0.0));
    }

    #[test]
    fn test_orthogonal_points_are_axis_aligned() {
        let from = right(0.0, 0.0);
        let to = left(200.0, 100.0);
        // A freely dragged corner that is not aligned with anything
        let points = orthogonal_points(&from, &to, (Point::new(70.0, 30.0), Point::new(130.0, 60.0)), 20.0);
        for pair in points.windows(2) {
            let horizontal = (pair[0].y - pair[1].y).abs() < 0.01;
            let vertical = (pair[0].x - pair[1].x).abs() < 0.01;
            assert!(horizontal || vertical, "segment {:?} is diagonal", pair);
        }
        assert_eq!(points.first(), Some(&from.point));
        assert_eq!(points.last(), Some(&to.point));
    }

    #[test]
    fn test_straight_orthogonal_collapses_to_line() {
        let from = right(0.0, 0.0);
        let to = left(200.0, 0.0);
        let (d, a) = stand_off_points(&from, &to, 20.0);
        let corners = orthogonal_corners(d, from.side, a, to.side, 0.0);
        let points = orthogonal_points(&from, &to, corners, 20.0);
        assert_eq!(points, vec![Point::new(0.0, 0.0), Point::new(200.0, 0.0)]);
    }

    #[test]
    fn test_mid_offset_round_trip() {
        let d = Point::new(20.0, 0.0);
        let a = Point::new(180.0, 100.0);
        let offset = orthogonal_mid_offset(d, Side::Right, a, Side::Left, Point::new(130.0, 50.0));
        assert_eq!(offset, 30.0);
        let (c1, _) = orthogonal_corners(d, Side::Right, a, Side::Left, offset);
        assert_eq!(c1.x, 130.0);
    }

    #[test]
    fn test_polyline_path_format() {
        let path = polyline_path(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 5.5)]);
        assert_eq!(path, "M 0 0 L 10 0 L 10 5.5");
    }
}
