//! Orthogonal connector routing.
//!
//! Pure geometry: given two anchor points tagged with the side of the box
//! they protrude from, produce an axis-aligned polyline and render it with
//! rounded corners. Anchors are extended outward along their side normals
//! first, so paths always leave and enter perpendicular to the box edge.

use crate::entities::Side;
use kurbo::{BezPath, Point, Vec2};

/// World-unit offset each anchor is extended outward before routing.
/// Aesthetic, not load-bearing.
pub const ROUTE_OFFSET: f64 = 40.0;
/// Preferred corner radius for rounded bends.
pub const CORNER_RADIUS: f64 = 32.0;
/// Fallback radius when segments are too short for the preferred one.
pub const SMALL_CORNER_RADIUS: f64 = 8.0;
/// Points closer than this to their predecessor are dropped.
pub const POINT_EPSILON: f64 = 0.5;
/// Manhattan distances under this collapse to a simple 3-point path.
pub const SHORT_ROUTE_CUTOFF: f64 = ROUTE_OFFSET;

/// An anchor point with the side of its owning box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub position: Point,
    pub side: Side,
}

impl AnchorPoint {
    pub fn new(position: Point, side: Side) -> Self {
        Self { position, side }
    }

    /// The anchor extended outward along its side's normal.
    fn extended(&self, offset: f64) -> Point {
        let (nx, ny) = self.side.normal();
        Point::new(self.position.x + nx * offset, self.position.y + ny * offset)
    }
}

/// Route an orthogonal polyline between two anchors.
///
/// The result starts at `from.position`, ends at `to.position`, contains
/// only horizontal and vertical segments, no zero-length segments, and no
/// colinear interior points. Identical anchors yield a duplicated point
/// rather than an empty path.
pub fn route(from: AnchorPoint, to: AnchorPoint) -> Vec<Point> {
    let manhattan = (to.position.x - from.position.x).abs()
        + (to.position.y - from.position.y).abs();
    if manhattan < SHORT_ROUTE_CUTOFF {
        return simplify(&short_route(from, to));
    }

    let f = from.extended(ROUTE_OFFSET);
    let t = to.extended(ROUTE_OFFSET);

    let mut points = vec![from.position, f];
    match (from.side.is_horizontal(), to.side.is_horizontal()) {
        // Perpendicular sides: one bend through the shared corner.
        (true, false) => points.push(Point::new(t.x, f.y)),
        (false, true) => points.push(Point::new(f.x, t.y)),
        // Same axis: two bends, outward (U) or through the midpoint (Z).
        (true, true) => {
            let x = if from.side == to.side {
                // Same direction: swing around the farther extension so the
                // path never cuts back through either box.
                if from.side == Side::Right { f.x.max(t.x) } else { f.x.min(t.x) }
            } else {
                (f.x + t.x) / 2.0
            };
            points.push(Point::new(x, f.y));
            points.push(Point::new(x, t.y));
        }
        (false, false) => {
            let y = if from.side == to.side {
                if from.side == Side::Bottom { f.y.max(t.y) } else { f.y.min(t.y) }
            } else {
                (f.y + t.y) / 2.0
            };
            points.push(Point::new(f.x, y));
            points.push(Point::new(t.x, y));
        }
    }
    points.push(t);
    points.push(to.position);

    simplify(&points)
}

/// Collapsed 3-point path for visually cramped short routes.
fn short_route(from: AnchorPoint, to: AnchorPoint) -> Vec<Point> {
    if from.position == to.position {
        // Zero-length route: duplicate the point so curve generators
        // always see two points.
        return vec![from.position, to.position];
    }
    let corner = if from.side.is_horizontal() {
        Point::new(to.position.x, from.position.y)
    } else {
        Point::new(from.position.x, to.position.y)
    };
    vec![from.position, corner, to.position]
}

/// Drop interior points that are colinear with their neighbors, and points
/// closer than [`POINT_EPSILON`] to their predecessor.
pub fn simplify(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        match out.last() {
            Some(&last) if (p - last).hypot() < POINT_EPSILON => continue,
            _ => out.push(p),
        }
    }

    let mut i = 1;
    while i + 1 < out.len() {
        let a = out[i - 1];
        let b = out[i];
        let c = out[i + 1];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross.abs() < 1e-6 {
            out.remove(i);
        } else {
            i += 1;
        }
    }

    if out.len() < 2 {
        let p = out.first().copied().unwrap_or(Point::ZERO);
        out = vec![p, p];
    }
    out
}

/// Render a polyline as straight segments joined by rounded corners.
///
/// At each interior vertex the corner is rounded with [`CORNER_RADIUS`] when
/// both adjacent segments allow it, [`SMALL_CORNER_RADIUS`] when only that
/// fits, and left sharp otherwise. The radius never exceeds half of either
/// adjacent segment, so control geometry cannot self-intersect.
pub fn rounded_path(points: &[Point], radius: f64) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = points.first() else {
        return path;
    };
    path.move_to(first);
    if points.len() < 2 {
        path.line_to(first);
        return path;
    }

    for i in 1..points.len() - 1 {
        let prev = points[i - 1];
        let v = points[i];
        let next = points[i + 1];
        let len_in = (v - prev).hypot();
        let len_out = (next - v).hypot();

        let r = corner_radius(radius, len_in, len_out);
        if r <= 0.0 || len_in < f64::EPSILON || len_out < f64::EPSILON {
            path.line_to(v);
            continue;
        }

        let dir_in = (v - prev) / len_in;
        let dir_out = (next - v) / len_out;
        let curve_start = v - dir_in * r;
        let curve_end = v + dir_out * r;
        path.line_to(curve_start);
        path.quad_to(v, curve_end);
    }

    path.line_to(points[points.len() - 1]);
    path
}

/// Pick the largest radius that fits both adjacent segments.
fn corner_radius(preferred: f64, len_in: f64, len_out: f64) -> f64 {
    if len_in > preferred * 2.0 && len_out > preferred * 2.0 {
        preferred
    } else if len_in > SMALL_CORNER_RADIUS * 2.0 && len_out > SMALL_CORNER_RADIUS * 2.0 {
        SMALL_CORNER_RADIUS
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthogonal(points: &[Point]) {
        for w in points.windows(2) {
            let dx = (w[1].x - w[0].x).abs();
            let dy = (w[1].y - w[0].y).abs();
            assert!(
                dx < 1e-9 || dy < 1e-9,
                "diagonal segment {:?} -> {:?}",
                w[0],
                w[1]
            );
        }
    }

    fn assert_clean(points: &[Point]) {
        for w in points.windows(2) {
            assert!((w[1] - w[0]).hypot() >= POINT_EPSILON, "short segment");
        }
        for w in points.windows(3) {
            let cross = (w[1].x - w[0].x) * (w[2].y - w[1].y)
                - (w[1].y - w[0].y) * (w[2].x - w[1].x);
            assert!(cross.abs() > 1e-9, "colinear interior point");
        }
    }

    #[test]
    fn perpendicular_sides_make_an_l() {
        let from = AnchorPoint::new(Point::new(0.0, 0.0), Side::Right);
        let to = AnchorPoint::new(Point::new(300.0, 200.0), Side::Top);
        let pts = route(from, to);

        assert_eq!(*pts.first().unwrap(), from.position);
        assert_eq!(*pts.last().unwrap(), to.position);
        assert_orthogonal(&pts);
        assert_clean(&pts);
        // One bend: the corner at (to.x, from.y).
        assert!(pts.contains(&Point::new(300.0, 0.0)));
    }

    #[test]
    fn opposite_sides_make_a_z() {
        let from = AnchorPoint::new(Point::new(0.0, 0.0), Side::Right);
        let to = AnchorPoint::new(Point::new(400.0, 300.0), Side::Left);
        let pts = route(from, to);

        assert_orthogonal(&pts);
        assert_clean(&pts);
        // Crossbar at the midpoint of the extended coordinates.
        let mid_x = (0.0 + ROUTE_OFFSET + 400.0 - ROUTE_OFFSET) / 2.0;
        assert!(pts.iter().any(|p| (p.x - mid_x).abs() < 1e-9));
    }

    #[test]
    fn same_side_routes_around_the_farther_box() {
        let from = AnchorPoint::new(Point::new(100.0, 0.0), Side::Right);
        let to = AnchorPoint::new(Point::new(300.0, 200.0), Side::Right);
        let pts = route(from, to);

        assert_orthogonal(&pts);
        assert_clean(&pts);
        // The swing happens beyond the farther extension.
        let outer = 300.0 + ROUTE_OFFSET;
        assert!(pts.iter().any(|p| (p.x - outer).abs() < 1e-9));
        // Never dips left of the nearer anchor's extension.
        assert!(pts.iter().all(|p| p.x >= 100.0 - 1e-9));
    }

    #[test]
    fn vertical_same_side() {
        let from = AnchorPoint::new(Point::new(0.0, 100.0), Side::Bottom);
        let to = AnchorPoint::new(Point::new(300.0, 250.0), Side::Bottom);
        let pts = route(from, to);
        assert_orthogonal(&pts);
        assert_clean(&pts);
        let outer = 250.0 + ROUTE_OFFSET;
        assert!(pts.iter().any(|p| (p.y - outer).abs() < 1e-9));
    }

    #[test]
    fn short_routes_collapse() {
        let from = AnchorPoint::new(Point::new(0.0, 0.0), Side::Right);
        let to = AnchorPoint::new(Point::new(20.0, 10.0), Side::Left);
        let pts = route(from, to);
        assert!(pts.len() <= 3, "expected collapsed path, got {pts:?}");
        assert_orthogonal(&pts);
    }

    #[test]
    fn identical_anchors_do_not_crash() {
        let p = Point::new(50.0, 50.0);
        let pts = route(
            AnchorPoint::new(p, Side::Right),
            AnchorPoint::new(p, Side::Left),
        );
        assert_eq!(pts.len(), 2);
        // Rounding a degenerate polyline must still produce a path.
        let path = rounded_path(&pts, CORNER_RADIUS);
        assert!(path.elements().len() >= 2);
    }

    #[test]
    fn simplify_drops_colinear_and_duplicate_points() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.1), // within epsilon of previous
            Point::new(20.0, 0.0),
            Point::new(20.0, 30.0),
        ];
        let out = simplify(&pts);
        assert_clean(&out);
        assert_eq!(*out.first().unwrap(), Point::new(0.0, 0.0));
        assert_eq!(*out.last().unwrap(), Point::new(20.0, 30.0));
    }

    #[test]
    fn corner_radius_never_exceeds_half_segment() {
        // Plenty of room: preferred radius.
        assert_eq!(corner_radius(CORNER_RADIUS, 100.0, 100.0), CORNER_RADIUS);
        // Tight: falls back to the small radius.
        assert_eq!(corner_radius(CORNER_RADIUS, 40.0, 100.0), SMALL_CORNER_RADIUS);
        // No room at all: sharp corner.
        assert_eq!(corner_radius(CORNER_RADIUS, 10.0, 100.0), 0.0);

        for (len_in, len_out) in [(100.0, 100.0), (40.0, 80.0), (17.0, 300.0)] {
            let r = corner_radius(CORNER_RADIUS, len_in, len_out);
            assert!(r <= len_in / 2.0 && r <= len_out / 2.0);
        }
    }

    #[test]
    fn rounded_path_starts_and_ends_exactly() {
        let from = AnchorPoint::new(Point::new(0.0, 0.0), Side::Right);
        let to = AnchorPoint::new(Point::new(400.0, 300.0), Side::Left);
        let pts = route(from, to);
        let path = rounded_path(&pts, CORNER_RADIUS);

        let elements = path.elements();
        match elements.first() {
            Some(kurbo::PathEl::MoveTo(p)) => assert_eq!(*p, from.position),
            other => panic!("expected MoveTo, got {other:?}"),
        }
        match elements.last() {
            Some(kurbo::PathEl::LineTo(p)) => assert_eq!(*p, to.position),
            other => panic!("expected LineTo, got {other:?}"),
        }
    }
}
