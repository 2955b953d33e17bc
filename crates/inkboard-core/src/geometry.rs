//! Geometry kernel: distances, hollow-shape tests and bounding boxes.
//!
//! All inputs are in world coordinates. Tolerances are world units; callers
//! derive them from a screen-space radius with [`crate::Camera::tolerance`].

use kurbo::{Point, Rect, Vec2};

/// Distance from `point` to the segment `a`-`b`.
///
/// The projection is clamped to the segment. A degenerate segment (`a == b`)
/// falls back to the distance between `point` and `a`.
pub fn distance_point_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from `point` to a polyline.
///
/// A single point is treated as a degenerate segment. An empty polyline is
/// infinitely far away.
pub fn distance_point_to_polyline(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| distance_point_to_segment(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Whether `point` lies on the outline of `rect` within `tolerance`.
///
/// The interior (the rect shrunk by `tolerance`) does not count.
pub fn hits_rect_outline(rect: Rect, point: Point, tolerance: f64) -> bool {
    let rect = rect.abs();
    let outer = rect.inflate(tolerance, tolerance);
    let inner = rect.inflate(-tolerance, -tolerance);
    // A rect thinner than 2 * tolerance has no interior left.
    let inner_empty = inner.width() <= 0.0 || inner.height() <= 0.0;
    outer.contains(point) && (inner_empty || !inner.contains(point))
}

/// Whether `point` lies on a circle's ring within `tolerance`.
pub fn hits_ring(center: Point, radius: f64, point: Point, tolerance: f64) -> bool {
    (point.distance(center) - radius).abs() <= tolerance
}

/// Smallest rectangle containing every point, or `None` for an empty set.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    let mut rect = Rect::from_points(*first, *first);
    for p in rest {
        rect = rect.union_pt(*p);
    }
    Some(rect)
}

/// Union of a sequence of rectangles, or `None` when there are none.
pub fn union_bounds<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// Unit direction from `from` to `to`, or `None` when they coincide.
pub fn direction(from: Point, to: Point) -> Option<Vec2> {
    let d = to - from;
    let len = d.hypot();
    if len < f64::EPSILON { None } else { Some(d / len) }
}
