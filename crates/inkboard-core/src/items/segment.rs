//! Straight segment, shared by lines and arrows.

use super::{ItemId, ItemStyle, ItemTrait};
use crate::geometry::{direction, distance_point_to_segment};
use kurbo::{BezPath, Point, Rect, Vec2};
use uuid::Uuid;

/// Length of an arrowhead's sides relative to the stroke width.
const HEAD_LENGTH_PER_WIDTH: f64 = 5.0;
/// Smallest arrowhead side, in world units.
const MIN_HEAD_LENGTH: f64 = 10.0;
/// Half-angle between the shaft and each side of the head.
const HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// A segment from `start` to `end`.
///
/// The same geometry backs both `LINE` and `ARROW`; the arrowhead is a
/// rendering detail and does not take part in hit-testing.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub(crate) id: ItemId,
    pub start: Point,
    pub end: Point,
    pub style: ItemStyle,
}

impl Segment {
    pub fn new(start: Point, end: Point, style: ItemStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style,
        }
    }

    pub(crate) fn reconstruct(id: ItemId, start: Point, end: Point, style: ItemStyle) -> Self {
        Self {
            id,
            start,
            end,
            style,
        }
    }

    /// Open path for the two sides of an arrowhead at `end`.
    ///
    /// Empty when the segment has no direction.
    pub fn arrow_head(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(dir) = direction(self.end, self.start) else {
            return path;
        };
        let len = (self.style.stroke_width * HEAD_LENGTH_PER_WIDTH).max(MIN_HEAD_LENGTH);
        let left = self.end + rotate(dir, HEAD_ANGLE) * len;
        let right = self.end + rotate(dir, -HEAD_ANGLE) * len;
        path.move_to(left);
        path.line_to(self.end);
        path.line_to(right);
        path
    }
}

fn rotate(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

impl ItemTrait for Segment {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        distance_point_to_segment(point, self.start, self.end) <= tolerance
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }

    fn style(&self) -> &ItemStyle {
        &self.style
    }
}
