//! Freehand stroke.

use super::{ItemId, ItemStyle, ItemTrait};
use crate::geometry::{distance_point_to_polyline, points_bounds};
use kurbo::{BezPath, Point, Rect};
use uuid::Uuid;

/// A freehand stroke: an ordered list of world points.
///
/// Points are only ever appended while the stroke is being drafted.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub(crate) id: ItemId,
    pub points: Vec<Point>,
    pub style: ItemStyle,
}

impl Pen {
    /// Start a new stroke at `start`.
    pub fn new(start: Point, style: ItemStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            style,
        }
    }

    /// Reconstruct a stroke received from the wire.
    pub(crate) fn reconstruct(id: ItemId, points: Vec<Point>, style: ItemStyle) -> Self {
        Self { id, points, style }
    }
}

impl ItemTrait for Pen {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounds(&self) -> Rect {
        points_bounds(&self.points).unwrap_or(Rect::ZERO)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        distance_point_to_polyline(point, &self.points) <= tolerance
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };
        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
        path
    }

    fn style(&self) -> &ItemStyle {
        &self.style
    }
}
