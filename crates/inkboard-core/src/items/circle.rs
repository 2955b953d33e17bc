//! Circle item.

use super::{ItemId, ItemStyle, ItemTrait};
use crate::geometry::hits_ring;
use kurbo::{BezPath, Circle as KurboCircle, Point, Rect, Shape as KurboShape};
use uuid::Uuid;

/// A circle centered at `start` passing through `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub(crate) id: ItemId,
    pub start: Point,
    pub end: Point,
    pub style: ItemStyle,
}

impl Circle {
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

    pub fn center(&self) -> Point {
        self.start
    }

    pub fn radius(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn as_kurbo(&self) -> KurboCircle {
        KurboCircle::new(self.center(), self.radius())
    }
}

impl ItemTrait for Circle {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let r = self.radius();
        Rect::from_center_size(self.center(), (r * 2.0, r * 2.0))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hits_ring(self.center(), self.radius(), point, tolerance)
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn style(&self) -> &ItemStyle {
        &self.style
    }
}
