//! Rectangle item.

use super::{ItemId, ItemStyle, ItemTrait};
use crate::geometry::hits_rect_outline;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use uuid::Uuid;

/// An axis-aligned rectangle spanned by two corners.
///
/// The corners are kept as drawn; `start` may lie below or right of `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub(crate) id: ItemId,
    pub start: Point,
    pub end: Point,
    pub style: ItemStyle,
}

impl Rectangle {
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

    /// Normalized kurbo rect.
    pub fn as_rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }
}

impl ItemTrait for Rectangle {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hits_rect_outline(self.as_rect(), point, tolerance)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ItemStyle {
        &self.style
    }
}
