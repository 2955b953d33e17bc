//! Text item.

use super::{DEFAULT_FONT_SIZE, ItemId, ItemStyle, ItemTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use uuid::Uuid;

/// Average glyph advance as a fraction of the font size.
///
/// Used to approximate a text box without shaping the text.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// A single run of text anchored at its baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub(crate) id: ItemId,
    /// Left end of the baseline.
    pub position: Point,
    pub text: String,
    pub font_size: f64,
    pub style: ItemStyle,
}

impl Text {
    pub fn new(position: Point, text: String, style: ItemStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            text,
            font_size: DEFAULT_FONT_SIZE,
            style,
        }
    }

    pub(crate) fn reconstruct(
        id: ItemId,
        position: Point,
        text: String,
        font_size: f64,
        style: ItemStyle,
    ) -> Self {
        Self {
            id,
            position,
            text,
            font_size,
            style,
        }
    }

    /// Approximate width from the character count.
    pub fn approx_width(&self) -> f64 {
        self.text.chars().count() as f64 * self.font_size * CHAR_WIDTH_FACTOR
    }
}

impl ItemTrait for Text {
    fn id(&self) -> ItemId {
        self.id
    }

    /// The box spans one font size above the baseline.
    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y - self.font_size,
            self.position.x + self.approx_width(),
            self.position.y,
        )
    }

    fn hit_test(&self, point: Point, _tolerance: f64) -> bool {
        if self.text.is_empty() {
            return false;
        }
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    fn to_path(&self) -> BezPath {
        // Text has no outline of its own; the box stands in for it.
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ItemStyle {
        &self.style
    }
}
