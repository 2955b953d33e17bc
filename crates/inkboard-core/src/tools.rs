//! Drawing tools.

use crate::items::{ItemKind, ItemStyle, SerializableColor};

/// Stroke width of the standard eraser, in world units.
pub const ERASER_WIDTH: f64 = 20.0;
/// Pick radius of the object eraser, in screen pixels.
pub const OBJECT_ERASER_RADIUS_PX: f64 = 10.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Pen,
    /// Paints over items with the background color.
    Eraser,
    /// Deletes whole items under the pointer.
    ObjectEraser,
    Rectangle,
    Circle,
    Line,
    Arrow,
    Text,
    Pan,
}

impl ToolKind {
    /// Item kind produced by a drag with this tool.
    pub fn drafts(self) -> Option<ItemKind> {
        match self {
            ToolKind::Pen | ToolKind::Eraser => Some(ItemKind::Pen),
            ToolKind::Rectangle => Some(ItemKind::Rectangle),
            ToolKind::Circle => Some(ItemKind::Circle),
            ToolKind::Line => Some(ItemKind::Line),
            ToolKind::Arrow => Some(ItemKind::Arrow),
            ToolKind::ObjectEraser | ToolKind::Text | ToolKind::Pan => None,
        }
    }

    /// Style of items drafted with this tool given the user's current style.
    ///
    /// The eraser ignores the user's choice and paints a wide background stroke.
    pub fn draft_style(self, current: ItemStyle) -> ItemStyle {
        match self {
            ToolKind::Eraser => ItemStyle::new(SerializableColor::background(), ERASER_WIDTH),
            _ => current,
        }
    }
}
