//! Export layout: fit the whole board into an image.

use crate::renderer::{DrawContext, RenderResult, RendererError};
use crate::shapes::draw_item;
use inkboard_core::BoardStore;
use kurbo::{Affine, Rect, Size, Vec2};
use peniko::Color;

/// Margin around the board contents, in world units.
pub const EXPORT_PADDING: f64 = 50.0;

/// Where an export lands: image size and the world-to-image transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportFrame {
    /// Padded bounds of the board in world coordinates.
    pub bounds: Rect,
    /// Output size at one pixel per world unit.
    pub size: Size,
    /// Maps the top-left of `bounds` to the image origin.
    pub transform: Affine,
}

/// Layout for exporting every item of `store`, or `None` when nothing is drawn.
pub fn export_frame(store: &BoardStore, padding: f64) -> Option<ExportFrame> {
    let bounds = store.bounds()?.inflate(padding, padding);
    Some(ExportFrame {
        bounds,
        size: bounds.size(),
        transform: Affine::translate(-Vec2::new(bounds.x0, bounds.y0)),
    })
}

/// Draw the whole board into `dc`, items in board order.
pub fn render_export<D: DrawContext + ?Sized>(
    store: &BoardStore,
    background: Color,
    dc: &mut D,
) -> RenderResult<ExportFrame> {
    let frame = export_frame(store, EXPORT_PADDING).ok_or(RendererError::EmptyBoard)?;
    dc.clear(background);
    dc.set_transform(frame.transform);
    for item in store.iter() {
        draw_item(dc, item);
    }
    Ok(frame)
}
