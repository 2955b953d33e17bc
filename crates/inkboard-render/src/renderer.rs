//! Drawing-surface abstraction and the per-frame pass.

use crate::shapes::draw_item;
use inkboard_core::camera::Camera;
use inkboard_core::presence::PresenceTracker;
use inkboard_core::{BoardStore, Item, SerializableColor};
use kurbo::{Affine, BezPath, Point, Vec2};
use peniko::Color;
use thiserror::Error;

/// Radius of a remote cursor dot, in screen pixels.
const CURSOR_RADIUS_PX: f64 = 5.0;
/// Font size of a remote cursor's name label, in screen pixels.
const CURSOR_LABEL_PX: f64 = 14.0;
/// Offset of the label from the cursor dot, in screen pixels.
const CURSOR_LABEL_OFFSET_PX: f64 = 10.0;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Nothing to export: the board is empty")]
    EmptyBoard,
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// The drawing capability a host provides.
///
/// Coordinates passed to the drawing calls are in the space set by the
/// last [`DrawContext::set_transform`].
pub trait DrawContext {
    /// Fill the whole surface with `color`, ignoring the transform.
    fn clear(&mut self, color: Color);

    fn set_transform(&mut self, transform: Affine);

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    /// Draw `text` with its baseline starting at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color);
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    pub store: &'a BoardStore,
    pub camera: &'a Camera,
    /// Item being drawn locally, shown above the board.
    pub draft: Option<&'a Item>,
    /// Remote cursors.
    pub presence: Option<&'a PresenceTracker>,
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(store: &'a BoardStore, camera: &'a Camera) -> Self {
        Self {
            store,
            camera,
            draft: None,
            presence: None,
            background_color: SerializableColor::background().into(),
        }
    }

    pub fn with_draft(mut self, draft: Option<&'a Item>) -> Self {
        self.draft = draft;
        self
    }

    pub fn with_presence(mut self, presence: &'a PresenceTracker) -> Self {
        self.presence = Some(presence);
        self
    }
}

/// Draw one frame: background, items back to front, the draft, then cursors.
///
/// Reads the context only.
pub fn render_frame<D: DrawContext + ?Sized>(ctx: &RenderContext<'_>, dc: &mut D) {
    dc.clear(ctx.background_color);
    dc.set_transform(ctx.camera.transform());

    for item in ctx.store.iter() {
        draw_item(dc, item);
    }
    if let Some(draft) = ctx.draft {
        draw_item(dc, draft);
    }

    let Some(presence) = ctx.presence else {
        return;
    };
    // Sizes are fixed on screen, so divide by zoom in world space
    let zoom = ctx.camera.zoom;
    let label_offset = CURSOR_LABEL_OFFSET_PX / zoom;
    for (_, record) in presence.iter() {
        let color = cursor_color(&record.name);
        dc.fill_circle(record.position, CURSOR_RADIUS_PX / zoom, color);
        dc.fill_text(
            &record.name,
            record.position + Vec2::new(label_offset, label_offset),
            CURSOR_LABEL_PX / zoom,
            color,
        );
    }
}

/// Stable per-name cursor color.
fn cursor_color(name: &str) -> Color {
    const PALETTE: [(u8, u8, u8); 6] = [
        (239, 68, 68),
        (59, 130, 246),
        (34, 197, 94),
        (234, 179, 8),
        (168, 85, 247),
        (236, 72, 153),
    ];
    let hash = name
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    let (r, g, b) = PALETTE[(hash as usize) % PALETTE.len()];
    Color::from_rgba8(r, g, b, 255)
}
