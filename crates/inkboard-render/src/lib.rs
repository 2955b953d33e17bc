//! Inkboard Render Library
//!
//! Per-kind drawing routines, the frame pass and the export layout. Pixels
//! are produced by an external [`DrawContext`]; this crate only decides what
//! to draw and where.

mod export;
mod renderer;
mod shapes;

pub use export::{EXPORT_PADDING, ExportFrame, export_frame, render_export};
pub use renderer::{DrawContext, RenderContext, RenderResult, RendererError, render_frame};
pub use shapes::{draw_item, smooth_stroke};
