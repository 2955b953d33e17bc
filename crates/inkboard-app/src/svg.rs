//! SVG drawing surface for board exports.

use inkboard_core::SerializableColor;
use inkboard_render::DrawContext;
use kurbo::{Affine, BezPath, Point, Size};
use peniko::Color;
use std::fmt::Write;

/// Collects drawing calls into an SVG document.
pub struct SvgCanvas {
    transform: Affine,
    body: String,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self {
            transform: Affine::IDENTITY,
            body: String::new(),
        }
    }

    /// Uniform scale of the current transform.
    fn scale(&self) -> f64 {
        let [a, b, ..] = self.transform.as_coeffs();
        a.hypot(b)
    }

    /// Wrap the collected elements in a document of the given size.
    pub fn finish(self, size: Size) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = size.width.ceil(),
            h = size.height.ceil(),
            body = self.body
        )
    }
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn hex(color: Color) -> String {
    SerializableColor::from(color).to_hex()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl DrawContext for SvgCanvas {
    fn clear(&mut self, color: Color) {
        self.body.clear();
        let _ = writeln!(
            self.body,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            hex(color)
        );
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        let path = self.transform * path.clone();
        let _ = writeln!(
            self.body,
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
            path.to_svg(),
            hex(color),
            width * self.scale()
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let c = self.transform * center;
        let _ = writeln!(
            self.body,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>",
            c.x,
            c.y,
            radius * self.scale(),
            hex(color)
        );
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color) {
        let o = self.transform * origin;
        let _ = writeln!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"sans-serif\" fill=\"{}\">{}</text>",
            o.x,
            o.y,
            font_size * self.scale(),
            hex(color),
            escape(text)
        );
    }
}
