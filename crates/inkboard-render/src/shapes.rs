//! Per-kind drawing routine, shared by frames and exports.

use crate::renderer::DrawContext;
use inkboard_core::Item;
use inkboard_core::items::ItemTrait;
use kurbo::{BezPath, Point};
use peniko::Color;

/// Draw one item in world coordinates.
pub fn draw_item<D: DrawContext + ?Sized>(dc: &mut D, item: &Item) {
    let style = item.style();
    let color: Color = style.stroke_color.into();
    let width = style.stroke_width;
    match item {
        Item::Pen(pen) => match pen.points.as_slice() {
            [] => {}
            [dot] => dc.fill_circle(*dot, width / 2.0, color),
            points => dc.stroke_path(&smooth_stroke(points), color, width),
        },
        Item::Arrow(segment) => {
            dc.stroke_path(&segment.to_path(), color, width);
            dc.stroke_path(&segment.arrow_head(), color, width);
        }
        Item::Text(text) => {
            if !text.text.is_empty() {
                dc.fill_text(&text.text, text.position, text.font_size, color);
            }
        }
        Item::Rectangle(_) | Item::Circle(_) | Item::Line(_) => {
            dc.stroke_path(&item.to_path(), color, width);
        }
    }
}

/// Smooth a polyline by curving through the midpoints of its segments.
///
/// Each interior point becomes the control point of a quadratic from the
/// previous midpoint to the next one; the ends stay where they were drawn.
pub fn smooth_stroke(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    if rest.len() < 2 {
        for p in rest {
            path.line_to(*p);
        }
        return path;
    }
    for pair in rest.windows(2) {
        let mid = pair[0].midpoint(pair[1]);
        path.quad_to(pair[0], mid);
    }
    if let Some(last) = rest.last() {
        path.line_to(*last);
    }
    path
}
