//! Pan and zoom for the local view.

use kurbo::{Affine, Point, Vec2};

/// Smallest zoom the camera allows.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom the camera allows.
pub const MAX_ZOOM: f64 = 10.0;
/// Wheel zoom step. One notch zooms in by this factor or out by its inverse.
pub const ZOOM_STEP: f64 = 1.1;

/// The local view onto the board.
///
/// Never shared with other participants. `world = (screen - offset) / zoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Pan, in screen pixels.
    pub offset: Vec2,
    /// Kept within `[MIN_ZOOM, MAX_ZOOM]` by `zoom_at`.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-to-screen transform used when drawing.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.offset) / self.zoom).to_point()
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        (world.to_vec2() * self.zoom + self.offset).to_point()
    }

    /// Shift the view by a screen-space drag.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the world point under `anchor` fixed on screen.
    ///
    /// The resulting zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`; the anchor
    /// stays fixed even when clamping shortens the step.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_anchor = self.screen_to_world(anchor);
        self.zoom = new_zoom;
        self.offset = anchor.to_vec2() - world_anchor.to_vec2() * new_zoom;
    }

    /// One wheel notch around `anchor`. Negative `delta_y` (scrolling up) zooms in.
    pub fn wheel_zoom(&mut self, anchor: Point, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom_at(anchor, ZOOM_STEP);
        } else if delta_y > 0.0 {
            self.zoom_at(anchor, 1.0 / ZOOM_STEP);
        }
    }

    /// Convert a screen-space radius into world units at the current zoom.
    pub fn tolerance(&self, base_px: f64) -> f64 {
        base_px / self.zoom
    }
}
