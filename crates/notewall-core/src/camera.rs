//! Camera module for the board's pan/zoom transform.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed scale (zoomed all the way out).
pub const MIN_SCALE: f64 = 0.2;
/// Largest allowed scale (zoomed all the way in).
pub const MAX_SCALE: f64 = 4.0;

/// World-unit padding added around content when framing "fit all".
pub const FIT_PADDING: f64 = 100.0;
/// Safety factor applied to the fit scale so content does not touch the edges.
pub const FIT_SAFETY: f64 = 0.9;

/// Camera manages the view transform for the board canvas.
///
/// It owns the pan offset and scale and converts between screen
/// coordinates (pointer events) and world coordinates (entities).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen units.
    pub offset: Vec2,
    /// Current scale factor.
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    /// Create a new camera at the default position and scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.offset.x,
            world.y * self.scale + self.offset.y,
        )
    }

    /// Pan the camera by a delta in screen coordinates (scale-invariant).
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, pivot: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        // The world point under the pivot must stay under the pivot.
        let world = self.screen_to_world(pivot);
        self.scale = new_scale;
        self.offset = Vec2::new(
            pivot.x - world.x * new_scale,
            pivot.y - world.y * new_scale,
        );
    }

    /// Set the scale directly, clamped, keeping the given screen point fixed.
    pub fn set_scale_at(&mut self, pivot: Point, scale: f64) {
        if self.scale.abs() < f64::EPSILON {
            self.scale = MIN_SCALE;
        }
        let factor = scale.clamp(MIN_SCALE, MAX_SCALE) / self.scale;
        self.zoom_at(pivot, factor);
    }

    /// Frame the given world-space bounds inside the viewport.
    ///
    /// Bounds are padded by [`FIT_PADDING`] world units; the scale is the
    /// largest clamped value that fits the padded box, times [`FIT_SAFETY`].
    /// A degenerate (zero-area) box is treated as 1x1 so the math never
    /// divides by zero.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size) {
        let padded = bounds.inflate(FIT_PADDING, FIT_PADDING);
        let width = padded.width().max(1.0);
        let height = padded.height().max(1.0);

        let scale_x = viewport.width / width;
        let scale_y = viewport.height / height;
        self.scale = (scale_x.min(scale_y) * FIT_SAFETY).clamp(MIN_SCALE, MAX_SCALE);

        let center = padded.center();
        self.offset = Vec2::new(
            viewport.width / 2.0 - center.x * self.scale,
            viewport.height / 2.0 - center.y * self.scale,
        );
    }
}
