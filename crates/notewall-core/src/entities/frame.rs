//! Frame entity: a rectangular grouping region.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Rgba;

/// Unique identifier for frames.
pub type FrameId = Uuid;

/// Minimum frame edge length; resizes below this are clamped.
pub const MIN_FRAME_SIZE: f64 = 100.0;

/// Width of the border band (world units) that responds to pointer events.
/// The frame interior is transparent to pointers.
pub const FRAME_BORDER_BAND: f64 = 12.0;

/// Corner identifiers for frame resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A grouping frame on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    /// World-space rectangle.
    pub rect: Rect,
    /// Display title shown along the frame's top edge.
    pub title: String,
    /// Frame tint color.
    pub color: Rgba,
}

impl Frame {
    /// Create a new frame, clamping the rect to the minimum size.
    pub fn new(rect: Rect, title: impl Into<String>, color: Rgba) -> Self {
        Self {
            id: Uuid::new_v4(),
            rect: clamp_rect(rect),
            title: title.into(),
            color,
        }
    }

    /// Replace this frame's rectangle, enforcing the minimum size floor.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = clamp_rect(rect);
    }

    /// Resize by dragging one corner to a new world position.
    /// The opposite corner stays fixed; the result honors the size floor.
    pub fn resize_corner(&mut self, corner: FrameCorner, to: Point) {
        let r = self.rect;
        let (fixed_x, fixed_y) = match corner {
            FrameCorner::TopLeft => (r.x1, r.y1),
            FrameCorner::TopRight => (r.x0, r.y1),
            FrameCorner::BottomLeft => (r.x1, r.y0),
            FrameCorner::BottomRight => (r.x0, r.y0),
        };
        let mut rect = Rect::new(
            fixed_x.min(to.x),
            fixed_y.min(to.y),
            fixed_x.max(to.x),
            fixed_y.max(to.y),
        );
        // Grow away from the fixed corner when under the floor.
        if rect.width() < MIN_FRAME_SIZE {
            if to.x < fixed_x {
                rect.x0 = fixed_x - MIN_FRAME_SIZE;
                rect.x1 = fixed_x;
            } else {
                rect.x0 = fixed_x;
                rect.x1 = fixed_x + MIN_FRAME_SIZE;
            }
        }
        if rect.height() < MIN_FRAME_SIZE {
            if to.y < fixed_y {
                rect.y0 = fixed_y - MIN_FRAME_SIZE;
                rect.y1 = fixed_y;
            } else {
                rect.y0 = fixed_y;
                rect.y1 = fixed_y + MIN_FRAME_SIZE;
            }
        }
        self.rect = rect;
    }

    /// World positions of the four corner handles.
    pub fn corner_handles(&self) -> [(FrameCorner, Point); 4] {
        let r = self.rect;
        [
            (FrameCorner::TopLeft, Point::new(r.x0, r.y0)),
            (FrameCorner::TopRight, Point::new(r.x1, r.y0)),
            (FrameCorner::BottomLeft, Point::new(r.x0, r.y1)),
            (FrameCorner::BottomRight, Point::new(r.x1, r.y1)),
        ]
    }

    /// Check if a world point lies on the border band (but not the interior).
    pub fn hit_test_border(&self, point: Point) -> bool {
        let outer = self.rect.inflate(FRAME_BORDER_BAND / 2.0, FRAME_BORDER_BAND / 2.0);
        let inset = FRAME_BORDER_BAND
            .min(self.rect.width() / 2.0)
            .min(self.rect.height() / 2.0);
        let inner = self.rect.inset(-inset);
        outer.contains(point) && !inner.contains(point)
    }

    /// Find the corner handle (if any) under a world point.
    pub fn hit_test_corner(&self, point: Point, tolerance: f64) -> Option<FrameCorner> {
        self.corner_handles()
            .into_iter()
            .find(|(_, pos)| {
                let dx = point.x - pos.x;
                let dy = point.y - pos.y;
                dx * dx + dy * dy <= tolerance * tolerance
            })
            .map(|(corner, _)| corner)
    }

    /// Check if a world point is inside the frame's rectangle.
    pub fn contains(&self, point: Point) -> bool {
        self.rect.contains(point)
    }
}

fn clamp_rect(rect: Rect) -> Rect {
    let rect = rect.abs();
    Rect::new(
        rect.x0,
        rect.y0,
        rect.x0 + rect.width().max(MIN_FRAME_SIZE),
        rect.y0 + rect.height().max(MIN_FRAME_SIZE),
    )
}
