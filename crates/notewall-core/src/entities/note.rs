//! Note entity.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FrameCorner, Side};

/// Unique identifier for notes.
pub type NoteId = Uuid;

/// Fixed edge length of a standard note.
pub const STANDARD_NOTE_SIZE: f64 = 256.0;
/// Fixed edge length of a compact note.
pub const COMPACT_NOTE_SIZE: f64 = 180.0;
/// Minimum edge length an image note can be resized to.
pub const MIN_IMAGE_SIZE: f64 = 64.0;

/// Note variant, which determines the note's rendered size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteKind {
    /// Fixed 256x256 sticky note.
    Standard,
    /// Fixed 180x180 small note.
    Compact,
    /// Photo note with an explicit stored size.
    Image { width: f64, height: f64 },
}

impl NoteKind {
    /// True for the image variant, the only user-resizable one.
    pub fn is_image(&self) -> bool {
        matches!(self, NoteKind::Image { .. })
    }

    /// Size of a note of this variant.
    pub fn size(&self) -> Size {
        match self {
            NoteKind::Standard => Size::new(STANDARD_NOTE_SIZE, STANDARD_NOTE_SIZE),
            NoteKind::Compact => Size::new(COMPACT_NOTE_SIZE, COMPACT_NOTE_SIZE),
            NoteKind::Image { width, height } => Size::new(*width, *height),
        }
    }
}

/// A note on the board.
///
/// `position` is the top-left corner in world coordinates. The bounding
/// box is always axis-aligned; any visual rotation is cosmetic and never
/// affects hit-testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Top-left corner in world coordinates.
    pub position: Point,
    /// Variant, determining the note's size.
    #[serde(flatten)]
    pub kind: NoteKind,
}

impl Note {
    /// Create a new note of the given variant.
    pub fn new(position: Point, kind: NoteKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            kind,
        }
    }

    /// Size of this note in world units.
    pub fn size(&self) -> Size {
        self.kind.size()
    }

    /// Axis-aligned bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        let size = self.size();
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + size.width,
            self.position.y + size.height,
        )
    }

    /// Center point, used for frame containment.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// World position of the connector anchor on the given side
    /// (the midpoint of that edge).
    pub fn anchor_point(&self, side: Side) -> Point {
        let b = self.bounds();
        match side {
            Side::Top => Point::new(b.center().x, b.y0),
            Side::Right => Point::new(b.x1, b.center().y),
            Side::Bottom => Point::new(b.center().x, b.y1),
            Side::Left => Point::new(b.x0, b.center().y),
        }
    }

    /// Check if a world point is inside this note's bounding box.
    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Resize an image note by dragging one corner, keeping the opposite
    /// corner fixed and enforcing the minimum size. No-op on fixed-size
    /// variants.
    pub fn resize_image_corner(&mut self, corner: FrameCorner, to: Point) {
        if !self.kind.is_image() {
            return;
        }
        let b = self.bounds();
        let (fixed_x, fixed_y) = match corner {
            FrameCorner::TopLeft => (b.x1, b.y1),
            FrameCorner::TopRight => (b.x0, b.y1),
            FrameCorner::BottomLeft => (b.x1, b.y0),
            FrameCorner::BottomRight => (b.x0, b.y0),
        };
        let width = (to.x - fixed_x).abs().max(MIN_IMAGE_SIZE);
        let height = (to.y - fixed_y).abs().max(MIN_IMAGE_SIZE);
        let x0 = if to.x < fixed_x { fixed_x - width } else { fixed_x };
        let y0 = if to.y < fixed_y { fixed_y - height } else { fixed_y };
        self.position = Point::new(x0, y0);
        self.kind = NoteKind::Image { width, height };
    }
}
