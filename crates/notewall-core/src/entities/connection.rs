//! Connection entity: a directional connector between two notes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NoteId;

/// Unique identifier for connections.
pub type ConnectionId = Uuid;

/// Side of a note's bounding box that an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Outward unit normal of this side.
    pub fn normal(&self) -> (f64, f64) {
        match self {
            Side::Top => (0.0, -1.0),
            Side::Right => (1.0, 0.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
        }
    }

    /// True for left/right sides.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// The opposite side.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// All four sides, for anchor iteration.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];
}

/// One endpoint of a connection: a note plus the side it attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub note: NoteId,
    pub side: Side,
}

/// Arrowhead state. Selecting an already-selected connection cycles this;
/// cycling past `None` deletes the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowKind {
    /// Arrowhead at the `to` end.
    #[default]
    Forward,
    /// Arrowhead at the `from` end.
    Reverse,
    /// No arrowhead.
    None,
}

impl ArrowKind {
    /// Next state in the selection cycle, or `None` (the Option) when the
    /// connection should be deleted instead.
    pub fn next(self) -> Option<ArrowKind> {
        match self {
            ArrowKind::Forward => Some(ArrowKind::Reverse),
            ArrowKind::Reverse => Some(ArrowKind::None),
            ArrowKind::None => None,
        }
    }
}

/// A directional connector between two notes.
///
/// Anchor world positions are always recomputed from the endpoint notes'
/// current geometry; they are never cached here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: Anchor,
    pub to: Anchor,
    #[serde(default)]
    pub arrow: ArrowKind,
}

impl Connection {
    /// Create a new connection with the default forward arrow.
    /// Returns `None` for a self-connection, which is never committed.
    pub fn new(from: Anchor, to: Anchor) -> Option<Self> {
        if from.note == to.note {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            from,
            to,
            arrow: ArrowKind::Forward,
        })
    }

    /// True if this connection touches the given note.
    pub fn involves(&self, note: NoteId) -> bool {
        self.from.note == note || self.to.note == note
    }
}
