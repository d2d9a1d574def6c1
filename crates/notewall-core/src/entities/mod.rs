//! Entity definitions and the board snapshot.

mod connection;
mod frame;
mod note;

pub use connection::{Anchor, ArrowKind, Connection, ConnectionId, Side};
pub use frame::{Frame, FrameCorner, FrameId, FRAME_BORDER_BAND, MIN_FRAME_SIZE};
pub use note::{Note, NoteId, NoteKind, COMPACT_NOTE_SIZE, MIN_IMAGE_SIZE, STANDARD_NOTE_SIZE};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// RGBA8 color carried on frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::new(255, 214, 92, 255)
    }
}

/// A whole-entity mutation proposed to the external entity store.
///
/// The store owns entity lifecycles; this core only reads the board and
/// proposes full-entity replacements (no partial patches).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreProposal {
    UpsertNote(Note),
    UpsertFrame(Frame),
    UpsertConnection(Connection),
    RemoveFrame(FrameId),
    RemoveConnection(ConnectionId),
}

/// In-memory snapshot of the currently open board.
///
/// Notes keep a z-order (back to front); frames and connections have no
/// stacking relative to each other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    pub notes: HashMap<NoteId, Note>,
    /// Note stacking order, back to front.
    pub z_order: Vec<NoteId>,
    pub frames: HashMap<FrameId, Frame>,
    pub connections: HashMap<ConnectionId, Connection>,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note on top of the stack.
    pub fn add_note(&mut self, note: Note) {
        let id = note.id;
        self.z_order.push(id);
        self.notes.insert(id, note);
    }

    /// Remove a note and every connection touching it.
    pub fn remove_note(&mut self, id: NoteId) -> Option<Note> {
        self.z_order.retain(|&n| n != id);
        self.connections.retain(|_, c| !c.involves(id));
        self.notes.remove(&id)
    }

    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.insert(frame.id, frame);
    }

    pub fn remove_frame(&mut self, id: FrameId) -> Option<Frame> {
        self.frames.remove(&id)
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.insert(connection.id, connection);
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    /// Notes in z-order, back to front.
    pub fn notes_ordered(&self) -> impl Iterator<Item = &Note> {
        self.z_order.iter().filter_map(|id| self.notes.get(id))
    }

    /// Bring a note to the front of the stack.
    pub fn bring_to_front(&mut self, id: NoteId) {
        if self.notes.contains_key(&id) {
            self.z_order.retain(|&n| n != id);
            self.z_order.push(id);
        }
    }

    /// Topmost note under a world point.
    pub fn note_at_point(&self, point: Point) -> Option<&Note> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| self.notes.get(id))
            .find(|n| n.hit_test(point))
    }

    /// Union bounding box of all notes, using variant-specific sizes.
    pub fn bounds(&self) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        for note in self.notes.values() {
            let b = note.bounds();
            result = Some(match result {
                Some(r) => r.union(b),
                None => b,
            });
        }
        result
    }

    /// Apply a proposal to this snapshot. Hosts call this after the external
    /// store accepts the mutation, keeping the snapshot in step.
    pub fn apply(&mut self, proposal: StoreProposal) {
        match proposal {
            StoreProposal::UpsertNote(note) => {
                if !self.notes.contains_key(&note.id) {
                    self.z_order.push(note.id);
                }
                self.notes.insert(note.id, note);
            }
            StoreProposal::UpsertFrame(frame) => {
                self.frames.insert(frame.id, frame);
            }
            StoreProposal::UpsertConnection(connection) => {
                self.connections.insert(connection.id, connection);
            }
            StoreProposal::RemoveFrame(id) => {
                self.frames.remove(&id);
            }
            StoreProposal::RemoveConnection(id) => {
                self.connections.remove(&id);
            }
        }
    }

    /// Serialize the board to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a board from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.frames.is_empty() && self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_at_point_prefers_topmost() {
        let mut board = Board::new();
        let a = Note::new(Point::new(0.0, 0.0), NoteKind::Standard);
        let b = Note::new(Point::new(100.0, 100.0), NoteKind::Standard);
        let (a_id, b_id) = (a.id, b.id);
        board.add_note(a);
        board.add_note(b);

        // Overlap region: b was added later, so it wins.
        assert_eq!(board.note_at_point(Point::new(150.0, 150.0)).unwrap().id, b_id);

        board.bring_to_front(a_id);
        assert_eq!(board.note_at_point(Point::new(150.0, 150.0)).unwrap().id, a_id);
    }

    #[test]
    fn remove_note_drops_its_connections() {
        let mut board = Board::new();
        let a = Note::new(Point::new(0.0, 0.0), NoteKind::Standard);
        let b = Note::new(Point::new(600.0, 0.0), NoteKind::Standard);
        let (a_id, b_id) = (a.id, b.id);
        board.add_note(a);
        board.add_note(b);
        let conn = Connection::new(
            Anchor { note: a_id, side: Side::Right },
            Anchor { note: b_id, side: Side::Left },
        )
        .unwrap();
        board.add_connection(conn);

        board.remove_note(a_id);
        assert!(board.connections.is_empty());
    }

    #[test]
    fn bounds_unions_variant_sizes() {
        let mut board = Board::new();
        board.add_note(Note::new(Point::new(0.0, 0.0), NoteKind::Standard));
        board.add_note(Note::new(
            Point::new(500.0, 0.0),
            NoteKind::Image { width: 400.0, height: 50.0 },
        ));
        assert_eq!(board.bounds().unwrap(), Rect::new(0.0, 0.0, 900.0, 256.0));
    }

    #[test]
    fn json_roundtrip() {
        let mut board = Board::new();
        board.add_note(Note::new(Point::new(10.0, 20.0), NoteKind::Compact));
        board.add_frame(Frame::new(
            Rect::new(0.0, 0.0, 400.0, 300.0),
            "Trip",
            Rgba::default(),
        ));
        let json = board.to_json().unwrap();
        let restored = Board::from_json(&json).unwrap();
        assert_eq!(restored.notes.len(), 1);
        assert_eq!(restored.frames.len(), 1);
        assert_eq!(restored.z_order, board.z_order);
    }

    #[test]
    fn apply_upsert_note_keeps_z_order_stable() {
        let mut board = Board::new();
        let mut note = Note::new(Point::new(0.0, 0.0), NoteKind::Standard);
        board.add_note(note.clone());
        note.position = Point::new(50.0, 50.0);
        board.apply(StoreProposal::UpsertNote(note.clone()));
        assert_eq!(board.z_order.len(), 1);
        assert_eq!(board.notes[&note.id].position, Point::new(50.0, 50.0));
    }
}
