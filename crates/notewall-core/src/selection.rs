//! Selection model.
//!
//! A primary selection (one note, frame, or connection) plus an independent
//! multi-note set. Selecting a frame or connection displaces a note primary
//! but leaves the multi-set alone; only an explicit clear (empty background
//! tap) empties it. Note operations never leave a frame or connection
//! selected.

use std::collections::HashSet;

use kurbo::Rect;

use crate::entities::{Board, ConnectionId, FrameId, NoteId};

/// The single primarily-selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primary {
    Note(NoteId),
    Frame(FrameId),
    Connection(ConnectionId),
}

/// Current selection state.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    primary: Option<Primary>,
    notes: HashSet<NoteId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> Option<Primary> {
        self.primary
    }

    /// The multi-selected note set. When a single note is primary it is
    /// also a member of this set.
    pub fn notes(&self) -> &HashSet<NoteId> {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.notes.is_empty()
    }

    pub fn contains_note(&self, id: NoteId) -> bool {
        self.notes.contains(&id)
    }

    /// Select exactly one note, replacing whatever was selected.
    pub fn select_note(&mut self, id: NoteId) {
        self.primary = Some(Primary::Note(id));
        self.notes.clear();
        self.notes.insert(id);
    }

    /// Toggle a note's membership in the multi-set.
    ///
    /// Adding promotes the note to primary. Removing the primary note
    /// promotes an arbitrary remaining member, or clears the selection when
    /// the set empties. Toggling twice restores the same set.
    pub fn toggle_note(&mut self, id: NoteId) {
        if self.notes.remove(&id) {
            if self.primary == Some(Primary::Note(id)) {
                self.primary = self.notes.iter().next().copied().map(Primary::Note);
            }
        } else {
            if !matches!(self.primary, Some(Primary::Note(_)) | None) {
                // A frame or connection was primary; note ops displace it.
                self.primary = None;
            }
            self.notes.insert(id);
            self.primary = Some(Primary::Note(id));
        }
    }

    /// Select every note whose bounds intersect the rectangle.
    ///
    /// `additive` merges the hits into the existing set; otherwise the hits
    /// replace it. The last hit in z-order (the topmost) becomes primary;
    /// an empty non-additive box clears the selection.
    pub fn box_select(&mut self, board: &Board, rect: Rect, additive: bool) {
        if !additive {
            self.notes.clear();
            self.primary = None;
        } else if !matches!(self.primary, Some(Primary::Note(_)) | None) {
            self.primary = None;
        }

        let mut top: Option<NoteId> = None;
        for note in board.notes_ordered() {
            if !rect.intersect(note.bounds()).is_zero_area() {
                self.notes.insert(note.id);
                top = Some(note.id);
            }
        }
        if let Some(id) = top {
            self.primary = Some(Primary::Note(id));
        } else if let Some(&id) = self.notes.iter().next() {
            // Additive box that hit nothing keeps the existing set alive.
            if self.primary.is_none() {
                self.primary = Some(Primary::Note(id));
            }
        }
    }

    /// Select a frame as primary. The note multi-set is left intact; only
    /// the primary changes kind.
    pub fn select_frame(&mut self, id: FrameId) {
        self.primary = Some(Primary::Frame(id));
    }

    /// Select a connection as primary. The note multi-set is left intact.
    pub fn select_connection(&mut self, id: ConnectionId) {
        self.primary = Some(Primary::Connection(id));
    }

    /// Drop a frame or connection primary, e.g. after the entity was
    /// deleted. Promotes a note from the multi-set when one exists.
    pub fn drop_primary(&mut self) {
        self.primary = self.notes.iter().next().copied().map(Primary::Note);
    }

    /// Drop a note from the selection if present, e.g. after deletion.
    pub fn forget_note(&mut self, id: NoteId) {
        if self.notes.remove(&id) && self.primary == Some(Primary::Note(id)) {
            self.primary = self.notes.iter().next().copied().map(Primary::Note);
        }
    }

    /// Clear the whole selection.
    pub fn clear(&mut self) {
        self.primary = None;
        self.notes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Note, NoteKind};
    use kurbo::Point;
    use uuid::Uuid;

    #[test]
    fn select_note_replaces_everything() {
        let mut sel = Selection::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        sel.toggle_note(a);
        sel.toggle_note(b);
        assert_eq!(sel.notes().len(), 2);

        sel.select_note(a);
        assert_eq!(sel.primary(), Some(Primary::Note(a)));
        assert_eq!(sel.notes().len(), 1);
    }

    #[test]
    fn toggle_twice_is_identity() {
        let mut sel = Selection::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        sel.toggle_note(a);
        sel.toggle_note(b);

        let before: HashSet<_> = sel.notes().clone();
        sel.toggle_note(a);
        sel.toggle_note(a);
        assert_eq!(*sel.notes(), before);
        // Primary stays a note from the set.
        match sel.primary() {
            Some(Primary::Note(id)) => assert!(sel.contains_note(id)),
            other => panic!("expected a primary note, got {other:?}"),
        }
    }

    #[test]
    fn toggling_the_last_note_clears_primary() {
        let mut sel = Selection::new();
        let a = Uuid::new_v4();
        sel.toggle_note(a);
        sel.toggle_note(a);
        assert!(sel.is_empty());
    }

    #[test]
    fn frame_selection_keeps_the_note_multiset() {
        let mut sel = Selection::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        sel.toggle_note(a);
        sel.toggle_note(b);

        sel.select_frame(Uuid::new_v4());
        assert!(matches!(sel.primary(), Some(Primary::Frame(_))));
        assert_eq!(sel.notes().len(), 2);

        sel.select_connection(Uuid::new_v4());
        assert!(matches!(sel.primary(), Some(Primary::Connection(_))));
        assert_eq!(sel.notes().len(), 2);

        // Note ops displace the non-note primary again.
        let n = Uuid::new_v4();
        sel.toggle_note(n);
        assert_eq!(sel.primary(), Some(Primary::Note(n)));
        assert_eq!(sel.notes().len(), 3);
    }

    #[test]
    fn drop_primary_promotes_a_note_when_one_remains() {
        let mut sel = Selection::new();
        let a = Uuid::new_v4();
        sel.toggle_note(a);
        sel.select_frame(Uuid::new_v4());

        sel.drop_primary();
        assert_eq!(sel.primary(), Some(Primary::Note(a)));

        sel.clear();
        sel.select_connection(Uuid::new_v4());
        sel.drop_primary();
        assert!(sel.is_empty());
    }

    #[test]
    fn box_select_replaces_then_adds() {
        let mut board = Board::new();
        let a = Note::new(Point::new(0.0, 0.0), NoteKind::Standard);
        let b = Note::new(Point::new(400.0, 0.0), NoteKind::Standard);
        let c = Note::new(Point::new(2000.0, 0.0), NoteKind::Standard);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        board.add_note(a);
        board.add_note(b);
        board.add_note(c);

        let mut sel = Selection::new();
        // Replace-style box over a and b.
        sel.box_select(&board, Rect::new(-10.0, -10.0, 700.0, 300.0), false);
        assert_eq!(sel.notes().len(), 2);
        assert!(sel.contains_note(a_id) && sel.contains_note(b_id));

        // Additive box over c extends to {a, b, c}.
        sel.box_select(&board, Rect::new(1900.0, -10.0, 2300.0, 300.0), true);
        assert_eq!(sel.notes().len(), 3);
        assert!(sel.contains_note(c_id));

        // Replace-style empty box clears.
        sel.box_select(&board, Rect::new(-500.0, -500.0, -400.0, -400.0), false);
        assert!(sel.is_empty());
    }

    #[test]
    fn forget_note_promotes_a_survivor() {
        let mut sel = Selection::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        sel.toggle_note(a);
        sel.toggle_note(b);
        sel.forget_note(b);
        assert_eq!(sel.primary(), Some(Primary::Note(a)));
        assert_eq!(sel.notes().len(), 1);
    }
}
