//! Frame containment, derived from geometry.
//!
//! Membership is never stored: a note belongs to every frame whose rectangle
//! contains the note's center point, recomputed from the current snapshot
//! whenever it is needed. Moving a note in or out of a frame therefore needs
//! no bookkeeping and cannot drift out of sync.

use std::collections::{HashMap, HashSet};

use crate::entities::{Board, Connection, Frame, FrameId, Note, NoteId};

/// Frames whose rectangle contains this note's center.
pub fn containing_frames<'a>(
    note: &Note,
    frames: impl Iterator<Item = &'a Frame>,
) -> Vec<FrameId> {
    let center = note.center();
    frames
        .filter(|f| f.contains(center))
        .map(|f| f.id)
        .collect()
}

/// Full membership map for a board: note id to the frames containing it.
/// Notes inside no frame are omitted.
pub fn membership(board: &Board) -> HashMap<NoteId, Vec<FrameId>> {
    let mut out = HashMap::new();
    for note in board.notes.values() {
        let frames = containing_frames(note, board.frames.values());
        if !frames.is_empty() {
            out.insert(note.id, frames);
        }
    }
    out
}

/// Notes whose center lies inside the given frame.
pub fn notes_in_frame(board: &Board, frame: FrameId) -> Vec<NoteId> {
    let Some(f) = board.frames.get(&frame) else {
        return Vec::new();
    };
    board
        .notes
        .values()
        .filter(|n| f.contains(n.center()))
        .map(|n| n.id)
        .collect()
}

/// Whether a connection is visible under a frame filter.
///
/// An empty filter shows everything. A non-empty filter shows a connection
/// when its source note belongs to one of the filtered frames; the target
/// end does not participate in the decision.
pub fn connection_visible(
    connection: &Connection,
    membership: &HashMap<NoteId, Vec<FrameId>>,
    filter: &HashSet<FrameId>,
) -> bool {
    if filter.is_empty() {
        return true;
    }
    membership
        .get(&connection.from.note)
        .map(|frames| frames.iter().any(|f| filter.contains(f)))
        .unwrap_or(false)
}
