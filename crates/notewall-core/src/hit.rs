//! Hit-testing.
//!
//! Resolves a world-space point to the interactive thing under it. Handles
//! attached to the current selection sit above content, then notes from the
//! top of the stack down, then frame borders, then connector paths.

use kurbo::Point;

use crate::entities::{Anchor, Board, ConnectionId, FrameCorner, FrameId, NoteId, Side};
use crate::router::{route, AnchorPoint};
use crate::selection::{Primary, Selection};

/// Pick radius for anchor dots, in world units.
pub const ANCHOR_HIT_RADIUS: f64 = 14.0;
/// Pick radius for corner handles, in world units.
pub const CORNER_HIT_RADIUS: f64 = 10.0;
/// Pick distance for connector polylines, in world units.
pub const CONNECTION_HIT_DISTANCE: f64 = 8.0;
/// Snap radius when dropping a connector end near a note's anchors.
pub const ANCHOR_SNAP_RADIUS: f64 = 20.0;

/// What the pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// An anchor dot on the primarily selected note.
    NoteAnchor(Anchor),
    /// A resize handle on the primarily selected image note.
    ImageCorner { note: NoteId, corner: FrameCorner },
    /// A resize handle on the primarily selected frame.
    FrameCorner { frame: FrameId, corner: FrameCorner },
    Note(NoteId),
    FrameBorder(FrameId),
    Connection(ConnectionId),
    Background,
}

/// Resolve a world point against the board and current selection.
pub fn hit_test(board: &Board, selection: &Selection, point: Point) -> HitTarget {
    // Handles on the primary selection take precedence over everything.
    match selection.primary() {
        Some(Primary::Note(id)) => {
            if let Some(note) = board.notes.get(&id) {
                for side in Side::ALL {
                    if dist(point, note.anchor_point(side)) <= ANCHOR_HIT_RADIUS {
                        return HitTarget::NoteAnchor(Anchor { note: id, side });
                    }
                }
                if note.kind.is_image() {
                    if let Some(corner) = corner_at(note.bounds(), point) {
                        return HitTarget::ImageCorner { note: id, corner };
                    }
                }
            }
        }
        Some(Primary::Frame(id)) => {
            if let Some(frame) = board.frames.get(&id) {
                if let Some(corner) = frame.hit_test_corner(point, CORNER_HIT_RADIUS) {
                    return HitTarget::FrameCorner { frame: id, corner };
                }
            }
        }
        _ => {}
    }

    if let Some(note) = board.note_at_point(point) {
        return HitTarget::Note(note.id);
    }

    if let Some(frame) = board.frames.values().find(|f| f.hit_test_border(point)) {
        return HitTarget::FrameBorder(frame.id);
    }

    if let Some(id) = connection_at(board, point) {
        return HitTarget::Connection(id);
    }

    HitTarget::Background
}

/// The connection whose routed polyline passes closest to the point, within
/// the pick distance.
pub fn connection_at(board: &Board, point: Point) -> Option<ConnectionId> {
    let mut best: Option<(ConnectionId, f64)> = None;
    for conn in board.connections.values() {
        let (Some(from), Some(to)) = (
            board.notes.get(&conn.from.note),
            board.notes.get(&conn.to.note),
        ) else {
            continue;
        };
        let path = route(
            AnchorPoint::new(from.anchor_point(conn.from.side), conn.from.side),
            AnchorPoint::new(to.anchor_point(conn.to.side), conn.to.side),
        );
        let d = polyline_distance(&path, point);
        if d <= CONNECTION_HIT_DISTANCE && best.map(|(_, bd)| d < bd).unwrap_or(true) {
            best = Some((conn.id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// Nearest anchor of any note within the snap radius, excluding one note
/// (the connector's own source).
pub fn nearest_anchor(board: &Board, point: Point, exclude: NoteId) -> Option<Anchor> {
    let mut best: Option<(Anchor, f64)> = None;
    for note in board.notes.values() {
        if note.id == exclude {
            continue;
        }
        for side in Side::ALL {
            let d = dist(point, note.anchor_point(side));
            if d <= ANCHOR_SNAP_RADIUS && best.map(|(_, bd)| d < bd).unwrap_or(true) {
                best = Some((Anchor { note: note.id, side }, d));
            }
        }
    }
    best.map(|(a, _)| a)
}

fn corner_at(bounds: kurbo::Rect, point: Point) -> Option<FrameCorner> {
    let corners = [
        (FrameCorner::TopLeft, Point::new(bounds.x0, bounds.y0)),
        (FrameCorner::TopRight, Point::new(bounds.x1, bounds.y0)),
        (FrameCorner::BottomLeft, Point::new(bounds.x0, bounds.y1)),
        (FrameCorner::BottomRight, Point::new(bounds.x1, bounds.y1)),
    ];
    corners
        .into_iter()
        .find(|(_, p)| dist(point, *p) <= CORNER_HIT_RADIUS)
        .map(|(c, _)| c)
}

fn dist(a: Point, b: Point) -> f64 {
    (a - b).hypot()
}

/// Distance from a point to the nearest segment of a polyline.
pub fn polyline_distance(points: &[Point], p: Point) -> f64 {
    points
        .windows(2)
        .map(|w| segment_distance(w[0], w[1], p))
        .fold(f64::INFINITY, f64::min)
}

fn segment_distance(a: Point, b: Point, p: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 < f64::EPSILON {
        return dist(a, p);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    dist(a + ab * t, p)
}
