//! Pointer gesture state machine.
//!
//! Turns raw pointer events into board gestures: taps, double-taps, long
//! presses, drags, box selection, frame drawing, connector dragging, and
//! two-finger pinch-zoom. The machine works entirely in screen space and
//! carries no timers; hosts stamp every event with milliseconds and call
//! [`GestureMachine::tick`] periodically so long presses can fire.

use kurbo::{Point, Vec2};

use crate::entities::{Anchor, ConnectionId, FrameCorner, FrameId, NoteId};
use crate::hit::HitTarget;

/// Screen-pixel distance a pointer may travel and still count as a tap.
pub const DRAG_THRESHOLD: f64 = 15.0;
/// Two taps within this window merge into a double-tap.
pub const DOUBLE_TAP_MS: u64 = 300;
/// A press held this long without moving fires a long press.
pub const LONG_PRESS_MS: u64 = 600;

/// Keyboard modifier state accompanying a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// One pointer sample from the host, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub id: u64,
    pub position: Point,
    pub modifiers: Modifiers,
    pub time_ms: u64,
}

impl PointerInput {
    pub fn new(id: u64, position: Point, time_ms: u64) -> Self {
        Self {
            id,
            position,
            modifiers: Modifiers::default(),
            time_ms,
        }
    }
}

/// The armed tool, deciding what a background press starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Select,
    BoxSelect,
    Frame,
}

/// Current gesture. Exposed so hosts can render in-flight overlays
/// (selection boxes, frame previews, pending connector lines).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Panning { pointer: u64, last: Point },
    DraggingNotes { pointer: u64, note: NoteId, last: Point },
    DraggingFrame { pointer: u64, frame: FrameId, last: Point },
    ResizingFrame { pointer: u64, frame: FrameId, corner: FrameCorner },
    ResizingImage { pointer: u64, note: NoteId, corner: FrameCorner },
    BoxSelecting { pointer: u64, start: Point, current: Point, additive: bool },
    DrawingFrame { pointer: u64, start: Point, current: Point },
    Connecting { pointer: u64, from: Anchor, current: Point },
    PinchZooming { pointers: [(u64, Point); 2] },
}

/// Semantic output of the machine. Positions and deltas are screen-space;
/// the caller owns the world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Pan { delta: Vec2 },
    Pinch { pivot: Point, factor: f64, pan: Vec2 },
    TapBackground { position: Point, modifiers: Modifiers },
    DoubleTapBackground { position: Point },
    TapNote { note: NoteId, modifiers: Modifiers },
    DoubleTapNote { note: NoteId },
    LongPressNote { note: NoteId },
    TapFrame { frame: FrameId },
    TapConnection { connection: ConnectionId },
    NoteDragStarted { note: NoteId },
    NoteDragMoved { note: NoteId, delta: Vec2 },
    NoteDragFinished { note: NoteId },
    FrameDragStarted { frame: FrameId },
    FrameDragMoved { frame: FrameId, delta: Vec2 },
    FrameDragFinished { frame: FrameId },
    FrameResizeMoved { frame: FrameId, corner: FrameCorner, position: Point },
    FrameResizeFinished { frame: FrameId },
    ImageResizeMoved { note: NoteId, corner: FrameCorner, position: Point },
    ImageResizeFinished { note: NoteId },
    BoxSelectChanged { start: Point, current: Point },
    BoxSelectFinished { start: Point, current: Point, additive: bool },
    FrameDrawChanged { start: Point, current: Point },
    FrameDrawFinished { start: Point, current: Point },
    ConnectMoved { from: Anchor, position: Point },
    ConnectReleased { from: Anchor, position: Point },
}

/// A press whose tap-vs-drag fate is still undecided.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingPress {
    pointer: u64,
    target: PressTarget,
    start: Point,
    time_ms: u64,
    modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressTarget {
    Background,
    Note(NoteId),
    FrameBorder(FrameId),
    Connection(ConnectionId),
}

/// The previous completed tap, for double-tap merging.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TapRecord {
    target: PressTarget,
    position: Point,
    time_ms: u64,
}

#[derive(Debug, Default)]
pub struct GestureMachine {
    gesture: Gesture,
    tool: Tool,
    pending: Option<PendingPress>,
    last_tap: Option<TapRecord>,
    /// Pointer whose release must be swallowed (long press already fired).
    consumed_pointer: Option<u64>,
    /// Currently-down pointers, in press order.
    down: Vec<(u64, Point)>,
}

impl Default for Gesture {
    fn default() -> Self {
        Gesture::Idle
    }
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Abort any in-flight gesture, e.g. on pointer-capture loss.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
        self.pending = None;
        self.consumed_pointer = None;
        self.down.clear();
    }

    /// Feed a pointer press. `target` is what the press landed on, already
    /// resolved against the board in world space.
    pub fn pointer_down(&mut self, input: PointerInput, target: HitTarget) -> Vec<GestureEvent> {
        if self.down.iter().all(|(id, _)| *id != input.id) {
            self.down.push((input.id, input.position));
        }

        // A second pointer during pan or an undecided press becomes a pinch.
        // Pointers beyond the second are ignored entirely.
        if self.down.len() == 2 {
            match self.gesture {
                Gesture::Idle | Gesture::Panning { .. } => {
                    self.pending = None;
                    self.gesture = Gesture::PinchZooming {
                        pointers: [self.down[0], self.down[1]],
                    };
                }
                _ => {}
            }
            return Vec::new();
        }
        if self.down.len() > 2 || !matches!(self.gesture, Gesture::Idle) {
            return Vec::new();
        }

        let PointerInput { id, position, modifiers, time_ms } = input;
        match target {
            HitTarget::Background => match self.tool {
                Tool::Select => {
                    // Tentatively pan; an under-threshold release becomes a
                    // background tap instead.
                    self.pending = Some(PendingPress {
                        pointer: id,
                        target: PressTarget::Background,
                        start: position,
                        time_ms,
                        modifiers,
                    });
                    self.gesture = Gesture::Panning { pointer: id, last: position };
                }
                Tool::BoxSelect => {
                    self.gesture = Gesture::BoxSelecting {
                        pointer: id,
                        start: position,
                        current: position,
                        additive: modifiers.shift,
                    };
                }
                Tool::Frame => {
                    self.gesture = Gesture::DrawingFrame {
                        pointer: id,
                        start: position,
                        current: position,
                    };
                }
            },
            HitTarget::Note(note) => {
                self.pending = Some(PendingPress {
                    pointer: id,
                    target: PressTarget::Note(note),
                    start: position,
                    time_ms,
                    modifiers,
                });
            }
            HitTarget::FrameBorder(frame) => {
                self.pending = Some(PendingPress {
                    pointer: id,
                    target: PressTarget::FrameBorder(frame),
                    start: position,
                    time_ms,
                    modifiers,
                });
            }
            HitTarget::Connection(connection) => {
                self.pending = Some(PendingPress {
                    pointer: id,
                    target: PressTarget::Connection(connection),
                    start: position,
                    time_ms,
                    modifiers,
                });
            }
            HitTarget::NoteAnchor(from) => {
                self.gesture = Gesture::Connecting { pointer: id, from, current: position };
            }
            HitTarget::ImageCorner { note, corner } => {
                self.gesture = Gesture::ResizingImage { pointer: id, note, corner };
            }
            HitTarget::FrameCorner { frame, corner } => {
                self.gesture = Gesture::ResizingFrame { pointer: id, frame, corner };
            }
        }
        Vec::new()
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> Vec<GestureEvent> {
        if let Some(slot) = self.down.iter_mut().find(|(id, _)| *id == input.id) {
            slot.1 = input.position;
        }
        let position = input.position;
        let mut events = Vec::new();

        // An undecided press promotes to a drag past the threshold.
        if let Some(p) = self.pending {
            if p.pointer == input.id
                && (position - p.start).hypot() > DRAG_THRESHOLD
                && self.consumed_pointer != Some(input.id)
            {
                self.pending = None;
                match p.target {
                    PressTarget::Note(note) => {
                        self.gesture = Gesture::DraggingNotes {
                            pointer: input.id,
                            note,
                            last: position,
                        };
                        events.push(GestureEvent::NoteDragStarted { note });
                        events.push(GestureEvent::NoteDragMoved {
                            note,
                            delta: position - p.start,
                        });
                        return events;
                    }
                    PressTarget::FrameBorder(frame) => {
                        self.gesture = Gesture::DraggingFrame {
                            pointer: input.id,
                            frame,
                            last: position,
                        };
                        events.push(GestureEvent::FrameDragStarted { frame });
                        events.push(GestureEvent::FrameDragMoved {
                            frame,
                            delta: position - p.start,
                        });
                        return events;
                    }
                    // Connections have no drag; the press just fizzles.
                    PressTarget::Connection(_) => {}
                    // Background presses are already panning.
                    PressTarget::Background => {}
                }
            }
        }

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Panning { pointer, last } if *pointer == input.id => {
                events.push(GestureEvent::Pan { delta: position - *last });
                *last = position;
            }
            Gesture::Panning { .. } => {}
            Gesture::DraggingNotes { pointer, note, last } if *pointer == input.id => {
                events.push(GestureEvent::NoteDragMoved {
                    note: *note,
                    delta: position - *last,
                });
                *last = position;
            }
            Gesture::DraggingFrame { pointer, frame, last } if *pointer == input.id => {
                events.push(GestureEvent::FrameDragMoved {
                    frame: *frame,
                    delta: position - *last,
                });
                *last = position;
            }
            Gesture::ResizingFrame { pointer, frame, corner } if *pointer == input.id => {
                events.push(GestureEvent::FrameResizeMoved {
                    frame: *frame,
                    corner: *corner,
                    position,
                });
            }
            Gesture::ResizingImage { pointer, note, corner } if *pointer == input.id => {
                events.push(GestureEvent::ImageResizeMoved {
                    note: *note,
                    corner: *corner,
                    position,
                });
            }
            Gesture::BoxSelecting { pointer, start, current, .. } if *pointer == input.id => {
                *current = position;
                events.push(GestureEvent::BoxSelectChanged { start: *start, current: position });
            }
            Gesture::DrawingFrame { pointer, start, current } if *pointer == input.id => {
                *current = position;
                events.push(GestureEvent::FrameDrawChanged { start: *start, current: position });
            }
            Gesture::Connecting { pointer, from, current } if *pointer == input.id => {
                *current = position;
                events.push(GestureEvent::ConnectMoved { from: *from, position });
            }
            Gesture::PinchZooming { pointers } => {
                let old = *pointers;
                if let Some(slot) = pointers.iter_mut().find(|(id, _)| *id == input.id) {
                    slot.1 = position;
                    let old_mid = midpoint(old[0].1, old[1].1);
                    let new_mid = midpoint(pointers[0].1, pointers[1].1);
                    let old_dist = (old[0].1 - old[1].1).hypot();
                    let new_dist = (pointers[0].1 - pointers[1].1).hypot();
                    let factor = if old_dist > 1e-3 { new_dist / old_dist } else { 1.0 };
                    events.push(GestureEvent::Pinch {
                        pivot: new_mid,
                        factor,
                        pan: new_mid - old_mid,
                    });
                }
            }
            _ => {}
        }
        events
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> Vec<GestureEvent> {
        self.down.retain(|(id, _)| *id != input.id);
        if self.consumed_pointer == Some(input.id) {
            self.consumed_pointer = None;
            self.pending = None;
            if matches!(self.gesture, Gesture::Panning { pointer, .. } if pointer == input.id) {
                self.gesture = Gesture::Idle;
            }
            return Vec::new();
        }

        let position = input.position;
        let mut events = Vec::new();

        let finished = match self.gesture {
            Gesture::Panning { pointer, .. } if pointer == input.id => true,
            Gesture::DraggingNotes { pointer, note, .. } if pointer == input.id => {
                events.push(GestureEvent::NoteDragFinished { note });
                true
            }
            Gesture::DraggingFrame { pointer, frame, .. } if pointer == input.id => {
                events.push(GestureEvent::FrameDragFinished { frame });
                true
            }
            Gesture::ResizingFrame { pointer, frame, .. } if pointer == input.id => {
                events.push(GestureEvent::FrameResizeFinished { frame });
                true
            }
            Gesture::ResizingImage { pointer, note, .. } if pointer == input.id => {
                events.push(GestureEvent::ImageResizeFinished { note });
                true
            }
            Gesture::BoxSelecting { pointer, start, additive, .. } if pointer == input.id => {
                events.push(GestureEvent::BoxSelectFinished {
                    start,
                    current: position,
                    additive,
                });
                true
            }
            Gesture::DrawingFrame { pointer, start, .. } if pointer == input.id => {
                events.push(GestureEvent::FrameDrawFinished { start, current: position });
                true
            }
            Gesture::Connecting { pointer, from, .. } if pointer == input.id => {
                events.push(GestureEvent::ConnectReleased { from, position });
                true
            }
            Gesture::PinchZooming { pointers }
                if pointers.iter().any(|(id, _)| *id == input.id) =>
            {
                if let Some(&(id, pos)) = pointers.iter().find(|(id, _)| *id != input.id) {
                    self.gesture = Gesture::Panning { pointer: id, last: pos };
                } else {
                    self.gesture = Gesture::Idle;
                }
                return events;
            }
            _ => false,
        };
        if finished {
            self.gesture = Gesture::Idle;
        }

        // Undecided press released: classify it as a tap.
        if let Some(p) = self.pending.take() {
            if p.pointer != input.id {
                self.pending = Some(p);
            } else if (position - p.start).hypot() <= DRAG_THRESHOLD {
                events.extend(self.classify_tap(p, position, input.time_ms));
            }
        }
        events
    }

    /// Advance deterministic time. Fires pending long presses.
    pub fn tick(&mut self, now_ms: u64) -> Vec<GestureEvent> {
        let Some(p) = self.pending else {
            return Vec::new();
        };
        if now_ms < p.time_ms + LONG_PRESS_MS {
            return Vec::new();
        }
        if let PressTarget::Note(note) = p.target {
            self.pending = None;
            self.consumed_pointer = Some(p.pointer);
            return vec![GestureEvent::LongPressNote { note }];
        }
        Vec::new()
    }

    fn classify_tap(&mut self, p: PendingPress, position: Point, now_ms: u64) -> Vec<GestureEvent> {
        let is_double = self
            .last_tap
            .map(|t| {
                t.target == p.target
                    && now_ms.saturating_sub(t.time_ms) <= DOUBLE_TAP_MS
                    && (position - t.position).hypot() <= DRAG_THRESHOLD
            })
            .unwrap_or(false);

        match p.target {
            PressTarget::Background => {
                if is_double {
                    self.last_tap = None;
                    vec![GestureEvent::DoubleTapBackground { position }]
                } else {
                    self.last_tap = Some(TapRecord {
                        target: p.target,
                        position,
                        time_ms: now_ms,
                    });
                    vec![GestureEvent::TapBackground { position, modifiers: p.modifiers }]
                }
            }
            PressTarget::Note(note) => {
                if is_double {
                    self.last_tap = None;
                    vec![GestureEvent::DoubleTapNote { note }]
                } else {
                    self.last_tap = Some(TapRecord {
                        target: p.target,
                        position,
                        time_ms: now_ms,
                    });
                    vec![GestureEvent::TapNote { note, modifiers: p.modifiers }]
                }
            }
            PressTarget::FrameBorder(frame) => {
                self.last_tap = None;
                vec![GestureEvent::TapFrame { frame }]
            }
            PressTarget::Connection(connection) => {
                self.last_tap = None;
                vec![GestureEvent::TapConnection { connection }]
            }
        }
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn input(id: u64, x: f64, y: f64, t: u64) -> PointerInput {
        PointerInput::new(id, Point::new(x, y), t)
    }

    #[test]
    fn short_movement_is_a_tap() {
        let mut m = GestureMachine::new();
        let note = Uuid::new_v4();
        m.pointer_down(input(1, 100.0, 100.0, 0), HitTarget::Note(note));
        // 10 px of travel stays under the 15 px threshold.
        let ev = m.pointer_move(input(1, 110.0, 100.0, 50));
        assert!(ev.is_empty());
        let ev = m.pointer_up(input(1, 110.0, 100.0, 80));
        assert_eq!(
            ev,
            vec![GestureEvent::TapNote { note, modifiers: Modifiers::default() }]
        );
    }

    #[test]
    fn long_movement_is_a_drag() {
        let mut m = GestureMachine::new();
        let note = Uuid::new_v4();
        m.pointer_down(input(1, 100.0, 100.0, 0), HitTarget::Note(note));
        let ev = m.pointer_move(input(1, 120.0, 100.0, 50));
        assert_eq!(
            ev,
            vec![
                GestureEvent::NoteDragStarted { note },
                GestureEvent::NoteDragMoved { note, delta: Vec2::new(20.0, 0.0) },
            ]
        );
        let ev = m.pointer_up(input(1, 120.0, 100.0, 80));
        assert_eq!(ev, vec![GestureEvent::NoteDragFinished { note }]);
        assert_eq!(*m.gesture(), Gesture::Idle);
    }

    #[test]
    fn two_quick_taps_merge_into_a_double_tap() {
        let mut m = GestureMachine::new();
        let note = Uuid::new_v4();
        m.pointer_down(input(1, 100.0, 100.0, 0), HitTarget::Note(note));
        let ev = m.pointer_up(input(1, 100.0, 100.0, 40));
        assert!(matches!(ev[0], GestureEvent::TapNote { .. }));

        m.pointer_down(input(1, 102.0, 100.0, 200), HitTarget::Note(note));
        let ev = m.pointer_up(input(1, 102.0, 100.0, 240));
        assert_eq!(ev, vec![GestureEvent::DoubleTapNote { note }]);
    }

    #[test]
    fn slow_second_tap_stays_single() {
        let mut m = GestureMachine::new();
        let note = Uuid::new_v4();
        m.pointer_down(input(1, 100.0, 100.0, 0), HitTarget::Note(note));
        m.pointer_up(input(1, 100.0, 100.0, 40));
        m.pointer_down(input(1, 100.0, 100.0, 500), HitTarget::Note(note));
        let ev = m.pointer_up(input(1, 100.0, 100.0, 540));
        assert!(matches!(ev[0], GestureEvent::TapNote { .. }));
    }

    #[test]
    fn long_press_fires_once_and_swallows_the_release() {
        let mut m = GestureMachine::new();
        let note = Uuid::new_v4();
        m.pointer_down(input(1, 100.0, 100.0, 1000), HitTarget::Note(note));
        assert!(m.tick(1400).is_empty());
        let ev = m.tick(1650);
        assert_eq!(ev, vec![GestureEvent::LongPressNote { note }]);
        assert!(m.tick(1700).is_empty());
        assert!(m.pointer_up(input(1, 100.0, 100.0, 1800)).is_empty());
    }

    #[test]
    fn movement_cancels_the_long_press() {
        let mut m = GestureMachine::new();
        let note = Uuid::new_v4();
        m.pointer_down(input(1, 100.0, 100.0, 0), HitTarget::Note(note));
        m.pointer_move(input(1, 130.0, 100.0, 100));
        assert!(m.tick(700).is_empty());
    }

    #[test]
    fn background_press_pans_and_short_release_taps() {
        let mut m = GestureMachine::new();
        m.pointer_down(input(1, 0.0, 0.0, 0), HitTarget::Background);
        assert!(matches!(m.gesture(), Gesture::Panning { .. }));

        let ev = m.pointer_move(input(1, 5.0, 5.0, 30));
        assert_eq!(ev, vec![GestureEvent::Pan { delta: Vec2::new(5.0, 5.0) }]);

        let ev = m.pointer_up(input(1, 5.0, 5.0, 60));
        assert!(matches!(ev[0], GestureEvent::TapBackground { .. }));
    }

    #[test]
    fn far_pan_release_is_not_a_tap() {
        let mut m = GestureMachine::new();
        m.pointer_down(input(1, 0.0, 0.0, 0), HitTarget::Background);
        m.pointer_move(input(1, 200.0, 0.0, 30));
        let ev = m.pointer_up(input(1, 200.0, 0.0, 60));
        assert!(ev.is_empty());
    }

    #[test]
    fn second_pointer_starts_a_pinch_and_third_is_ignored() {
        let mut m = GestureMachine::new();
        m.pointer_down(input(1, 0.0, 0.0, 0), HitTarget::Background);
        m.pointer_down(input(2, 100.0, 0.0, 10), HitTarget::Background);
        assert!(matches!(m.gesture(), Gesture::PinchZooming { .. }));

        // Third pointer changes nothing.
        m.pointer_down(input(3, 500.0, 500.0, 20), HitTarget::Background);
        assert!(matches!(m.gesture(), Gesture::PinchZooming { .. }));

        // Doubling the spread doubles the scale factor.
        let ev = m.pointer_move(input(2, 200.0, 0.0, 30));
        match ev[0] {
            GestureEvent::Pinch { factor, pivot, .. } => {
                assert!((factor - 2.0).abs() < 1e-9);
                assert_eq!(pivot, Point::new(100.0, 0.0));
            }
            other => panic!("expected Pinch, got {other:?}"),
        }

        // Lifting one finger drops back to panning with the survivor.
        m.pointer_up(input(2, 200.0, 0.0, 40));
        assert!(matches!(m.gesture(), Gesture::Panning { pointer: 1, .. }));
    }

    #[test]
    fn box_select_tool_reports_the_final_rect() {
        let mut m = GestureMachine::new();
        m.set_tool(Tool::BoxSelect);
        let shift = PointerInput {
            modifiers: Modifiers { shift: true, ..Default::default() },
            ..input(1, 10.0, 10.0, 0)
        };
        m.pointer_down(shift, HitTarget::Background);
        m.pointer_move(input(1, 200.0, 150.0, 30));
        let ev = m.pointer_up(input(1, 200.0, 150.0, 60));
        assert_eq!(
            ev,
            vec![GestureEvent::BoxSelectFinished {
                start: Point::new(10.0, 10.0),
                current: Point::new(200.0, 150.0),
                additive: true,
            }]
        );
    }

    #[test]
    fn anchor_press_drags_a_connector() {
        let mut m = GestureMachine::new();
        let from = Anchor { note: Uuid::new_v4(), side: crate::entities::Side::Right };
        m.pointer_down(input(1, 50.0, 50.0, 0), HitTarget::NoteAnchor(from));
        let ev = m.pointer_move(input(1, 300.0, 80.0, 30));
        assert_eq!(
            ev,
            vec![GestureEvent::ConnectMoved { from, position: Point::new(300.0, 80.0) }]
        );
        let ev = m.pointer_up(input(1, 300.0, 80.0, 60));
        assert_eq!(
            ev,
            vec![GestureEvent::ConnectReleased { from, position: Point::new(300.0, 80.0) }]
        );
    }
}
