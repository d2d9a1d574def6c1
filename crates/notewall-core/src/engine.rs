//! The board canvas engine.
//!
//! Owns the camera, gesture machine, selection, and a snapshot of the open
//! board, and turns pointer input into selection changes, live entity moves,
//! and whole-entity mutation proposals for the external store. All host
//! communication is pull-based: the host feeds pointer events and ticks,
//! then drains proposals and requests.

use std::collections::{HashMap, HashSet};

use kurbo::{BezPath, Point, Rect, Size};
use uuid::Uuid;

use crate::animate::{TransformAnimation, TRANSITION_MS};
use crate::camera::Camera;
use crate::containment;
use crate::entities::{
    Anchor, Board, Connection, ConnectionId, Frame, FrameId, Note, NoteId, NoteKind, Rgba,
    StoreProposal,
};
use crate::gesture::{Gesture, GestureEvent, GestureMachine, PointerInput, Tool};
use crate::hit::{self, hit_test};
use crate::router::{route, rounded_path, AnchorPoint, CORNER_RADIUS};
use crate::selection::{Primary, Selection};
use crate::viewport_cache::{ViewportCache, ViewportKey};

/// Default title for frames drawn on the canvas.
const NEW_FRAME_TITLE: &str = "Frame";

/// Something the engine needs its host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Open the note editor surface for this note.
    OpenEditor(NoteId),
    /// The viewport settled after a pan/zoom; persist it.
    PersistViewport,
}

/// Live multi-note drag bookkeeping.
#[derive(Debug, Default)]
struct DragState {
    ids: Vec<NoteId>,
}

/// The canvas interaction engine for one open board.
pub struct BoardCanvas {
    board_id: Uuid,
    board: Board,
    camera: Camera,
    viewport: Size,
    machine: GestureMachine,
    selection: Selection,
    frame_filter: HashSet<FrameId>,
    drag: DragState,
    /// Snap target while a connector is being dragged, for overlay feedback.
    connect_snap: Option<Anchor>,
    animation: Option<(TransformAnimation, u64)>,
    routes: Option<HashMap<ConnectionId, Vec<Point>>>,
    viewport_dirty: bool,
    proposals: Vec<StoreProposal>,
    requests: Vec<HostRequest>,
}

impl BoardCanvas {
    pub fn new(board_id: Uuid, board: Board, viewport: Size) -> Self {
        Self {
            board_id,
            board,
            camera: Camera::new(),
            viewport,
            machine: GestureMachine::new(),
            selection: Selection::new(),
            frame_filter: HashSet::new(),
            drag: DragState::default(),
            connect_snap: None,
            animation: None,
            routes: None,
            viewport_dirty: false,
            proposals: Vec::new(),
            requests: Vec::new(),
        }
    }

    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn gesture(&self) -> &Gesture {
        self.machine.gesture()
    }

    pub fn tool(&self) -> Tool {
        self.machine.tool()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.machine.set_tool(tool);
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Current connector snap target, while a connector drag is in flight.
    pub fn connect_snap(&self) -> Option<Anchor> {
        self.connect_snap
    }

    /// Mutations proposed since the last drain, in order.
    pub fn take_proposals(&mut self) -> Vec<StoreProposal> {
        std::mem::take(&mut self.proposals)
    }

    /// Host requests since the last drain, in order.
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Apply a store-accepted mutation to the local snapshot.
    pub fn apply(&mut self, proposal: StoreProposal) {
        self.board.apply(proposal);
        self.routes = None;
    }

    // ----- viewport -----

    /// Seed the camera from the cache, or frame the whole board on a miss.
    pub fn restore_viewport(&mut self, cache: &dyn ViewportCache) {
        match cache.load(&ViewportKey::board_view(self.board_id)) {
            Ok(camera) => self.camera = camera,
            Err(err) => {
                log::debug!("no cached viewport ({err}), framing all content");
                if let Some(bounds) = self.board.bounds() {
                    self.camera.fit_to_bounds(bounds, self.viewport);
                }
            }
        }
    }

    /// Write the current camera to the cache. Failures are logged, never
    /// surfaced; a lost camera just means fit-all on next open.
    pub fn persist_viewport(&self, cache: &mut dyn ViewportCache) {
        let key = ViewportKey::board_view(self.board_id);
        if let Err(err) = cache.store(&key, &self.camera) {
            log::warn!("failed to persist viewport for board {}: {err}", self.board_id);
        }
    }

    /// Animate the camera to frame all content. No-op on an empty board.
    pub fn fit_all(&mut self, now_ms: u64) {
        let Some(bounds) = self.board.bounds() else {
            return;
        };
        let mut target = self.camera;
        target.fit_to_bounds(bounds, self.viewport);
        // Starting a new animation supersedes any in-flight one.
        self.animation = Some((
            TransformAnimation::new(self.camera, target, TRANSITION_MS),
            now_ms,
        ));
    }

    /// Zoom about a screen-space pivot, e.g. from a scroll wheel.
    pub fn zoom_at(&mut self, pivot: Point, factor: f64) {
        self.camera.zoom_at(pivot, factor);
        self.viewport_dirty = true;
    }

    /// Jump to an absolute zoom level about a pivot, e.g. from a zoom
    /// slider or a "100%" button.
    pub fn set_zoom(&mut self, pivot: Point, scale: f64) {
        self.camera.set_scale_at(pivot, scale);
        self.viewport_dirty = true;
    }

    // ----- frame filter -----

    /// Toggle a frame in the content filter. An empty filter shows all.
    pub fn toggle_frame_filter(&mut self, frame: FrameId) {
        if !self.frame_filter.remove(&frame) {
            self.frame_filter.insert(frame);
        }
    }

    pub fn clear_frame_filter(&mut self) {
        self.frame_filter.clear();
    }

    pub fn frame_filter(&self) -> &HashSet<FrameId> {
        &self.frame_filter
    }

    /// Note-to-frame membership, derived from current geometry.
    pub fn frame_membership(&self) -> HashMap<NoteId, Vec<FrameId>> {
        containment::membership(&self.board)
    }

    /// Connections visible under the current frame filter.
    pub fn visible_connections(&self) -> Vec<ConnectionId> {
        let membership = containment::membership(&self.board);
        self.board
            .connections
            .values()
            .filter(|c| containment::connection_visible(c, &membership, &self.frame_filter))
            .map(|c| c.id)
            .collect()
    }

    // ----- routing -----

    /// Routed polylines for every connection, memoized until geometry moves.
    pub fn connector_routes(&mut self) -> &HashMap<ConnectionId, Vec<Point>> {
        if self.routes.is_none() {
            let mut routes = HashMap::new();
            for conn in self.board.connections.values() {
                let (Some(from), Some(to)) = (
                    self.board.notes.get(&conn.from.note),
                    self.board.notes.get(&conn.to.note),
                ) else {
                    continue;
                };
                routes.insert(
                    conn.id,
                    route(
                        AnchorPoint::new(from.anchor_point(conn.from.side), conn.from.side),
                        AnchorPoint::new(to.anchor_point(conn.to.side), conn.to.side),
                    ),
                );
            }
            self.routes = Some(routes);
        }
        self.routes.as_ref().unwrap()
    }

    /// Rounded render path for one connection.
    pub fn connector_path(&mut self, id: ConnectionId) -> Option<BezPath> {
        self.connector_routes()
            .get(&id)
            .map(|pts| rounded_path(pts, CORNER_RADIUS))
    }

    // ----- input -----

    pub fn pointer_down(&mut self, input: PointerInput) {
        let world = self.camera.screen_to_world(input.position);
        let target = hit_test(&self.board, &self.selection, world);
        let events = self.machine.pointer_down(input, target);
        self.process(events);
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let events = self.machine.pointer_move(input);
        self.process(events);
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        let events = self.machine.pointer_up(input);
        self.process(events);
        if self.viewport_dirty && matches!(self.machine.gesture(), Gesture::Idle) {
            self.viewport_dirty = false;
            self.requests.push(HostRequest::PersistViewport);
        }
    }

    /// Advance time: fires long presses, steps the camera animation, and
    /// flushes settled viewport changes (wheel zooms have no pointer-up).
    pub fn tick(&mut self, now_ms: u64) {
        let events = self.machine.tick(now_ms);
        self.process(events);

        if let Some((anim, start)) = self.animation {
            let elapsed = now_ms.saturating_sub(start);
            self.camera = anim.sample(elapsed);
            if anim.is_finished(elapsed) {
                self.animation = None;
                self.viewport_dirty = true;
            }
        }

        if self.viewport_dirty
            && self.animation.is_none()
            && matches!(self.machine.gesture(), Gesture::Idle)
        {
            self.viewport_dirty = false;
            self.requests.push(HostRequest::PersistViewport);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    fn process(&mut self, events: Vec<GestureEvent>) {
        for event in events {
            self.handle(event);
        }
    }

    fn handle(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::Pan { delta } => {
                self.camera.pan(delta);
                self.viewport_dirty = true;
            }
            GestureEvent::Pinch { pivot, factor, pan } => {
                self.camera.pan(pan);
                self.camera.zoom_at(pivot, factor);
                self.viewport_dirty = true;
            }
            GestureEvent::TapBackground { position: _, modifiers: _ } => {
                self.selection.clear();
            }
            GestureEvent::DoubleTapBackground { position } => {
                let world = self.camera.screen_to_world(position);
                self.create_note_at(world);
            }
            GestureEvent::TapNote { note, modifiers } => {
                if modifiers.shift {
                    self.selection.toggle_note(note);
                } else {
                    self.selection.select_note(note);
                }
            }
            GestureEvent::DoubleTapNote { note } => {
                self.selection.select_note(note);
                self.requests.push(HostRequest::OpenEditor(note));
            }
            GestureEvent::LongPressNote { note } => {
                self.selection.select_note(note);
                self.requests.push(HostRequest::OpenEditor(note));
            }
            GestureEvent::TapFrame { frame } => {
                self.selection.select_frame(frame);
            }
            GestureEvent::TapConnection { connection } => {
                self.tap_connection(connection);
            }
            GestureEvent::NoteDragStarted { note } => {
                if !self.selection.contains_note(note) {
                    self.selection.select_note(note);
                }
                self.board.bring_to_front(note);
                self.drag.ids = self.selection.notes().iter().copied().collect();
            }
            GestureEvent::NoteDragMoved { note: _, delta } => {
                let world_delta = delta / self.camera.scale;
                for id in &self.drag.ids {
                    if let Some(n) = self.board.notes.get_mut(id) {
                        n.position += world_delta;
                    }
                }
                self.routes = None;
            }
            GestureEvent::NoteDragFinished { note: _ } => {
                for id in std::mem::take(&mut self.drag.ids) {
                    if let Some(n) = self.board.notes.get(&id) {
                        self.proposals.push(StoreProposal::UpsertNote(n.clone()));
                    }
                }
            }
            GestureEvent::FrameDragStarted { frame } => {
                self.selection.select_frame(frame);
            }
            GestureEvent::FrameDragMoved { frame, delta } => {
                let world_delta = delta / self.camera.scale;
                if let Some(f) = self.board.frames.get_mut(&frame) {
                    f.rect = f.rect + world_delta;
                }
            }
            GestureEvent::FrameDragFinished { frame } => {
                if let Some(f) = self.board.frames.get(&frame) {
                    self.proposals.push(StoreProposal::UpsertFrame(f.clone()));
                }
            }
            GestureEvent::FrameResizeMoved { frame, corner, position } => {
                let world = self.camera.screen_to_world(position);
                if let Some(f) = self.board.frames.get_mut(&frame) {
                    f.resize_corner(corner, world);
                }
            }
            GestureEvent::FrameResizeFinished { frame } => {
                if let Some(f) = self.board.frames.get(&frame) {
                    self.proposals.push(StoreProposal::UpsertFrame(f.clone()));
                }
            }
            GestureEvent::ImageResizeMoved { note, corner, position } => {
                let world = self.camera.screen_to_world(position);
                if let Some(n) = self.board.notes.get_mut(&note) {
                    n.resize_image_corner(corner, world);
                }
                self.routes = None;
            }
            GestureEvent::ImageResizeFinished { note } => {
                if let Some(n) = self.board.notes.get(&note) {
                    self.proposals.push(StoreProposal::UpsertNote(n.clone()));
                }
            }
            GestureEvent::BoxSelectChanged { .. } | GestureEvent::FrameDrawChanged { .. } => {
                // Overlays render straight from the gesture state.
            }
            GestureEvent::BoxSelectFinished { start, current, additive } => {
                let rect = Rect::from_points(
                    self.camera.screen_to_world(start),
                    self.camera.screen_to_world(current),
                );
                self.selection.box_select(&self.board, rect, additive);
                self.machine.set_tool(Tool::Select);
            }
            GestureEvent::FrameDrawFinished { start, current } => {
                let rect = Rect::from_points(
                    self.camera.screen_to_world(start),
                    self.camera.screen_to_world(current),
                );
                let frame = Frame::new(rect, NEW_FRAME_TITLE, Rgba::default());
                let id = frame.id;
                self.board.add_frame(frame.clone());
                self.proposals.push(StoreProposal::UpsertFrame(frame));
                self.selection.select_frame(id);
                self.machine.set_tool(Tool::Select);
            }
            GestureEvent::ConnectMoved { from, position } => {
                let world = self.camera.screen_to_world(position);
                self.connect_snap = hit::nearest_anchor(&self.board, world, from.note);
            }
            GestureEvent::ConnectReleased { from, position } => {
                let world = self.camera.screen_to_world(position);
                let target = hit::nearest_anchor(&self.board, world, from.note);
                self.connect_snap = None;
                if let Some(to) = target {
                    // Self-connections are rejected by construction.
                    if let Some(conn) = Connection::new(from, to) {
                        log::debug!("connecting {} -> {}", from.note, to.note);
                        self.board.add_connection(conn.clone());
                        self.proposals.push(StoreProposal::UpsertConnection(conn));
                        self.routes = None;
                    }
                }
            }
        }
    }

    /// Tap on a connection: first tap selects; tapping the selected one
    /// cycles the arrowhead, and cycling past the last state deletes it.
    fn tap_connection(&mut self, id: ConnectionId) {
        if self.selection.primary() != Some(Primary::Connection(id)) {
            self.selection.select_connection(id);
            return;
        }
        let Some(conn) = self.board.connections.get_mut(&id) else {
            return;
        };
        match conn.arrow.next() {
            Some(next) => {
                conn.arrow = next;
                let conn = conn.clone();
                self.proposals.push(StoreProposal::UpsertConnection(conn));
            }
            None => {
                self.board.remove_connection(id);
                self.proposals.push(StoreProposal::RemoveConnection(id));
                self.selection.drop_primary();
                self.routes = None;
            }
        }
    }

    /// Delete the primarily selected frame or connection, e.g. from a host
    /// delete-key binding. Notes are owned by the editor surface and are
    /// never deleted from the canvas.
    pub fn delete_selected(&mut self) {
        match self.selection.primary() {
            Some(Primary::Frame(id)) => {
                if self.board.remove_frame(id).is_some() {
                    self.proposals.push(StoreProposal::RemoveFrame(id));
                    self.frame_filter.remove(&id);
                    self.selection.drop_primary();
                }
            }
            Some(Primary::Connection(id)) => {
                if self.board.remove_connection(id).is_some() {
                    self.proposals.push(StoreProposal::RemoveConnection(id));
                    self.selection.drop_primary();
                    self.routes = None;
                }
            }
            _ => {}
        }
    }

    /// Create a standard note at a world point and select it.
    fn create_note_at(&mut self, world: Point) {
        let note = Note::new(world, NoteKind::Standard);
        let id = note.id;
        self.board.add_note(note.clone());
        self.proposals.push(StoreProposal::UpsertNote(note));
        self.selection.select_note(id);
    }
}
