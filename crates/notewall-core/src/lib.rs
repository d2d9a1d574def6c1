//! Notewall Core Library
//!
//! Platform-agnostic interaction engine for the Notewall board canvas: the
//! pan/zoom viewport, gesture classification, selection, frame grouping,
//! and orthogonal connector routing. Hosts own rendering, persistence, and
//! the event loop; this crate owns the geometry and the state machines.

pub mod animate;
pub mod camera;
pub mod containment;
pub mod engine;
pub mod entities;
pub mod gesture;
pub mod hit;
pub mod router;
pub mod selection;
pub mod viewport_cache;

pub use animate::{TransformAnimation, TRANSITION_MS};
pub use camera::{Camera, MAX_SCALE, MIN_SCALE};
pub use engine::{BoardCanvas, HostRequest};
pub use entities::{
    Anchor, ArrowKind, Board, Connection, ConnectionId, Frame, FrameCorner, FrameId, Note,
    NoteId, NoteKind, Rgba, Side, StoreProposal,
};
pub use gesture::{Gesture, GestureEvent, GestureMachine, Modifiers, PointerInput, Tool};
pub use hit::{hit_test, HitTarget};
pub use router::{rounded_path, route, AnchorPoint};
pub use selection::{Primary, Selection};
pub use viewport_cache::{CacheError, MemoryViewportCache, ViewKind, ViewportCache, ViewportKey};
