//! Per-board viewport persistence.
//!
//! The camera for each board is remembered across sessions so reopening a
//! board restores the last view. Storage is behind a trait; hosts plug in
//! whatever backing they have (browser local storage, a file, a test map).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::camera::Camera;

/// Which view of a board the cached camera belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Board,
    Map,
}

/// Cache key: one camera per board per view kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewportKey {
    pub board: Uuid,
    pub view: ViewKind,
}

impl ViewportKey {
    pub fn board_view(board: Uuid) -> Self {
        Self { board, view: ViewKind::Board }
    }
}

/// Errors from viewport cache backends.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cached viewport for this board")]
    NotFound,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// A viewport cache backend.
///
/// A `NotFound` load is the normal first-open case; callers fall back to
/// fit-all framing. Backend failures on store are logged and swallowed by
/// callers; losing a cached camera is never an error worth surfacing.
pub trait ViewportCache {
    fn load(&self, key: &ViewportKey) -> Result<Camera, CacheError>;
    fn store(&mut self, key: &ViewportKey, camera: &Camera) -> Result<(), CacheError>;
}

/// In-memory cache, JSON-encoded like persistent backends so the same
/// serialization path is exercised.
#[derive(Debug, Default)]
pub struct MemoryViewportCache {
    entries: HashMap<ViewportKey, String>,
}

impl MemoryViewportCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewportCache for MemoryViewportCache {
    fn load(&self, key: &ViewportKey) -> Result<Camera, CacheError> {
        let json = self.entries.get(key).ok_or(CacheError::NotFound)?;
        Ok(serde_json::from_str(json)?)
    }

    fn store(&mut self, key: &ViewportKey, camera: &Camera) -> Result<(), CacheError> {
        self.entries.insert(*key, serde_json::to_string(camera)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn store_then_load_roundtrips() {
        let mut cache = MemoryViewportCache::new();
        let key = ViewportKey::board_view(Uuid::new_v4());
        let camera = Camera { offset: Vec2::new(-120.5, 48.0), scale: 1.75 };

        cache.store(&key, &camera).unwrap();
        assert_eq!(cache.load(&key).unwrap(), camera);
    }

    #[test]
    fn awkward_floats_roundtrip_bit_exact() {
        let mut cache = MemoryViewportCache::new();
        let key = ViewportKey::board_view(Uuid::new_v4());
        // Scales from real pinch gestures are never round numbers; the
        // parsed value must equal the stored one to the last bit.
        let camera = Camera {
            offset: Vec2::new(0.1 + 0.2, -1234.567_890_123_456_7),
            scale: 30.0 / 19.0,
        };
        cache.store(&key, &camera).unwrap();
        assert_eq!(cache.load(&key).unwrap(), camera);
    }

    #[test]
    fn missing_entry_is_not_found() {
        let cache = MemoryViewportCache::new();
        let key = ViewportKey::board_view(Uuid::new_v4());
        assert!(matches!(cache.load(&key), Err(CacheError::NotFound)));
    }

    #[test]
    fn views_of_the_same_board_are_independent() {
        let mut cache = MemoryViewportCache::new();
        let board = Uuid::new_v4();
        let board_key = ViewportKey { board, view: ViewKind::Board };
        let map_key = ViewportKey { board, view: ViewKind::Map };

        let camera = Camera { offset: Vec2::new(10.0, 10.0), scale: 2.0 };
        cache.store(&board_key, &camera).unwrap();
        assert!(matches!(cache.load(&map_key), Err(CacheError::NotFound)));
    }
}
