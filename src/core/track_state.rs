//! Process-wide cache of recent positions per entity (C2).
//!
//! Bounded ring of the 20 most recent `(timestamp, (lat, lon))` samples,
//! keyed by entity id. Feeds [`crate::core::analytics::detect_loitering`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

const MAX_HISTORY: usize = 20;

/// A single cached position sample.
#[derive(Debug, Clone, Copy)]
pub struct PositionSample {
    pub at: Instant,
    pub location: (f64, f64),
}

/// Explicit registry value constructed at startup and passed by reference
/// (no hidden module state — spec.md §9).
#[derive(Default)]
pub struct TrackStateCache {
    positions: Mutex<HashMap<String, Vec<PositionSample>>>,
}

impl TrackStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position sample for `entity_id`, keeping only the most
    /// recent [`MAX_HISTORY`] entries.
    pub fn update_position(&self, entity_id: &str, location: (f64, f64)) {
        let mut positions = self.positions.lock().unwrap();
        let entry = positions.entry(entity_id.to_string()).or_default();
        entry.push(PositionSample {
            at: Instant::now(),
            location,
        });
        let len = entry.len();
        if len > MAX_HISTORY {
            entry.drain(0..len - MAX_HISTORY);
        }
    }

    /// Retrieve the position history for an entity (empty if unknown).
    pub fn positions(&self, entity_id: &str) -> Vec<PositionSample> {
        self.positions
            .lock()
            .unwrap()
            .get(entity_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Clear all cached positions. Exposed for test isolation.
    pub fn clear(&self) {
        self.positions.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_history_at_twenty() {
        let cache = TrackStateCache::new();
        for i in 0..30 {
            cache.update_position("e1", (33.0 + i as f64 * 0.0001, -118.0));
        }
        assert_eq!(cache.positions("e1").len(), MAX_HISTORY);
    }

    #[test]
    fn unknown_entity_returns_empty() {
        let cache = TrackStateCache::new();
        assert!(cache.positions("nope").is_empty());
    }
}
