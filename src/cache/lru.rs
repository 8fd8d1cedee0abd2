//! Recency Tracker Module
//!
//! Orders secondary-store keys by last access so the store can shed the
//! least recently used entry once it reaches its capacity.

use std::collections::{BTreeMap, HashMap};

// == Recency Tracker ==
/// Tracks access order with a monotonic tick per touch.
///
/// `by_tick` is ordered oldest-first; `ticks` maps each key back to its
/// current position so touches and removals stay logarithmic.
#[derive(Debug, Default)]
pub struct RecencyTracker {
    next_tick: u64,
    by_tick: BTreeMap<u64, String>,
    ticks: HashMap<String, u64>,
}

impl RecencyTracker {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if new.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        if let Some(old) = self.ticks.insert(key.to_string(), tick) {
            self.by_tick.remove(&old);
        }
        self.by_tick.insert(tick, key.to_string());
    }

    // == Remove ==
    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and forgets the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }
}
