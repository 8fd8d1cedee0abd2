//! Local Store Module
//!
//! Process-local secondary store: a HashMap of JSON payloads with expiry
//! computed from the write timestamp, lazy eviction on read and a recency
//! cap on the number of entries.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, RecencyTracker, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

/// A full store sweeps expired entries once per `max_entries / 8` inserts.
const SWEEP_STRIDE_DIVISOR: usize = 8;

// == Local Store ==
/// Secondary store with TTL expiry and a bounded entry count.
#[derive(Debug)]
pub struct LocalStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Access order for capacity eviction
    recency: RecencyTracker,
    /// Secondary-tier statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Inserts at capacity since expired entries were last swept
    full_inserts_since_sweep: usize,
}

impl LocalStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            full_inserts_since_sweep: 0,
        }
    }

    // == Set ==
    /// Stores a copy of `value` under `key`, stamped with the current time.
    ///
    /// Overwriting a key replaces both the payload and its `stored_at`.
    /// At capacity, expired entries are swept once every
    /// `max_entries / SWEEP_STRIDE_DIVISOR` such inserts; otherwise, or
    /// when the sweep frees nothing, the least recently used entry is
    /// evicted.
    pub fn set(&mut self, key: &str, value: &Value, ttl_seconds: u64) -> Result<()> {
        let size = serde_json::to_vec(value)?.len();
        if size > MAX_VALUE_SIZE {
            self.stats.record_write_failure();
            return Err(CacheError::ResourceExhausted(format!(
                "payload of {} bytes exceeds limit of {} bytes",
                size, MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room()?;
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value.clone(), ttl_seconds));
        self.recency.touch(key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns a copy of the payload if present and younger than the
    /// effective TTL. An expired entry is removed as a side effect.
    pub fn get(&mut self, key: &str, ttl_seconds: u64) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_for(ttl_seconds),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            debug!(key, "secondary entry expired");
            return None;
        }

        self.stats.record_secondary_hit();
        self.recency.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Cleanup Expired ==
    /// Removes every entry past its write-time TTL.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove(key);
            self.stats.record_expiration();
        }

        expired_keys.len()
    }

    /// Returns current secondary-tier statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.recency.remove(key);
        self.stats.set_total_entries(self.entries.len());
    }

    fn sweep_stride(&self) -> usize {
        (self.max_entries / SWEEP_STRIDE_DIVISOR).max(1)
    }

    fn make_room(&mut self) -> Result<()> {
        self.full_inserts_since_sweep += 1;
        if self.full_inserts_since_sweep >= self.sweep_stride() {
            self.full_inserts_since_sweep = 0;
            if self.cleanup_expired() > 0 {
                return Ok(());
            }
        }

        match self.recency.evict_oldest() {
            Some(evicted) => {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                self.stats.set_total_entries(self.entries.len());
                debug!(key = %evicted, "secondary entry evicted at capacity");
                Ok(())
            }
            None => {
                self.stats.record_write_failure();
                Err(CacheError::ResourceExhausted(format!(
                    "secondary store capacity is {}",
                    self.max_entries
                )))
            }
        }
    }
}
