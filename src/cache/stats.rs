//! Cache Statistics Module
//!
//! Per-tier counters: where reads were served from, how often the primary
//! store failed, and how the secondary store shed entries.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads served by the primary store
    pub primary_hits: u64,
    /// Reads served by the secondary store
    pub secondary_hits: u64,
    /// Reads that found nothing in either tier
    pub misses: u64,
    /// Primary-store calls that failed or timed out
    pub primary_errors: u64,
    /// Secondary-store writes that were refused
    pub secondary_write_failures: u64,
    /// Secondary entries dropped because their TTL had elapsed
    pub expirations: u64,
    /// Secondary entries dropped to stay under capacity
    pub evictions: u64,
    /// Current number of entries in the secondary store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the combined hit rate over both tiers.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.primary_hits + self.secondary_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn record_secondary_hit(&mut self) {
        self.secondary_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.secondary_write_failures += 1;
    }

    /// Updates the secondary entry count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
