//! Cache Entry Module
//!
//! Defines the secondary-store entry: an owned JSON payload stamped with
//! the time and TTL it was written with.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// Represents a single secondary-store entry with value and write metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload, owned by the cache
    pub value: Value,
    /// Write timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// TTL supplied at write time, in seconds
    pub ttl_seconds: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: Value, ttl_seconds: u64) -> Self {
        Self {
            value,
            stored_at: current_timestamp_ms(),
            ttl_seconds,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was written.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.stored_at)
    }

    // == Effective TTL ==
    /// TTL that applies to a read with `read_ttl`.
    ///
    /// A read-time TTL can shorten the lifetime of an entry but never
    /// extend it past the TTL it was written with.
    pub fn effective_ttl(&self, read_ttl: u64) -> u64 {
        self.ttl_seconds.min(read_ttl)
    }

    // == Is Expired ==
    /// Checks if the entry has expired for a read with `read_ttl`.
    ///
    /// Boundary condition: expired once `now - stored_at >= ttl`, so a
    /// zero TTL is expired immediately.
    pub fn is_expired_for(&self, read_ttl: u64) -> bool {
        self.age_ms() >= self.effective_ttl(read_ttl).saturating_mul(1000)
    }

    /// Checks expiry against the write-time TTL alone.
    pub fn is_expired(&self) -> bool {
        self.is_expired_for(self.ttl_seconds)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0, which makes every entry look
/// fresh for at most its TTL once the clock recovers.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
