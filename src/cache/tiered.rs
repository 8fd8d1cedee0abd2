//! Tiered Cache Module
//!
//! Orchestrates reads and writes across the primary store and the local
//! secondary store. Primary failures are logged and demote the request to
//! the secondary tier; nothing here returns an error to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::cache::{CacheKey, CacheStats, LocalStore, PrimaryStore};
use crate::error::{CacheError, Result};

// == Tier ==
/// Which tier answered a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Primary,
    Secondary,
}

// == Lookup ==
/// Outcome of a tiered read.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// The cached payload, if any tier had a fresh one
    pub value: Option<Value>,
    /// Tier that served `value`
    pub tier: Option<Tier>,
    /// True when a configured primary store failed during this read
    pub degraded: bool,
}

impl Lookup {
    fn miss(degraded: bool) -> Self {
        Self {
            value: None,
            tier: None,
            degraded,
        }
    }
}

// == Tiered Cache ==
/// Primary store (optional) in front of a process-local secondary store.
pub struct TieredCache {
    /// Shared store; `None` runs in degraded mode for the process lifetime
    primary: Option<Arc<dyn PrimaryStore>>,
    /// Bound on every primary call
    primary_timeout: Duration,
    /// Process-local fallback; write lock on reads for lazy eviction
    secondary: RwLock<LocalStore>,
    primary_hits: AtomicU64,
    primary_errors: AtomicU64,
}

impl TieredCache {
    // == Constructor ==
    /// Creates a cache over `primary` with a secondary store of
    /// `secondary_max_entries` entries.
    pub fn new(
        primary: Option<Arc<dyn PrimaryStore>>,
        primary_timeout: Duration,
        secondary_max_entries: usize,
    ) -> Self {
        Self {
            primary,
            primary_timeout,
            secondary: RwLock::new(LocalStore::new(secondary_max_entries)),
            primary_hits: AtomicU64::new(0),
            primary_errors: AtomicU64::new(0),
        }
    }

    /// Creates a cache with no primary store.
    pub fn secondary_only(secondary_max_entries: usize) -> Self {
        Self::new(None, Duration::ZERO, secondary_max_entries)
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    // == Lookup ==
    /// Reads `key`, reporting which tier answered and whether the primary
    /// store failed along the way.
    ///
    /// A primary hit is returned as is; its expiry is the store's own.
    /// Otherwise the secondary store is consulted with `ttl_seconds`.
    pub async fn lookup(&self, key: &CacheKey, ttl_seconds: u64) -> Lookup {
        let mut degraded = false;

        if let Some(primary) = &self.primary {
            match self.primary_get(primary.as_ref(), key).await {
                Ok(Some(value)) => {
                    self.primary_hits.fetch_add(1, Ordering::Relaxed);
                    debug!(%key, store = primary.name(), "primary hit");
                    return Lookup {
                        value: Some(value),
                        tier: Some(Tier::Primary),
                        degraded: false,
                    };
                }
                Ok(None) => {}
                Err(err) => {
                    degraded = true;
                    self.primary_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(%key, store = primary.name(), error = %err, "primary get failed, using secondary");
                }
            }
        }

        let value = self.secondary.write().await.get(key.as_str(), ttl_seconds);
        match value {
            Some(value) => {
                debug!(%key, "secondary hit");
                Lookup {
                    value: Some(value),
                    tier: Some(Tier::Secondary),
                    degraded,
                }
            }
            None => {
                debug!(%key, "cache miss");
                Lookup::miss(degraded)
            }
        }
    }

    // == Get Cached ==
    /// Returns the cached payload for `key`, or `None` on a miss.
    pub async fn get_cached(&self, key: &CacheKey, ttl_seconds: u64) -> Option<Value> {
        self.lookup(key, ttl_seconds).await.value
    }

    // == Set Cached ==
    /// Writes `value` to the primary store (if any) and always to the
    /// secondary store.
    ///
    /// Returns true if either write succeeded.
    pub async fn set_cached(&self, key: &CacheKey, value: &Value, ttl_seconds: u64) -> bool {
        let mut primary_ok = false;

        if let Some(primary) = &self.primary {
            match self.primary_set(primary.as_ref(), key, value, ttl_seconds).await {
                Ok(()) => primary_ok = true,
                Err(err) => {
                    self.primary_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(%key, store = primary.name(), error = %err, "primary set failed");
                }
            }
        }

        let secondary_ok = match self
            .secondary
            .write()
            .await
            .set(key.as_str(), value, ttl_seconds)
        {
            Ok(()) => true,
            Err(err) => {
                error!(%key, error = %err, "secondary set failed");
                false
            }
        };

        debug!(%key, ttl_seconds, primary_ok, secondary_ok, "cache set");
        primary_ok || secondary_ok
    }

    // == Cleanup Expired ==
    /// Drops expired secondary entries; returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.secondary.write().await.cleanup_expired()
    }

    // == Stats ==
    /// Returns a snapshot of both tiers' counters.
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.secondary.read().await.stats();
        stats.primary_hits = self.primary_hits.load(Ordering::Relaxed);
        stats.primary_errors = self.primary_errors.load(Ordering::Relaxed);
        stats
    }

    async fn primary_get(&self, primary: &dyn PrimaryStore, key: &CacheKey) -> Result<Option<Value>> {
        tokio::time::timeout(self.primary_timeout, primary.get(key.as_str()))
            .await
            .map_err(|_| self.timed_out("get"))?
    }

    async fn primary_set(
        &self,
        primary: &dyn PrimaryStore,
        key: &CacheKey,
        value: &Value,
        ttl_seconds: u64,
    ) -> Result<()> {
        tokio::time::timeout(
            self.primary_timeout,
            primary.set(key.as_str(), value, ttl_seconds),
        )
        .await
        .map_err(|_| self.timed_out("set"))?
    }

    fn timed_out(&self, op: &str) -> CacheError {
        CacheError::StoreUnavailable(format!(
            "{} timed out after {}ms",
            op,
            self.primary_timeout.as_millis()
        ))
    }
}
