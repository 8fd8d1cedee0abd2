//! Cache Module
//!
//! Tiered caching for market data: a shared primary store with native
//! expiry in front of a bounded in-process secondary store, plus the key
//! and TTL policy for each data domain.

mod entry;
mod lru;
mod market;
mod policy;
pub(crate) mod primary;
mod redis_store;
mod stats;
mod store;
mod tiered;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::RecencyTracker;
pub use market::MarketCache;
pub use policy::{
    CacheDomain, CacheKey, FreshnessClass, TtlPolicy, CURRENT_DAY_MARKER, ONE_DAY_SECS,
    ONE_HOUR_SECS,
};
pub use primary::PrimaryStore;
pub use redis_store::RedisStore;
pub use stats::CacheStats;
pub use store::LocalStore;
pub use tiered::{Lookup, TieredCache, Tier};

// == Public Constants ==
/// Maximum serialized payload size accepted by the secondary store
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
