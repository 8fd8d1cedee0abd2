//! Primary Store Contract
//!
//! The shared, possibly remote tier. Implementations report every failure
//! as a `CacheError` value; the tiered cache decides how to degrade.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Shared key-value store with native per-key expiry.
///
/// Values cross this boundary as owned JSON so the store never aliases
/// caller data. Implementations need not enforce a timeout themselves:
/// the tiered cache bounds every call.
#[async_trait]
pub trait PrimaryStore: Send + Sync {
    /// Fetches the payload under `key`, `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes `value` under `key`, expiring after `ttl_seconds`.
    async fn set(&self, key: &str, value: &Value, ttl_seconds: u64) -> Result<()>;

    /// Short backend name used in log fields.
    fn name(&self) -> &'static str {
        "primary"
    }
}
