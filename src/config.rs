//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::TtlPolicy;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Redis connection URL; `None` runs the cache on the secondary store only
    pub redis_url: Option<String>,
    /// Prefix applied to every key written to the primary store
    pub redis_key_prefix: String,
    /// Upper bound on every primary-store call
    pub redis_timeout: Duration,
    /// Maximum number of entries held by the in-process secondary store
    pub secondary_max_entries: usize,
    /// TTL selection for the reference and metric domains
    pub ttl_policy: TtlPolicy,
    /// Base URL of the upstream analytics API
    pub origin_base_url: String,
    /// Request timeout for the upstream analytics API
    pub origin_timeout: Duration,
    /// Background sweep interval in seconds, 0 disables the sweep
    pub sweep_interval: u64,
}

/// Reads and parses an environment variable, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REDIS_URL` - Primary store URL (default: unset, secondary only)
    /// - `REDIS_KEY_PREFIX` - Primary key namespace (default: empty)
    /// - `REDIS_TIMEOUT_MS` - Primary call timeout (default: 500)
    /// - `SECONDARY_MAX_ENTRIES` - Secondary store capacity (default: 10000)
    /// - `REFERENCE_TTL` - Brand/model catalog TTL in seconds (default: 86400)
    /// - `CURRENT_DAY_TTL` - Current-day metric TTL in seconds (default: 3600)
    /// - `HISTORICAL_TTL` - Historical metric TTL in seconds (default: 86400)
    /// - `CURRENT_DAY_MARKER` - `data_type` value of the current-day class (default: 当日)
    /// - `ORIGIN_BASE_URL` - Analytics API base URL (default: http://127.0.0.1:5000)
    /// - `ORIGIN_TIMEOUT_SECS` - Analytics API timeout (default: 5)
    /// - `SWEEP_INTERVAL` - Expired-entry sweep in seconds (default: 0, disabled)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let ttl_defaults = defaults.ttl_policy.clone();

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            redis_key_prefix: env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.redis_key_prefix),
            redis_timeout: Duration::from_millis(env_or(
                "REDIS_TIMEOUT_MS",
                defaults.redis_timeout.as_millis() as u64,
            )),
            secondary_max_entries: env_or("SECONDARY_MAX_ENTRIES", defaults.secondary_max_entries),
            ttl_policy: TtlPolicy {
                reference_ttl: env_or("REFERENCE_TTL", ttl_defaults.reference_ttl),
                current_day_ttl: env_or("CURRENT_DAY_TTL", ttl_defaults.current_day_ttl),
                historical_ttl: env_or("HISTORICAL_TTL", ttl_defaults.historical_ttl),
                current_day_marker: env::var("CURRENT_DAY_MARKER")
                    .unwrap_or(ttl_defaults.current_day_marker),
            },
            origin_base_url: env::var("ORIGIN_BASE_URL").unwrap_or(defaults.origin_base_url),
            origin_timeout: Duration::from_secs(env_or(
                "ORIGIN_TIMEOUT_SECS",
                defaults.origin_timeout.as_secs(),
            )),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            redis_url: None,
            redis_key_prefix: String::new(),
            redis_timeout: Duration::from_millis(500),
            secondary_max_entries: 10_000,
            ttl_policy: TtlPolicy::default(),
            origin_base_url: "http://127.0.0.1:5000".to_string(),
            origin_timeout: Duration::from_secs(5),
            sweep_interval: 0,
        }
    }
}
