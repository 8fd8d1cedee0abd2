//! Key & TTL Policy Module
//!
//! Pure functions that turn a domain plus its dimension values into a
//! cache key, and a freshness class into a TTL.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds in a day; default lifetime of reference and historical data.
pub const ONE_DAY_SECS: u64 = 86_400;

/// Seconds in an hour; default lifetime of current-day metrics.
pub const ONE_HOUR_SECS: u64 = 3_600;

/// `data_type` value marking current-day metrics upstream.
pub const CURRENT_DAY_MARKER: &str = "当日";

const SEPARATOR: char = ':';

// == Cache Domain ==
/// Data domains the cache holds, each with its own key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDomain {
    /// Brand and model catalogs per country
    BrandsModels,
    /// Metric trend series
    Trend,
}

impl CacheDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheDomain::BrandsModels => "brands_models",
            CacheDomain::Trend => "trend",
        }
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Cache Key ==
/// Opaque key derived from a domain and its dimension values.
///
/// Layout is `domain:dim1:...:dimN` with `%` and `:` inside each value
/// percent-encoded, so no value can shift a component boundary and the
/// domain prefix is always the first component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key for `domain` from its dimension values, in order.
    pub fn derive(domain: CacheDomain, dimensions: &[&str]) -> Self {
        let mut key = String::from(domain.as_str());
        for dimension in dimensions {
            key.push(SEPARATOR);
            escape_into(&mut key, dimension);
        }
        CacheKey(key)
    }

    /// Key for a country's brand/model catalog.
    pub fn brands_models(country: &str) -> Self {
        Self::derive(CacheDomain::BrandsModels, &[country])
    }

    /// Key for one trend series.
    pub fn trend(country: &str, brand: &str, model: &str, data_type: &str, trend: &str) -> Self {
        Self::derive(CacheDomain::Trend, &[country, brand, model, data_type, trend])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '%' => out.push_str("%25"),
            SEPARATOR => out.push_str("%3A"),
            other => out.push(other),
        }
    }
}

// == Freshness Class ==
/// Update cadence of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessClass {
    /// Updated through the day
    CurrentDay,
    /// Backfilled, stable once written
    Historical,
}

// == TTL Policy ==
/// TTL selection for both domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Brand/model catalog lifetime in seconds
    pub reference_ttl: u64,
    /// Current-day metric lifetime in seconds
    pub current_day_ttl: u64,
    /// Historical metric lifetime in seconds
    pub historical_ttl: u64,
    /// `data_type` value that selects the current-day class
    pub current_day_marker: String,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            reference_ttl: ONE_DAY_SECS,
            current_day_ttl: ONE_HOUR_SECS,
            historical_ttl: ONE_DAY_SECS,
            current_day_marker: CURRENT_DAY_MARKER.to_string(),
        }
    }
}

impl TtlPolicy {
    /// Classifies an upstream `data_type`. Anything but the current-day
    /// marker is historical.
    pub fn freshness(&self, data_type: &str) -> FreshnessClass {
        if data_type == self.current_day_marker {
            FreshnessClass::CurrentDay
        } else {
            FreshnessClass::Historical
        }
    }

    /// TTL for the brand/model catalog.
    pub fn reference_ttl(&self) -> u64 {
        self.reference_ttl
    }

    /// TTL for a trend series of the given `data_type`.
    pub fn trend_ttl(&self, data_type: &str) -> u64 {
        match self.freshness(data_type) {
            FreshnessClass::CurrentDay => self.current_day_ttl,
            FreshnessClass::Historical => self.historical_ttl,
        }
    }
}
