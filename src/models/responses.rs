//! Response DTOs for the market data API
//!
//! Payload shapes shared by the upstream API, the cache and the gateway.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cache::CacheStats;

/// Brand/model catalog for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandsModels {
    pub brands: Vec<String>,
    /// Models per brand
    pub models: BTreeMap<String, Vec<String>>,
}

impl Default for BrandsModels {
    /// Catalog served when upstream cannot be reached.
    fn default() -> Self {
        let mut models = BTreeMap::new();
        models.insert(
            "Zeekr".to_string(),
            vec!["7X".to_string(), "001".to_string(), "全车型".to_string()],
        );
        models.insert(
            "BYD".to_string(),
            vec!["Han".to_string(), "Song".to_string(), "全车型".to_string()],
        );
        Self {
            brands: vec!["Zeekr".to_string(), "BYD".to_string()],
            models,
        }
    }
}

/// Upstream catalog reply; either field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandsModelsReply {
    #[serde(default)]
    pub brands: Option<Vec<String>>,
    #[serde(default)]
    pub models: Option<BTreeMap<String, Vec<String>>>,
}

impl BrandsModelsReply {
    /// Fills missing fields from the default catalog.
    pub fn into_catalog(self) -> BrandsModels {
        let defaults = BrandsModels::default();
        BrandsModels {
            brands: self.brands.unwrap_or(defaults.brands),
            models: self.models.unwrap_or(defaults.models),
        }
    }
}

/// One trend series, as found under `data` in the upstream reply.
///
/// Kept as raw JSON: points, nulls and any extra fields pass through the
/// cache and the gateway exactly as upstream sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendData(pub Value);

impl TrendData {
    /// Single-point series carrying an error label for the chart.
    pub fn placeholder(label: &str) -> Self {
        Self(json!({"x": [label], "y": [0]}))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Upstream trend reply envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendReply {
    pub data: TrendData,
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Combined hit rate over both tiers
    pub hit_rate: f64,
    /// Whether a primary store is configured
    pub primary_configured: bool,
}

impl StatsResponse {
    pub fn new(stats: CacheStats, primary_configured: bool) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            primary_configured,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// "configured" or "absent"
    pub primary_store: String,
    /// RFC 3339 timestamp of the check
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a healthy response; the cache never fails health on a
    /// missing primary, it only reports it.
    pub fn healthy(primary_configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            primary_store: if primary_configured {
                "configured"
            } else {
                "absent"
            }
            .to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
