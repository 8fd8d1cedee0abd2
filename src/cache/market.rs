//! Market Cache Module
//!
//! Domain entry points: brand/model catalogs and trend series, each keyed
//! and timed by the policy before reaching the tiered cache.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::{CacheKey, CacheStats, Lookup, TieredCache, TtlPolicy};

/// Caller-facing cache for market data.
///
/// Cheap to clone; clones share the same tiers.
#[derive(Clone)]
pub struct MarketCache {
    tiers: Arc<TieredCache>,
    policy: TtlPolicy,
}

impl MarketCache {
    pub fn new(tiers: Arc<TieredCache>, policy: TtlPolicy) -> Self {
        Self { tiers, policy }
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    pub fn tiers(&self) -> &Arc<TieredCache> {
        &self.tiers
    }

    // == Reference Data ==
    pub async fn get_brands_models_cache(&self, country: &str) -> Option<Value> {
        self.lookup_brands_models(country).await.value
    }

    /// Like [`get_brands_models_cache`](Self::get_brands_models_cache) but
    /// reports the serving tier and degraded state.
    pub async fn lookup_brands_models(&self, country: &str) -> Lookup {
        let key = CacheKey::brands_models(country);
        self.tiers.lookup(&key, self.policy.reference_ttl()).await
    }

    pub async fn set_brands_models_cache(&self, country: &str, payload: &Value) -> bool {
        let key = CacheKey::brands_models(country);
        self.tiers
            .set_cached(&key, payload, self.policy.reference_ttl())
            .await
    }

    // == Metric Data ==
    pub async fn get_trend_cache(
        &self,
        country: &str,
        brand: &str,
        model: &str,
        data_type: &str,
        trend: &str,
    ) -> Option<Value> {
        self.lookup_trend(country, brand, model, data_type, trend)
            .await
            .value
    }

    pub async fn lookup_trend(
        &self,
        country: &str,
        brand: &str,
        model: &str,
        data_type: &str,
        trend: &str,
    ) -> Lookup {
        let key = CacheKey::trend(country, brand, model, data_type, trend);
        self.tiers
            .lookup(&key, self.policy.trend_ttl(data_type))
            .await
    }

    pub async fn set_trend_cache(
        &self,
        country: &str,
        brand: &str,
        model: &str,
        data_type: &str,
        trend: &str,
        payload: &Value,
    ) -> bool {
        let key = CacheKey::trend(country, brand, model, data_type, trend);
        self.tiers
            .set_cached(&key, payload, self.policy.trend_ttl(data_type))
            .await
    }

    pub async fn stats(&self) -> CacheStats {
        self.tiers.stats().await
    }
}
