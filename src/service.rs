//! Market Data Service
//!
//! Cache-aside reads over the origin API: answer from the tiered cache
//! when possible, otherwise fetch, cache and return. Origin failures
//! become default payloads, never errors.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{Lookup, MarketCache, Tier};
use crate::error::{CacheError, OriginError};
use crate::models::{BrandsModels, TrendData, TrendQuery};
use crate::origin::OriginApi;

/// Label shown on the chart when upstream answers with an error status.
pub const REQUEST_ERROR_LABEL: &str = "请求错误";

/// Label shown on the chart when upstream cannot be reached.
pub const NETWORK_ERROR_LABEL: &str = "网络错误";

// == Data Source ==
/// Where a served payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Primary,
    Secondary,
    Origin,
    /// Built-in default or error placeholder
    Fallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Primary => "primary",
            DataSource::Secondary => "secondary",
            DataSource::Origin => "origin",
            DataSource::Fallback => "fallback",
        }
    }
}

impl From<Tier> for DataSource {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Primary => DataSource::Primary,
            Tier::Secondary => DataSource::Secondary,
        }
    }
}

/// A payload together with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub data: T,
    pub source: DataSource,
}

// == Market Data Service ==
#[derive(Clone)]
pub struct MarketDataService {
    cache: MarketCache,
    origin: Arc<dyn OriginApi>,
}

impl MarketDataService {
    pub fn new(cache: MarketCache, origin: Arc<dyn OriginApi>) -> Self {
        Self { cache, origin }
    }

    pub fn cache(&self) -> &MarketCache {
        &self.cache
    }

    // == Brands & Models ==
    /// Catalog for `country`.
    ///
    /// When upstream fails the default catalog is returned and cached, so
    /// a down origin is not hammered for the rest of the TTL.
    pub async fn brands_models(&self, country: &str) -> Served<BrandsModels> {
        let lookup = self.cache.lookup_brands_models(country).await;
        if let Some(served) = decode_hit(lookup, "brands_models") {
            info!(country, source = served.source.as_str(), "brands_models served from cache");
            return served;
        }

        let (catalog, source) = match self.origin.fetch_brands_models(country).await {
            Ok(reply) => (reply.into_catalog(), DataSource::Origin),
            Err(err) => {
                warn!(country, error = %err, "brands_models origin fetch failed, using defaults");
                (BrandsModels::default(), DataSource::Fallback)
            }
        };

        if let Some(payload) = encode(&catalog) {
            if !self.cache.set_brands_models_cache(country, &payload).await {
                warn!(country, "brands_models not cached");
            }
        }

        Served {
            data: catalog,
            source,
        }
    }

    // == Trend ==
    /// Trend series for `query`. Error placeholders are not cached.
    pub async fn trend(&self, query: &TrendQuery) -> Served<TrendData> {
        let lookup = self
            .cache
            .lookup_trend(
                &query.country,
                &query.brand,
                &query.model,
                &query.data_type,
                &query.trend,
            )
            .await;
        if let Some(served) = decode_hit(lookup, "trend") {
            info!(
                country = %query.country,
                brand = %query.brand,
                model = %query.model,
                source = served.source.as_str(),
                "trend served from cache"
            );
            return served;
        }

        match self.origin.fetch_trend(query).await {
            Ok(series) => {
                let stored = self
                    .cache
                    .set_trend_cache(
                        &query.country,
                        &query.brand,
                        &query.model,
                        &query.data_type,
                        &query.trend,
                        series.as_value(),
                    )
                    .await;
                if !stored {
                    warn!(country = %query.country, "trend not cached");
                }
                Served {
                    data: series,
                    source: DataSource::Origin,
                }
            }
            Err(err) => {
                warn!(country = %query.country, brand = %query.brand, error = %err, "trend origin fetch failed");
                let label = match err {
                    OriginError::Network(_) => NETWORK_ERROR_LABEL,
                    OriginError::Status(_) | OriginError::InvalidPayload(_) => REQUEST_ERROR_LABEL,
                };
                Served {
                    data: TrendData::placeholder(label),
                    source: DataSource::Fallback,
                }
            }
        }
    }
}

/// Decodes a cache hit; an undecodable payload counts as a miss.
fn decode_hit<T: DeserializeOwned>(lookup: Lookup, domain: &str) -> Option<Served<T>> {
    if lookup.degraded {
        debug!(domain, "primary store degraded during lookup");
    }
    let source = DataSource::from(lookup.tier?);
    match serde_json::from_value::<T>(lookup.value?) {
        Ok(data) => Some(Served { data, source }),
        Err(err) => {
            warn!(domain, error = %CacheError::from(err), "cached payload unreadable, refetching");
            None
        }
    }
}

fn encode<T: Serialize>(data: &T) -> Option<Value> {
    match serde_json::to_value(data) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %CacheError::from(err), "payload not cacheable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::primary::testing::FailingPrimary;
    use crate::cache::{TieredCache, TtlPolicy};
    use crate::models::BrandsModelsReply;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Origin stub answering from canned results and counting calls.
    struct StubOrigin {
        brands: Mutex<Option<Result<BrandsModelsReply, OriginError>>>,
        trend: Mutex<Option<Result<TrendData, OriginError>>>,
        calls: AtomicU64,
    }

    impl StubOrigin {
        fn new() -> Self {
            Self {
                brands: Mutex::new(None),
                trend: Mutex::new(None),
                calls: AtomicU64::new(0),
            }
        }

        fn with_brands(self, reply: Result<BrandsModelsReply, OriginError>) -> Self {
            *self.brands.lock().unwrap() = Some(reply);
            self
        }

        fn with_trend(self, reply: Result<TrendData, OriginError>) -> Self {
            *self.trend.lock().unwrap() = Some(reply);
            self
        }
    }

    fn clone_result<T: Clone>(slot: &Option<Result<T, OriginError>>) -> Result<T, OriginError> {
        match slot {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(OriginError::Status(code))) => Err(OriginError::Status(*code)),
            Some(Err(OriginError::InvalidPayload(msg))) => Err(OriginError::InvalidPayload(msg.clone())),
            Some(Err(OriginError::Network(msg))) => Err(OriginError::Network(msg.clone())),
            None => Err(OriginError::Network("no stub".to_string())),
        }
    }

    #[async_trait]
    impl OriginApi for StubOrigin {
        async fn fetch_brands_models(&self, _country: &str) -> Result<BrandsModelsReply, OriginError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            clone_result(&self.brands.lock().unwrap())
        }

        async fn fetch_trend(&self, _query: &TrendQuery) -> Result<TrendData, OriginError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            clone_result(&self.trend.lock().unwrap())
        }
    }

    fn service(origin: Arc<StubOrigin>) -> MarketDataService {
        let cache = MarketCache::new(
            Arc::new(TieredCache::secondary_only(100)),
            TtlPolicy::default(),
        );
        MarketDataService::new(cache, origin)
    }

    fn query(data_type: &str) -> TrendQuery {
        TrendQuery {
            country: "俄罗斯AVITO".to_string(),
            brand: "BYD".to_string(),
            model: "Han".to_string(),
            data_type: data_type.to_string(),
            trend: "价格-观看量".to_string(),
        }
    }

    fn series() -> TrendData {
        TrendData(json!({
            "x": ["2024-05-01", "2024-05-02"],
            "y": [21, null],
            "avg_price": 21.5,
            "label": "当日"
        }))
    }

    #[tokio::test]
    async fn test_brands_models_fetches_once_then_caches() {
        let reply = BrandsModelsReply {
            brands: Some(vec!["Zeekr".to_string()]),
            models: None,
        };
        let origin = Arc::new(StubOrigin::new().with_brands(Ok(reply)));
        let service = service(origin.clone());

        let first = service.brands_models("哈萨克KOLESA").await;
        let second = service.brands_models("哈萨克KOLESA").await;

        assert_eq!(first.source, DataSource::Origin);
        assert_eq!(second.source, DataSource::Secondary);
        assert_eq!(first.data, second.data);
        assert_eq!(first.data.brands, vec!["Zeekr"]);
        assert_eq!(origin.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_brands_models_origin_down_serves_and_caches_defaults() {
        let origin = Arc::new(
            StubOrigin::new().with_brands(Err(OriginError::Network("refused".to_string()))),
        );
        let service = service(origin.clone());

        let first = service.brands_models("KZ").await;
        assert_eq!(first.source, DataSource::Fallback);
        assert_eq!(first.data, BrandsModels::default());

        let second = service.brands_models("KZ").await;
        assert_eq!(second.source, DataSource::Secondary);
        assert_eq!(origin.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_trend_caches_origin_data() {
        let origin = Arc::new(StubOrigin::new().with_trend(Ok(series())));
        let service = service(origin.clone());

        assert_eq!(service.trend(&query("当日")).await.source, DataSource::Origin);
        let cached = service.trend(&query("当日")).await;
        assert_eq!(cached.source, DataSource::Secondary);
        assert_eq!(cached.data, series());
        assert_eq!(origin.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_trend_error_placeholders_are_not_cached() {
        let origin = Arc::new(StubOrigin::new().with_trend(Err(OriginError::Status(502))));
        let service = service(origin.clone());

        let served = service.trend(&query("历史回溯")).await;
        assert_eq!(served.source, DataSource::Fallback);
        assert_eq!(served.data, TrendData::placeholder(REQUEST_ERROR_LABEL));

        service.trend(&query("历史回溯")).await;
        assert_eq!(origin.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_trend_network_error_label() {
        let origin = Arc::new(
            StubOrigin::new().with_trend(Err(OriginError::Network("timeout".to_string()))),
        );
        let served = service(origin).trend(&query("当日")).await;
        assert_eq!(served.data, TrendData::placeholder(NETWORK_ERROR_LABEL));
    }

    #[tokio::test]
    async fn test_trend_cached_payload_matches_origin_exactly() {
        let origin = Arc::new(StubOrigin::new().with_trend(Ok(series())));
        let service = service(origin);
        let q = query("当日");

        service.trend(&q).await;
        let cached = service
            .cache()
            .get_trend_cache(&q.country, &q.brand, &q.model, &q.data_type, &q.trend)
            .await
            .unwrap();

        assert_eq!(&cached, series().as_value());
        assert_eq!(cached["y"][0], json!(21));
        assert!(cached["y"][1].is_null());
        assert_eq!(cached["label"], "当日");
    }

    #[tokio::test]
    async fn test_unreadable_cached_catalog_is_refetched() {
        let reply = BrandsModelsReply {
            brands: Some(vec!["Chery".to_string()]),
            models: None,
        };
        let origin = Arc::new(StubOrigin::new().with_brands(Ok(reply)));
        let service = service(origin.clone());

        service
            .cache()
            .set_brands_models_cache("KZ", &json!("garbage"))
            .await;

        let served = service.brands_models("KZ").await;
        assert_eq!(served.source, DataSource::Origin);
        assert_eq!(served.data.brands, vec!["Chery"]);
        assert_eq!(origin.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_works_with_failing_primary() {
        let cache = MarketCache::new(
            Arc::new(TieredCache::new(
                Some(Arc::new(FailingPrimary::default())),
                Duration::from_millis(100),
                100,
            )),
            TtlPolicy::default(),
        );
        let origin = Arc::new(StubOrigin::new().with_trend(Ok(series())));
        let service = MarketDataService::new(cache, origin.clone());

        service.trend(&query("当日")).await;
        let cached = service.trend(&query("当日")).await;

        assert_eq!(cached.source, DataSource::Secondary);
        assert_eq!(origin.calls.load(Ordering::SeqCst), 1);
    }
}
