//! Integration Tests for API Endpoints
//!
//! Drives the full router with an in-process origin and checks that
//! repeat requests are served from the cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use market_cache::{
    api::{create_router, CACHE_SOURCE_HEADER},
    cache::{MarketCache, TieredCache, TtlPolicy},
    error::OriginError,
    models::{BrandsModelsReply, TrendData, TrendQuery},
    origin::OriginApi,
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Types ==

/// Origin that answers a fixed catalog and series, counting calls.
#[derive(Default)]
struct CountingOrigin {
    calls: AtomicU64,
    fail: bool,
}

#[async_trait]
impl OriginApi for CountingOrigin {
    async fn fetch_brands_models(&self, _country: &str) -> Result<BrandsModelsReply, OriginError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(OriginError::Network("connection refused".to_string()));
        }
        Ok(serde_json::from_value(json!({
            "brands": ["Zeekr"],
            "models": {"Zeekr": ["7X"]}
        }))
        .unwrap())
    }

    async fn fetch_trend(&self, query: &TrendQuery) -> Result<TrendData, OriginError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(OriginError::Status(500));
        }
        Ok(TrendData(trend_payload(&query.data_type)))
    }
}

// == Helper Functions ==

/// Series as upstream sends it: integer points, a gap and extra fields.
fn trend_payload(data_type: &str) -> Value {
    json!({
        "x": ["2024-05-01", "2024-05-02", "2024-05-03"],
        "y": [100, null, 120],
        "median_price": 110,
        "label": data_type,
        "count": [3, 0, 5]
    })
}

fn create_test_app(origin: Arc<CountingOrigin>) -> Router {
    let cache = MarketCache::new(
        Arc::new(TieredCache::secondary_only(100)),
        TtlPolicy::default(),
    );
    create_router(AppState::from_parts(cache, origin))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let source = response
        .headers()
        .get(CACHE_SOURCE_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, source, serde_json::from_slice(&bytes).unwrap())
}

const BRANDS_URI: &str = "/api/brands_models?country=%E5%93%88%E8%90%A8%E5%85%8BKOLESA";
const TREND_URI: &str = "/api/trend?country=KZ&brand=BYD&model=Han&data_type=%E5%BD%93%E6%97%A5&type=price";

// == Brands & Models ==

#[tokio::test]
async fn test_brands_models_second_request_hits_cache() {
    let origin = Arc::new(CountingOrigin::default());
    let app = create_test_app(origin.clone());

    let (status, source, body) = get(&app, BRANDS_URI).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.as_deref(), Some("origin"));
    assert_eq!(body, json!({"brands": ["Zeekr"], "models": {"Zeekr": ["7X"]}}));

    let (status, source, cached) = get(&app, BRANDS_URI).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.as_deref(), Some("secondary"));
    assert_eq!(cached, body);
    assert_eq!(origin.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_brands_models_origin_down_serves_defaults() {
    let origin = Arc::new(CountingOrigin {
        fail: true,
        ..Default::default()
    });
    let app = create_test_app(origin);

    let (status, source, body) = get(&app, BRANDS_URI).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.as_deref(), Some("fallback"));
    assert_eq!(body["brands"], json!(["Zeekr", "BYD"]));
    assert_eq!(body["models"]["Zeekr"], json!(["7X", "001", "全车型"]));
}

#[tokio::test]
async fn test_brands_models_missing_country() {
    let app = create_test_app(Arc::new(CountingOrigin::default()));

    let (status, _, body) = get(&app, "/api/brands_models").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "country is required");
}

// == Trend ==

#[tokio::test]
async fn test_trend_second_request_hits_cache() {
    let origin = Arc::new(CountingOrigin::default());
    let app = create_test_app(origin.clone());

    let (status, source, body) = get(&app, TREND_URI).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.as_deref(), Some("origin"));
    assert_eq!(body, trend_payload("当日"));

    let (_, source, cached) = get(&app, TREND_URI).await;
    assert_eq!(source.as_deref(), Some("secondary"));
    assert_eq!(cached, trend_payload("当日"));
    assert_eq!(cached["y"], json!([100, null, 120]));
    assert_eq!(origin.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_trend_scoped_by_data_type() {
    let origin = Arc::new(CountingOrigin::default());
    let app = create_test_app(origin.clone());

    get(&app, TREND_URI).await;
    let (_, source, _) = get(
        &app,
        "/api/trend?country=KZ&brand=BYD&model=Han&data_type=history&type=price",
    )
    .await;

    assert_eq!(source.as_deref(), Some("origin"));
    assert_eq!(origin.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_trend_origin_error_placeholder() {
    let origin = Arc::new(CountingOrigin {
        fail: true,
        ..Default::default()
    });
    let app = create_test_app(origin.clone());

    let (status, source, body) = get(&app, TREND_URI).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.as_deref(), Some("fallback"));
    assert_eq!(body, json!({"x": ["请求错误"], "y": [0]}));

    // Placeholders are not cached
    get(&app, TREND_URI).await;
    assert_eq!(origin.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_trend_missing_params() {
    let app = create_test_app(Arc::new(CountingOrigin::default()));

    let (status, _, body) = get(&app, "/api/trend?country=KZ&brand=BYD").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "model is required");
}

// == Stats & Health ==

#[tokio::test]
async fn test_stats_reflect_traffic() {
    let app = create_test_app(Arc::new(CountingOrigin::default()));

    get(&app, BRANDS_URI).await; // miss
    get(&app, BRANDS_URI).await; // secondary hit

    let (status, _, stats) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["secondary_hits"], 1);
    assert_eq!(stats["primary_hits"], 0);
    assert_eq!(stats["total_entries"], 1);
    assert_eq!(stats["hit_rate"], 0.5);
    assert_eq!(stats["primary_configured"], false);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(Arc::new(CountingOrigin::default()));

    let (status, _, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["primary_store"], "absent");
    assert!(body.get("timestamp").is_some());
}
