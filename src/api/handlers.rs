//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::cache::{MarketCache, TieredCache};
use crate::error::{ApiError, ApiResult};
use crate::models::{BrandsModelsQuery, HealthResponse, StatsResponse, TrendQuery};
use crate::origin::OriginApi;
use crate::service::{MarketDataService, Served};

/// Response header naming the tier or fallback that produced the body.
pub const CACHE_SOURCE_HEADER: &str = "x-cache-source";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MarketDataService>,
}

impl AppState {
    pub fn new(service: MarketDataService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Wires a service from its parts.
    pub fn from_parts(cache: MarketCache, origin: Arc<dyn OriginApi>) -> Self {
        Self::new(MarketDataService::new(cache, origin))
    }

    fn tiers(&self) -> &Arc<TieredCache> {
        self.service.cache().tiers()
    }
}

fn with_source<T: Serialize>(served: Served<T>) -> Response {
    let mut response = Json(served.data).into_response();
    response.headers_mut().insert(
        HeaderName::from_static(CACHE_SOURCE_HEADER),
        HeaderValue::from_static(served.source.as_str()),
    );
    response
}

/// Handler for GET /api/brands_models
pub async fn brands_models_handler(
    State(state): State<AppState>,
    Query(query): Query<BrandsModelsQuery>,
) -> ApiResult<Response> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let served = state.service.brands_models(&query.country).await;
    Ok(with_source(served))
}

/// Handler for GET /api/trend
pub async fn trend_handler(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> ApiResult<Response> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let served = state.service.trend(&query).await;
    Ok(with_source(served))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let tiers = state.tiers();
    Json(StatsResponse::new(tiers.stats().await, tiers.has_primary()))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.tiers().has_primary()))
}
