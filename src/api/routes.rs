//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    brands_models_handler, health_handler, stats_handler, trend_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/brands_models?country=` - Brand/model catalog
/// - `GET /api/trend?country&brand&model&data_type&type` - Trend series
/// - `GET /stats` - Per-tier cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/brands_models", get(brands_models_handler))
        .route("/api/trend", get(trend_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
