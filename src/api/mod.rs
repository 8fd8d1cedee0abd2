//! API Module
//!
//! HTTP handlers and routing for the market data gateway.
//!
//! # Endpoints
//! - `GET /api/brands_models` - Brand/model catalog, cached for a day
//! - `GET /api/trend` - Trend series, cached by freshness class
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
