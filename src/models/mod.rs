//! Request and Response models for the market data API
//!
//! This module defines the payload shapes exchanged with the upstream
//! analytics API and with gateway clients.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{BrandsModelsQuery, TrendQuery};
pub use responses::{
    BrandsModels, BrandsModelsReply, HealthResponse, StatsResponse, TrendData, TrendReply,
};
