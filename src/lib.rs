//! Market Cache - tiered caching for car-market analytics data
//!
//! A shared primary store backed by an in-process fallback, with key and
//! TTL policies per data domain, served through a small caching gateway.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod origin;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use cache::{MarketCache, TieredCache};
pub use config::Config;
pub use service::MarketDataService;
pub use tasks::spawn_sweep_task;
