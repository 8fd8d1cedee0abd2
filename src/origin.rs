//! Origin API Module
//!
//! Fetch contract for the upstream analytics API and its HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::OriginError;
use crate::models::{BrandsModelsReply, TrendData, TrendQuery, TrendReply};

/// Upstream source of market data. A non-2xx answer or transport failure
/// is an error; callers decide what to serve instead.
#[async_trait]
pub trait OriginApi: Send + Sync {
    async fn fetch_brands_models(&self, country: &str) -> Result<BrandsModelsReply, OriginError>;

    async fn fetch_trend(&self, query: &TrendQuery) -> Result<TrendData, OriginError>;
}

/// `OriginApi` over HTTP with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrigin {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, OriginError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl OriginApi for HttpOrigin {
    async fn fetch_brands_models(&self, country: &str) -> Result<BrandsModelsReply, OriginError> {
        let response = self
            .client
            .get(self.url("/api/brands_models"))
            .query(&[("country", country)])
            .send()
            .await?;
        debug!(country, status = %response.status(), "origin brands_models");

        Ok(response.error_for_status()?.json().await?)
    }

    async fn fetch_trend(&self, query: &TrendQuery) -> Result<TrendData, OriginError> {
        let response = self
            .client
            .get(self.url("/api/trend"))
            .query(query)
            .send()
            .await?;
        debug!(country = %query.country, brand = %query.brand, status = %response.status(), "origin trend");

        let reply: TrendReply = response.error_for_status()?.json().await?;
        Ok(reply.data)
    }
}
