//! Request DTOs for the market data API
//!
//! Query strings accepted by the gateway, mirroring the upstream API.

use serde::{Deserialize, Serialize};

/// Query for GET /api/brands_models
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandsModelsQuery {
    /// Market to list brands and models for
    #[serde(default)]
    pub country: String,
}

impl BrandsModelsQuery {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.country.trim().is_empty() {
            return Some("country is required".to_string());
        }
        None
    }
}

/// Query for GET /api/trend
///
/// `trend` travels as `type` on the wire, as upstream names it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrendQuery {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    /// Freshness class marker, e.g. 当日 or 历史回溯
    #[serde(default)]
    pub data_type: String,
    /// Trend kind, e.g. 价格-观看量
    #[serde(default, rename = "type")]
    pub trend: String,
}

impl TrendQuery {
    /// Returns an error message naming the first missing parameter.
    pub fn validate(&self) -> Option<String> {
        let fields = [
            ("country", &self.country),
            ("brand", &self.brand),
            ("model", &self.model),
            ("data_type", &self.data_type),
            ("type", &self.trend),
        ];
        fields
            .iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| format!("{} is required", name))
    }
}
