use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::price::PriceSource;
use crate::shared::errors::{AppError, PriceError};

/// Ответ `/simple/price`: { "<id>": { "usd": <price> } }
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

/// CoinGecko simple-price API client
pub struct CoinGeckoClient {
    http_client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_usd_price(&self, asset_id: &str) -> Result<f64, PriceError> {
        let unavailable = |reason: String| PriceError::FeedUnavailable {
            asset: asset_id.to_string(),
            reason,
        };

        let url = format!("{}/simple/price", self.base_url);
        debug!("💲 Fetching {} price from {}", asset_id, url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("ids", asset_id), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("status {}", response.status())));
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        extract_usd_price(&body, asset_id)
    }
}

fn extract_usd_price(body: &SimplePriceResponse, asset_id: &str) -> Result<f64, PriceError> {
    body.get(asset_id)
        .and_then(|quotes| quotes.get("usd"))
        .copied()
        .ok_or_else(|| PriceError::FeedUnavailable {
            asset: asset_id.to_string(),
            reason: "asset missing from response".to_string(),
        })
}
