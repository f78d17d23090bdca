//! Price feed interfaces

use async_trait::async_trait;
use crate::shared::errors::PriceError;

/// External USD price lookup (HTTP feed, oracle, ...)
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch a fresh USD price for a feed asset id
    async fn fetch_usd_price(&self, asset_id: &str) -> Result<f64, PriceError>;
}

/// Anything that can value an asset in USD for an evaluation
#[async_trait]
pub trait UsdPriceResolver: Send + Sync {
    async fn usd_price(&self, asset_id: &str) -> Result<f64, PriceError>;
}
