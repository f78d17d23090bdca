//! Price cache with a bounded staleness window
//!
//! Failure policy: when a refresh fails and a previous value exists, the
//! previous value is served (and the entry keeps its old timestamp, so the
//! next call retries). Without a previous value the failure propagates. A
//! zero or negative price is treated as a failure and never stored.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::shared::errors::PriceError;
use super::{PriceSource, UsdPriceResolver};

/// Last fetched price of one asset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceCacheEntry {
    pub value: f64,
    pub fetched_at: Instant,
}

/// Caches USD prices per asset id
pub struct PriceCache<S> {
    source: S,
    window: Duration,
    entries: Mutex<HashMap<String, PriceCacheEntry>>,
}

impl<S: PriceSource> PriceCache<S> {
    pub fn new(source: S, window: Duration) -> Self {
        Self {
            source,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get a USD price, hitting the source only when the cached one is stale
    pub async fn get_price(&self, asset_id: &str) -> Result<f64, PriceError> {
        // Held across the refresh so concurrent evaluations share one lookup
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if let Some(entry) = entries.get(asset_id) {
            if now.duration_since(entry.fetched_at) < self.window {
                return Ok(entry.value);
            }
        }

        let fetched = self
            .source
            .fetch_usd_price(asset_id)
            .await
            .and_then(|value| {
                if value.is_finite() && value > 0.0 {
                    Ok(value)
                } else {
                    Err(PriceError::InvalidPriceData {
                        asset: asset_id.to_string(),
                        value,
                    })
                }
            });

        match fetched {
            Ok(value) => {
                debug!("💲 {} price refreshed: {}", asset_id, value);
                entries.insert(
                    asset_id.to_string(),
                    PriceCacheEntry {
                        value,
                        fetched_at: now,
                    },
                );
                Ok(value)
            }
            Err(e) => match entries.get(asset_id) {
                Some(previous) => {
                    warn!(
                        "⚠️ Price refresh for {} failed ({}), using value from {:?} ago",
                        asset_id,
                        e,
                        now.duration_since(previous.fetched_at)
                    );
                    Ok(previous.value)
                }
                None => Err(e),
            },
        }
    }

    pub async fn cached(&self, asset_id: &str) -> Option<PriceCacheEntry> {
        self.entries.lock().await.get(asset_id).copied()
    }
}

#[async_trait]
impl<S: PriceSource> UsdPriceResolver for PriceCache<S> {
    async fn usd_price(&self, asset_id: &str) -> Result<f64, PriceError> {
        self.get_price(asset_id).await
    }
}
