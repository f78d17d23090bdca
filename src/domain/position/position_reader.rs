//! Concurrent per-market reads with isolated failures

use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;

use crate::shared::errors::ReadError;
use crate::shared::types::{Address, ProtocolFamily};
use super::{LendingReader, MarketDefinition, MarketSnapshot};

/// Outcome of reading one market
#[derive(Debug, Clone)]
pub struct MarketRead<'a> {
    pub market: &'a MarketDefinition,
    pub snapshot: Result<MarketSnapshot, ReadError>,
}

/// Reads account positions through a protocol read strategy
#[derive(Clone)]
pub struct PositionReader {
    reader: Arc<dyn LendingReader>,
}

impl PositionReader {
    pub fn new(reader: Arc<dyn LendingReader>) -> Self {
        Self { reader }
    }

    pub fn family(&self) -> ProtocolFamily {
        self.reader.family()
    }

    pub async fn read_market(
        &self,
        account: &Address,
        market: &MarketDefinition,
    ) -> Result<MarketSnapshot, ReadError> {
        self.reader.read_market(account, market).await
    }

    /// Read all markets concurrently; one failing market never aborts the others
    pub async fn read_markets<'a>(
        &self,
        account: &Address,
        markets: &'a [MarketDefinition],
    ) -> Vec<MarketRead<'a>> {
        let reads = markets.iter().map(|market| async move {
            let snapshot = self.read_market(account, market).await;
            if let Err(e) = &snapshot {
                warn!("⚠️ {} {} read failed: {}", market.protocol, market.symbol, e);
            }
            MarketRead { market, snapshot }
        });
        join_all(reads).await
    }
}
