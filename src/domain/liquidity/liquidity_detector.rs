use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

use crate::shared::utils::format_thousands;
use super::{PoolCashSource, PoolDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Added,
    Withdrawn,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Added => write!(f, "added"),
            Direction::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

/// A pool's cash moved by at least the threshold since the previous cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub pool: String,
    pub delta: f64,
    pub direction: Direction,
}

impl ChangeEvent {
    pub fn to_text(&self) -> String {
        format!(
            "💧 Pool {}: liquidity {} {:.2} USD",
            self.pool, self.direction, self.delta
        )
    }
}

/// Last observed cash per pool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiquidityBaseline {
    values: HashMap<String, f64>,
}

impl LiquidityBaseline {
    pub fn get(&self, pool: &str) -> Option<f64> {
        self.values.get(pool).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn record(&mut self, pool: &str, value: f64) -> Option<f64> {
        self.values.insert(pool.to_string(), value)
    }
}

/// Compares each pool's cash with the immediately preceding observation
pub struct LiquidityChangeDetector {
    threshold_usd: f64,
    baseline: LiquidityBaseline,
}

impl LiquidityChangeDetector {
    pub fn new(threshold_usd: f64) -> Self {
        Self {
            threshold_usd,
            baseline: LiquidityBaseline::default(),
        }
    }

    pub fn baseline(&self) -> &LiquidityBaseline {
        &self.baseline
    }

    pub fn threshold_usd(&self) -> f64 {
        self.threshold_usd
    }

    /// Record one observation. The baseline is overwritten whether or not an
    /// event fires; the first observation of a pool never fires.
    pub fn observe(&mut self, pool: &str, current: f64) -> Option<ChangeEvent> {
        let previous = self.baseline.record(pool, current)?;
        let delta = current - previous;

        if delta.abs() >= self.threshold_usd {
            Some(ChangeEvent {
                pool: pool.to_string(),
                delta,
                direction: if delta > 0.0 {
                    Direction::Added
                } else {
                    Direction::Withdrawn
                },
            })
        } else {
            None
        }
    }

    /// Read every pool and diff against the baseline. A pool that cannot be
    /// read is skipped and keeps its previous baseline.
    pub async fn check_liquidity(
        &mut self,
        source: &dyn PoolCashSource,
        pools: &[PoolDefinition],
    ) -> Vec<ChangeEvent> {
        info!("🔍 Checking pool liquidity...");
        let mut events = Vec::new();

        for pool in pools {
            match source.get_cash(pool).await {
                Ok(cash) => {
                    if let Some(event) = self.observe(&pool.name, cash) {
                        info!("{}", event.to_text());
                        events.push(event);
                    }
                }
                Err(e) => warn!("⚠️ Pool {} read failed: {}", pool.name, e),
            }
        }
        events
    }
}

/// `/status` text: current cash of every pool
pub async fn liquidity_status(source: &dyn PoolCashSource, pools: &[PoolDefinition]) -> String {
    let mut text = String::from("📊 Pool liquidity:\n");
    for pool in pools {
        match source.get_cash(pool).await {
            Ok(cash) => text.push_str(&format!("{}: {} USD\n", pool.name, format_thousands(cash))),
            Err(e) => {
                warn!("⚠️ Pool {} read failed: {}", pool.name, e);
                text.push_str(&format!("{}: data unavailable\n", pool.name));
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::ReadError;
    use crate::shared::types::Address;
    use async_trait::async_trait;
    use std::collections::HashMap as Map;

    #[test]
    fn test_sequence_fires_once_and_tracks_latest() {
        let mut detector = LiquidityChangeDetector::new(1000.0);

        assert_eq!(detector.observe("USDT", 100.0), None);
        assert_eq!(detector.observe("USDT", 100.5), None);

        let event = detector.observe("USDT", 1500.0).unwrap();
        assert_eq!(event.direction, Direction::Added);
        assert!((event.delta - 1399.5).abs() < 1e-9);
        assert_eq!(detector.baseline().get("USDT"), Some(1500.0));
    }

    #[test]
    fn test_first_observation_never_fires() {
        let mut detector = LiquidityChangeDetector::new(1000.0);
        assert_eq!(detector.observe("DAI", 5_000_000.0), None);
        assert_eq!(detector.baseline().get("DAI"), Some(5_000_000.0));
    }

    #[test]
    fn test_withdrawal_and_exact_threshold() {
        let mut detector = LiquidityChangeDetector::new(1000.0);
        detector.observe("USDC", 10_000.0);

        let event = detector.observe("USDC", 9_000.0).unwrap();
        assert_eq!(event.direction, Direction::Withdrawn);
        assert_eq!(event.delta, -1000.0);
        assert_eq!(event.to_text(), "💧 Pool USDC: liquidity withdrawn -1000.00 USD");
    }

    #[test]
    fn test_no_double_alert_across_cycles() {
        let mut detector = LiquidityChangeDetector::new(1000.0);
        detector.observe("USDC", 0.0);
        assert!(detector.observe("USDC", 2000.0).is_some());
        assert!(detector.observe("USDC", 2000.0).is_none());
        assert!(detector.observe("USDC", 2400.0).is_none());
    }

    struct TableCash {
        cash: Map<String, Result<f64, ReadError>>,
    }

    #[async_trait]
    impl PoolCashSource for TableCash {
        async fn get_cash(&self, pool: &PoolDefinition) -> Result<f64, ReadError> {
            self.cash.get(&pool.name).cloned().unwrap_or(Err(ReadError::Rpc("unknown pool".to_string())))
        }
    }

    fn pool(name: &str) -> PoolDefinition {
        PoolDefinition {
            name: name.to_string(),
            address: Address::default(),
            decimals: 6,
        }
    }

    #[tokio::test]
    async fn test_check_liquidity_skips_failed_pool() {
        let mut detector = LiquidityChangeDetector::new(1000.0);
        let pools = vec![pool("USDT"), pool("DAI")];

        let first = TableCash {
            cash: [("USDT".to_string(), Ok(100.0)), ("DAI".to_string(), Ok(50_000.0))].into_iter().collect(),
        };
        assert!(detector.check_liquidity(&first, &pools).await.is_empty());

        let second = TableCash {
            cash: [
                ("USDT".to_string(), Ok(5_100.0)),
                ("DAI".to_string(), Err(ReadError::Rpc("timeout".to_string()))),
            ]
            .into_iter()
            .collect(),
        };
        let events = detector.check_liquidity(&second, &pools).await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pool, "USDT");
        assert_eq!(detector.baseline().get("DAI"), Some(50_000.0));
        assert_eq!(detector.baseline().len(), 2);
    }

    #[tokio::test]
    async fn test_status_text() {
        let source = TableCash {
            cash: [
                ("USDT".to_string(), Ok(1_234_567.891)),
                ("DAI".to_string(), Err(ReadError::Rpc("timeout".to_string()))),
            ]
            .into_iter()
            .collect(),
        };

        let text = liquidity_status(&source, &[pool("USDT"), pool("DAI")]).await;
        assert_eq!(text, "📊 Pool liquidity:\nUSDT: 1,234,567.89 USD\nDAI: data unavailable\n");
    }
}
