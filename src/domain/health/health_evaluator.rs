//! Converts per-market positions into a protocol health result

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info};

use crate::domain::position::{
    borrowed_underlying, supplied_underlying, MarketDefinition, MarketSnapshot, PositionReader,
    ProtocolDefinition,
};
use crate::domain::price::UsdPriceResolver;
use crate::shared::errors::{HealthError, PriceError};
use crate::shared::types::{Address, PortfolioBasis};
use super::{
    BreakdownLine, HealthRatio, MultiProtocolReport, ProtocolEntry, ProtocolFailure,
    ProtocolHealthResult,
};

/// A market converted to underlying tokens and USD
#[derive(Debug, Clone, PartialEq)]
pub struct MarketValuation {
    pub symbol: String,
    pub supplied_underlying: f64,
    pub borrowed_underlying: f64,
    pub supplied_usd: f64,
    pub borrowed_usd: f64,
    pub collateral_factor: f64,
}

/// Valued market, or the reason its data is unavailable
pub type MarketOutcome = Result<MarketValuation, BreakdownLine>;

/// A protocol definition paired with its read strategy
#[derive(Clone)]
pub struct ProtocolHandle {
    pub definition: ProtocolDefinition,
    pub reader: PositionReader,
}

pub struct HealthEvaluator {
    reference_asset: String,
}

impl HealthEvaluator {
    pub fn new(reference_asset: impl Into<String>) -> Self {
        Self {
            reference_asset: reference_asset.into(),
        }
    }

    pub fn reference_asset(&self) -> &str {
        &self.reference_asset
    }

    /// Evaluate one protocol. Unreadable markets become breakdown lines;
    /// a price that cannot be resolved aborts the whole evaluation.
    pub async fn evaluate(
        &self,
        account: &Address,
        protocol: &ProtocolDefinition,
        reader: &PositionReader,
        prices: &dyn UsdPriceResolver,
    ) -> Result<ProtocolHealthResult, HealthError> {
        let reads = reader.read_markets(account, &protocol.markets).await;

        let mut outcomes = Vec::with_capacity(reads.len());
        for read in reads {
            let outcome = match read.snapshot {
                Ok(snapshot) => Ok(self.value_market(read.market, &snapshot, prices).await?),
                Err(e) => Err(BreakdownLine::Unavailable {
                    symbol: read.market.symbol.clone(),
                    reason: e.to_string(),
                }),
            };
            outcomes.push(outcome);
        }

        let result = self.aggregate(&protocol.name, protocol.portfolio_basis, &outcomes);
        info!(
            "🩺 {}: ratio {}, collateral ${:.2}, borrow ${:.2}",
            result.protocol_name, result.health_ratio, result.total_collateral_usd, result.total_borrow_usd
        );
        Ok(result)
    }

    /// Evaluate every protocol independently; failures become explicit entries
    pub async fn evaluate_all(
        &self,
        account: &Address,
        protocols: &[ProtocolHandle],
        prices: &dyn UsdPriceResolver,
    ) -> MultiProtocolReport {
        let evaluations = protocols.iter().map(|handle| async move {
            let outcome = self
                .evaluate(account, &handle.definition, &handle.reader, prices)
                .await;
            (handle.definition.name.clone(), outcome)
        });

        let entries = join_all(evaluations)
            .await
            .into_iter()
            .map(|(protocol_name, outcome)| match outcome {
                Ok(result) => ProtocolEntry::Evaluated(result),
                Err(e) => {
                    error!("❌ {} evaluation failed: {}", protocol_name, e);
                    ProtocolEntry::Failed(ProtocolFailure {
                        protocol_name,
                        reason: e.to_string(),
                    })
                }
            })
            .collect();

        MultiProtocolReport {
            entries,
            generated_at: Utc::now(),
        }
    }

    async fn value_market(
        &self,
        market: &MarketDefinition,
        snapshot: &MarketSnapshot,
        prices: &dyn UsdPriceResolver,
    ) -> Result<MarketValuation, PriceError> {
        let supplied = supplied_underlying(snapshot, market);
        let borrowed = borrowed_underlying(snapshot, market);

        let price = match &market.price_id {
            // Empty positions need no price
            Some(id) if supplied > 0.0 || borrowed > 0.0 => prices.usd_price(id).await?,
            _ => 1.0,
        };

        Ok(MarketValuation {
            symbol: market.symbol.clone(),
            supplied_underlying: supplied,
            borrowed_underlying: borrowed,
            supplied_usd: supplied * price,
            borrowed_usd: borrowed * price,
            collateral_factor: snapshot.collateral_factor,
        })
    }

    /// Fold valued markets into totals, ratio, breakdown and liquidation price
    pub fn aggregate(
        &self,
        protocol_name: &str,
        portfolio_basis: PortfolioBasis,
        outcomes: &[MarketOutcome],
    ) -> ProtocolHealthResult {
        let mut total_collateral_usd = 0.0;
        let mut total_supplied_usd = 0.0;
        let mut total_borrow_usd = 0.0;
        let mut reference_borrowed = 0.0;
        let mut breakdown = Vec::new();

        for outcome in outcomes {
            let valuation = match outcome {
                Ok(v) => v,
                Err(line) => {
                    breakdown.push(line.clone());
                    continue;
                }
            };

            if valuation.supplied_usd > 0.0 {
                let weighted_usd = valuation.supplied_usd * valuation.collateral_factor;
                total_collateral_usd += weighted_usd;
                total_supplied_usd += valuation.supplied_usd;
                breakdown.push(BreakdownLine::Collateral {
                    symbol: valuation.symbol.clone(),
                    amount: valuation.supplied_underlying,
                    usd: valuation.supplied_usd,
                    collateral_factor: valuation.collateral_factor,
                    weighted_usd,
                });
            }

            if valuation.borrowed_usd > 0.0 {
                total_borrow_usd += valuation.borrowed_usd;
                if valuation.symbol.eq_ignore_ascii_case(&self.reference_asset) {
                    reference_borrowed += valuation.borrowed_underlying;
                }
                breakdown.push(BreakdownLine::Borrow {
                    symbol: valuation.symbol.clone(),
                    amount: valuation.borrowed_underlying,
                    usd: valuation.borrowed_usd,
                });
            }
        }

        // Approximation: a reference-asset move would also change any
        // reference-asset collateral, which this ignores
        let liquidation_reference_price = if reference_borrowed > 0.0 {
            Some(total_collateral_usd / reference_borrowed)
        } else {
            None
        };

        let portfolio_usd = match portfolio_basis {
            PortfolioBasis::Supplied => total_supplied_usd - total_borrow_usd,
            PortfolioBasis::Weighted => total_collateral_usd - total_borrow_usd,
        };

        ProtocolHealthResult {
            protocol_name: protocol_name.to_string(),
            health_ratio: HealthRatio::from_totals(total_collateral_usd, total_borrow_usd),
            total_collateral_usd,
            total_supplied_usd,
            total_borrow_usd,
            portfolio_usd,
            portfolio_basis,
            breakdown,
            liquidation_reference_price,
            reference_asset: self.reference_asset.clone(),
            evaluated_at: Utc::now(),
        }
    }
}
