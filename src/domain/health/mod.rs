//! Health domain - collateralization health across lending protocols

mod health_evaluator;
mod report;

pub use health_evaluator::{HealthEvaluator, MarketOutcome, MarketValuation, ProtocolHandle};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::types::PortfolioBasis;

/// Weighted collateral over borrow
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum HealthRatio {
    Finite(f64),
    /// Nothing borrowed
    Infinite,
}

impl HealthRatio {
    pub fn from_totals(total_collateral_usd: f64, total_borrow_usd: f64) -> Self {
        if total_borrow_usd > 0.0 {
            HealthRatio::Finite(total_collateral_usd / total_borrow_usd)
        } else {
            HealthRatio::Infinite
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, HealthRatio::Infinite)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            HealthRatio::Finite(v) => Some(*v),
            HealthRatio::Infinite => None,
        }
    }
}

/// One display line of a protocol's per-market breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BreakdownLine {
    Collateral {
        symbol: String,
        amount: f64,
        usd: f64,
        collateral_factor: f64,
        weighted_usd: f64,
    },
    Borrow {
        symbol: String,
        amount: f64,
        usd: f64,
    },
    Unavailable {
        symbol: String,
        reason: String,
    },
}

/// Health of one account on one protocol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolHealthResult {
    pub protocol_name: String,
    pub health_ratio: HealthRatio,
    pub total_collateral_usd: f64,
    pub total_supplied_usd: f64,
    pub total_borrow_usd: f64,
    pub portfolio_usd: f64,
    pub portfolio_basis: PortfolioBasis,
    pub breakdown: Vec<BreakdownLine>,
    /// Approximate reference-asset price at which weighted collateral equals
    /// borrow, with every other asset's USD value held fixed
    pub liquidation_reference_price: Option<f64>,
    pub reference_asset: String,
    pub evaluated_at: DateTime<Utc>,
}

/// A protocol whose evaluation produced no result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolFailure {
    pub protocol_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProtocolEntry {
    Evaluated(ProtocolHealthResult),
    Failed(ProtocolFailure),
}

/// Combined report, in configuration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiProtocolReport {
    pub entries: Vec<ProtocolEntry>,
    pub generated_at: DateTime<Utc>,
}

impl MultiProtocolReport {
    pub fn results(&self) -> impl Iterator<Item = &ProtocolHealthResult> {
        self.entries.iter().filter_map(|e| match e {
            ProtocolEntry::Evaluated(r) => Some(r),
            ProtocolEntry::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProtocolFailure> {
        self.entries.iter().filter_map(|e| match e {
            ProtocolEntry::Failed(f) => Some(f),
            ProtocolEntry::Evaluated(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_ratio_infinite_iff_no_borrow() {
        for collateral in [0.0, 1.0, 2500.0, 1e9] {
            assert!(HealthRatio::from_totals(collateral, 0.0).is_infinite());
            assert!(!HealthRatio::from_totals(collateral, 0.01).is_infinite());
        }
        assert_eq!(HealthRatio::from_totals(3000.0, 1500.0).value(), Some(2.0));
        assert_eq!(HealthRatio::Infinite.value(), None);
    }
}
