//! Debounced safe/danger state machine over account liquidity

use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};

use crate::shared::errors::ReadError;
use crate::shared::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Safe,
    Danger,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Safe => write!(f, "SAFE"),
            HealthStatus::Danger => write!(f, "DANGER"),
        }
    }
}

/// Result of an account-liquidity read, USD values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountLiquidity {
    /// Non-zero means the protocol could not compute liquidity this time
    pub error_code: u64,
    pub liquidity: f64,
    pub shortfall: f64,
}

impl AccountLiquidity {
    /// Exactly-zero free liquidity without shortfall counts as safe
    pub fn classify(&self) -> HealthStatus {
        if self.shortfall > 0.0 {
            HealthStatus::Danger
        } else {
            HealthStatus::Safe
        }
    }
}

#[async_trait]
pub trait AccountLiquiditySource: Send + Sync {
    async fn account_liquidity(&self, account: &Address) -> Result<AccountLiquidity, ReadError>;
}

/// Last reported classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelfHealthState {
    pub last_status: HealthStatus,
}

/// Classification changed between two cycles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthTransition {
    pub from: HealthStatus,
    pub to: HealthStatus,
    pub liquidity: AccountLiquidity,
}

impl HealthTransition {
    pub fn to_text(&self) -> String {
        match self.to {
            HealthStatus::Danger => format!(
                "🚨 Account health: DANGER (shortfall ${:.2})",
                self.liquidity.shortfall
            ),
            HealthStatus::Safe => format!(
                "✅ Account health restored: SAFE (free liquidity ${:.2})",
                self.liquidity.liquidity
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct SelfHealthMonitor {
    state: SelfHealthState,
}

impl SelfHealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelfHealthState {
        self.state
    }

    /// Apply one reading; returns a transition only when the class changes
    pub fn observe(&mut self, liquidity: AccountLiquidity) -> Option<HealthTransition> {
        let status = liquidity.classify();
        if status == self.state.last_status {
            return None;
        }

        let transition = HealthTransition {
            from: self.state.last_status,
            to: status,
            liquidity,
        };
        self.state.last_status = status;
        Some(transition)
    }

    /// One monitoring cycle. Read failures and protocol error codes skip the
    /// cycle without touching the state.
    pub async fn check(
        &mut self,
        source: &dyn AccountLiquiditySource,
        account: &Address,
    ) -> Option<HealthTransition> {
        let liquidity = match source.account_liquidity(account).await {
            Ok(liquidity) => liquidity,
            Err(e) => {
                warn!("⚠️ Account liquidity read failed, skipping cycle: {}", e);
                return None;
            }
        };

        if liquidity.error_code != 0 {
            warn!(
                "⚠️ Account liquidity returned error code {}, skipping cycle",
                liquidity.error_code
            );
            return None;
        }

        let transition = self.observe(liquidity);
        if let Some(t) = &transition {
            info!("🩺 Self-health {} -> {}", t.from, t.to);
        }
        transition
    }
}
