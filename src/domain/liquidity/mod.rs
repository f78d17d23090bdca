//! Liquidity domain - pool cash tracking and swing detection

mod liquidity_detector;

pub use liquidity_detector::{
    liquidity_status, ChangeEvent, Direction, LiquidityBaseline, LiquidityChangeDetector,
};

use async_trait::async_trait;
use crate::shared::errors::{AppError, ReadError};
use crate::shared::types::{parse_address, Address, PoolConfig};

/// Pool whose available cash is watched
#[derive(Debug, Clone, PartialEq)]
pub struct PoolDefinition {
    pub name: String,
    pub address: Address,
    pub decimals: u8,
}

impl PoolDefinition {
    pub fn from_config(cfg: &PoolConfig) -> Result<Self, AppError> {
        Ok(Self {
            name: cfg.name.clone(),
            address: parse_address(&cfg.address)?,
            decimals: cfg.decimals,
        })
    }
}

/// Source of a pool's current cash, in underlying tokens
#[async_trait]
pub trait PoolCashSource: Send + Sync {
    async fn get_cash(&self, pool: &PoolDefinition) -> Result<f64, ReadError>;
}
