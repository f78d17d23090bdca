//! Position domain - per-market account balances of a lending protocol

mod conversion;
mod position_reader;

pub use conversion::{
    borrowed_underlying, detect_rate_scale, resolve_rate_scale, supplied_underlying,
    RATE_SCALE_DETECTION_THRESHOLD,
};
pub use position_reader::{MarketRead, PositionReader};

use async_trait::async_trait;
use crate::shared::errors::{AppError, ReadError};
use crate::shared::types::{
    parse_address, Address, MarketConfig, PortfolioBasis, ProtocolConfig, ProtocolFamily, RateScale, U256,
};

/// Static description of one lending market
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDefinition {
    pub symbol: String,
    pub protocol: String,
    /// cToken for Compound; [aToken, debt token, underlying] for Aave
    pub contracts: Vec<Address>,
    pub asset_decimals: u8,
    pub balance_decimals: u8,
    pub rate_scale: Option<RateScale>,
    pub price_id: Option<String>,
    pub collateral_factor: Option<f64>,
}

impl MarketDefinition {
    pub fn from_config(protocol: &str, cfg: &MarketConfig) -> Result<Self, AppError> {
        let contracts = cfg
            .contracts
            .iter()
            .map(|c| parse_address(c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            symbol: cfg.symbol.clone(),
            protocol: protocol.to_string(),
            contracts,
            asset_decimals: cfg.asset_decimals,
            balance_decimals: cfg.balance_decimals,
            rate_scale: cfg.rate_scale,
            price_id: cfg.price_id.clone(),
            collateral_factor: cfg.collateral_factor,
        })
    }

    pub fn contract(&self, index: usize) -> Result<&Address, ReadError> {
        self.contracts
            .get(index)
            .ok_or_else(|| ReadError::MissingContract(self.symbol.clone()))
    }
}

/// A lending protocol and the markets watched on it
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolDefinition {
    pub name: String,
    pub family: ProtocolFamily,
    pub portfolio_basis: PortfolioBasis,
    pub markets: Vec<MarketDefinition>,
}

impl ProtocolDefinition {
    pub fn from_config(cfg: &ProtocolConfig) -> Result<Self, AppError> {
        let markets = cfg
            .markets
            .iter()
            .map(|m| MarketDefinition::from_config(&cfg.name, m))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: cfg.name.clone(),
            family: cfg.family,
            portfolio_basis: cfg
                .portfolio_basis
                .unwrap_or_else(|| cfg.family.default_portfolio_basis()),
            markets,
        })
    }
}

/// Raw figures of one market for one account, all from the same read round
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    /// Balance in the market's own token (cToken units, aToken units)
    pub supplied_raw: U256,
    /// Borrow in underlying native units
    pub borrowed_raw: U256,
    pub conversion_rate: U256,
    pub collateral_factor: f64,
}

impl MarketSnapshot {
    pub fn new(
        symbol: impl Into<String>,
        supplied_raw: U256,
        borrowed_raw: U256,
        conversion_rate: U256,
        collateral_factor: f64,
    ) -> Result<Self, ReadError> {
        if !(0.0..=1.0).contains(&collateral_factor) {
            return Err(ReadError::InvalidCollateralFactor(collateral_factor));
        }
        Ok(Self {
            symbol: symbol.into(),
            supplied_raw,
            borrowed_raw,
            conversion_rate,
            collateral_factor,
        })
    }
}

/// Protocol-family read strategy
#[async_trait]
pub trait LendingReader: Send + Sync {
    fn family(&self) -> ProtocolFamily;

    /// Read supplied, borrowed, conversion rate and collateral factor of one market
    async fn read_market(
        &self,
        account: &Address,
        market: &MarketDefinition,
    ) -> Result<MarketSnapshot, ReadError>;
}
