//! Common types used across the application

use serde::{Deserialize, Serialize};

pub use ethereum_types::{Address, U256};

use crate::shared::errors::AppError;

/// Parse a `0x`-prefixed 20-byte address from configuration
pub fn parse_address(s: &str) -> Result<Address, AppError> {
    s.trim()
        .parse::<Address>()
        .map_err(|e| AppError::ConfigError(format!("Invalid address {}: {}", s, e)))
}

/// Scale convention of a market's exchange rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateScale {
    /// Rate mantissa scaled by 1e18, result lands in the asset's native decimals
    Wad,
    /// Balance carried at its own precision, rate scaled by 1e8
    Precision8,
}

/// Lending protocol family, selects the read strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolFamily {
    Compound,
    Aave,
}

impl ProtocolFamily {
    pub fn default_portfolio_basis(&self) -> PortfolioBasis {
        match self {
            ProtocolFamily::Compound => PortfolioBasis::Supplied,
            ProtocolFamily::Aave => PortfolioBasis::Weighted,
        }
    }
}

/// What the portfolio figure subtracts borrow from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioBasis {
    /// Raw supplied USD, before collateral factors
    Supplied,
    /// Collateral-weighted USD
    Weighted,
}

/// JSON-RPC endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    #[serde(default = "default_rpc_timeout_ms")]
    pub timeout_ms: u64,
}

/// Monitored account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub address: String,
}

/// Scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_threshold_usd")]
    pub threshold_usd: f64,
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    #[serde(default = "default_command_poll_interval_ms")]
    pub command_poll_interval_ms: u64,
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            threshold_usd: default_threshold_usd(),
            check_interval_ms: default_check_interval_ms(),
            command_poll_interval_ms: default_command_poll_interval_ms(),
            startup_delay_ms: default_startup_delay_ms(),
        }
    }
}

/// External price feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    #[serde(default = "default_price_api_url")]
    pub api_url: String,
    #[serde(default = "default_cache_window_secs")]
    pub cache_window_secs: u64,
    /// Symbol of the asset the liquidation reference price is quoted for
    #[serde(default = "default_reference_asset")]
    pub reference_asset: String,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            api_url: default_price_api_url(),
            cache_window_secs: default_cache_window_secs(),
            reference_asset: default_reference_asset(),
        }
    }
}

/// Chat transport settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

/// Self-health monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfHealthConfig {
    pub comptroller: String,
}

/// Pool watched for liquidity swings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    pub address: String,
    pub decimals: u8,
}

/// One market of a lending protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub symbol: String,
    pub contracts: Vec<String>,
    pub asset_decimals: u8,
    #[serde(default = "default_balance_decimals")]
    pub balance_decimals: u8,
    pub rate_scale: Option<RateScale>,
    /// Price feed id; markets without one are treated as USD-pegged
    pub price_id: Option<String>,
    pub collateral_factor: Option<f64>,
}

/// Lending protocol with its markets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub name: String,
    pub family: ProtocolFamily,
    pub comptroller: Option<String>,
    pub data_provider: Option<String>,
    pub portfolio_basis: Option<PortfolioBasis>,
    #[serde(default)]
    pub markets: Vec<MarketConfig>,
}

/// Bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub rpc: RpcConfig,
    pub account: AccountConfig,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub prices: PriceConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    pub self_health: Option<SelfHealthConfig>,
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
    #[serde(default)]
    pub protocols: Vec<ProtocolConfig>,
}

fn default_rpc_timeout_ms() -> u64 {
    10_000
}

fn default_threshold_usd() -> f64 {
    1000.0
}

fn default_check_interval_ms() -> u64 {
    60_000
}

fn default_command_poll_interval_ms() -> u64 {
    8_000
}

fn default_startup_delay_ms() -> u64 {
    3_000
}

fn default_price_api_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_cache_window_secs() -> u64 {
    60
}

fn default_reference_asset() -> String {
    "ETH".to_string()
}

fn default_balance_decimals() -> u8 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_mixed_case() {
        let addr = parse_address(" 0x39AA39c021dfbaE8faC545936693aC917d5E7563 ").unwrap();
        assert_eq!(format!("{:#x}", addr), "0x39aa39c021dfbae8fac545936693ac917d5e7563");
        assert_eq!(addr.as_bytes()[0], 0x39);
    }

    #[test]
    fn test_parse_address_rejects_wrong_length() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzz").is_err());
    }

    #[test]
    fn test_family_portfolio_defaults() {
        assert_eq!(ProtocolFamily::Compound.default_portfolio_basis(), PortfolioBasis::Supplied);
        assert_eq!(ProtocolFamily::Aave.default_portfolio_basis(), PortfolioBasis::Weighted);
    }
}
