//! Error handling for the application

use thiserror::Error;

/// Failure reading one on-chain data point (a market, a pool, an account)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("Unexpected contract response: {0}")]
    Decode(String),

    #[error("Contract returned error code {0}")]
    ContractError(u64),

    #[error("Market {0} is missing a contract reference")]
    MissingContract(String),

    #[error("No collateral factor available for {0}")]
    MissingCollateralFactor(String),

    #[error("Collateral factor {0} outside [0, 1]")]
    InvalidCollateralFactor(f64),
}

/// Price-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    #[error("Price feed unavailable for {asset}: {reason}")]
    FeedUnavailable { asset: String, reason: String },

    #[error("Invalid price data for {asset}: {value}")]
    InvalidPriceData { asset: String, value: f64 },
}

/// Failure of a whole protocol evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HealthError {
    #[error("USD conversion aborted: {0}")]
    Price(#[from] PriceError),
}

/// Alert delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("No recipient configured")]
    NoRecipient,

    #[error("Chat API conflict (another poller is active)")]
    Conflict,

    #[error("Chat API request failed: {0}")]
    Http(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Blockchain error: {0}")]
    BlockchainError(String),

    #[error("Notification error: {0}")]
    NotifyError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<ReadError> for AppError {
    fn from(err: ReadError) -> Self {
        AppError::BlockchainError(err.to_string())
    }
}

impl From<PriceError> for AppError {
    fn from(err: PriceError) -> Self {
        AppError::Unknown(err.to_string())
    }
}

impl From<HealthError> for AppError {
    fn from(err: HealthError) -> Self {
        AppError::Unknown(err.to_string())
    }
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::NotifyError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_error_wraps_price_failure() {
        let price = PriceError::FeedUnavailable {
            asset: "ethereum".to_string(),
            reason: "HTTP 429".to_string(),
        };
        let health = HealthError::from(price.clone());

        assert_eq!(health, HealthError::Price(price));
        assert_eq!(
            health.to_string(),
            "USD conversion aborted: Price feed unavailable for ethereum: HTTP 429"
        );
        assert!(matches!(AppError::from(health), AppError::Unknown(_)));
    }
}
