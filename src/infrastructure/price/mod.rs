//! External USD price feeds

pub mod coingecko_client;

pub use coingecko_client::CoinGeckoClient;
