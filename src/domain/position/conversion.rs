//! Raw market balances to underlying-token amounts

use tracing::debug;

use crate::shared::types::{RateScale, U256};
use crate::shared::utils::{to_units, u256_to_f64};
use super::{MarketDefinition, MarketSnapshot};

/// Rates at or above this magnitude are WAD-scaled mantissas
pub const RATE_SCALE_DETECTION_THRESHOLD: u64 = 1_000_000_000_000;

const WAD: f64 = 1e18;
const PRECISION_8: f64 = 1e8;

/// Guess the scale convention from the rate magnitude
pub fn detect_rate_scale(rate: U256) -> RateScale {
    if rate >= U256::from(RATE_SCALE_DETECTION_THRESHOLD) {
        RateScale::Wad
    } else {
        RateScale::Precision8
    }
}

/// Configured convention wins; the magnitude heuristic is a fallback
pub fn resolve_rate_scale(explicit: Option<RateScale>, rate: U256) -> RateScale {
    match explicit {
        Some(scale) => scale,
        None => {
            let detected = detect_rate_scale(rate);
            debug!("Rate scale not configured, detected {:?} from rate {}", detected, rate);
            detected
        }
    }
}

/// Supplied balance expressed in underlying tokens
pub fn supplied_underlying(snapshot: &MarketSnapshot, market: &MarketDefinition) -> f64 {
    let rate = snapshot.conversion_rate;
    match resolve_rate_scale(market.rate_scale, rate) {
        RateScale::Wad => {
            // Product lands in the asset's native precision after dividing by 1e18
            let native = match snapshot.supplied_raw.checked_mul(rate) {
                Some(product) => u256_to_f64(product) / WAD,
                None => u256_to_f64(snapshot.supplied_raw) * (u256_to_f64(rate) / WAD),
            };
            native / 10_f64.powi(market.asset_decimals as i32)
        }
        RateScale::Precision8 => {
            to_units(snapshot.supplied_raw, market.balance_decimals) * (u256_to_f64(rate) / PRECISION_8)
        }
    }
}

/// Borrowed balance expressed in underlying tokens
pub fn borrowed_underlying(snapshot: &MarketSnapshot, market: &MarketDefinition) -> f64 {
    to_units(snapshot.borrowed_raw, market.asset_decimals)
}
