//! Price domain - cached USD prices for non-stable assets

mod price_cache;
mod price_feed;

pub use price_cache::{PriceCache, PriceCacheEntry};
pub use price_feed::{PriceSource, UsdPriceResolver};
