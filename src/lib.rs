//! Lendwatch - lending position health and pool liquidity monitor
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::MonitorService;
pub use domain::health::HealthEvaluator;
pub use domain::liquidity::LiquidityChangeDetector;
pub use domain::monitor::SelfHealthMonitor;
pub use domain::price::PriceCache;
