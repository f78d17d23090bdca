//! Monitor domain - the account's own liquidity/shortfall state

mod self_health;

pub use self_health::{
    AccountLiquidity, AccountLiquiditySource, HealthStatus, HealthTransition, SelfHealthMonitor,
    SelfHealthState,
};
