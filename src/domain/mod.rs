//! Domain layer - core business logic and entities

pub mod health;
pub mod liquidity;
pub mod monitor;
pub mod position;
pub mod price;
