//! Infrastructure layer - RPC, price feed and chat adapters

pub mod blockchain;
pub mod notify;
pub mod price;
