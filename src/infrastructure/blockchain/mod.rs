//! Direct contract reading over EVM JSON-RPC

pub mod aave_reader;
pub mod compound_reader;
pub mod contracts;
pub mod factory;
pub mod rpc_client;
pub mod traits;

pub use aave_reader::AaveReader;
pub use compound_reader::CompoundReader;
pub use contracts::{LendingAbi, LendingContracts};
pub use factory::ReaderFactory;
pub use rpc_client::EvmRpcClient;
pub use traits::ContractCaller;
