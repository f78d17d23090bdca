use async_trait::async_trait;
use web3::ethabi::{Function, Token};

use crate::shared::errors::ReadError;
use crate::shared::types::Address;

/// Read-only contract call (`eth_call` against the latest block)
#[async_trait]
pub trait ContractCaller: Send + Sync {
    /// Encode `args` for `function`, call `to` and decode the outputs
    async fn query(&self, to: Address, function: &Function, args: Vec<Token>) -> Result<Vec<Token>, ReadError>;
}
