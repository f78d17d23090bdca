//! EVM JSON-RPC client for direct contract reading

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;
use web3::ethabi::{Function, Token};
use web3::transports::Http;
use web3::types::{BlockId, BlockNumber, Bytes, CallRequest};
use web3::Web3;

use super::traits::ContractCaller;
use crate::shared::errors::{AppError, ReadError};
use crate::shared::types::Address;

/// web3 over the HTTP transport, with a request timeout
pub struct EvmRpcClient {
    web3: Web3<Http>,
    url: String,
}

impl EvmRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let url = url.into();
        let endpoint: Url = url
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid RPC url {}: {}", url, e)))?;

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::BlockchainError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            web3: Web3::new(Http::with_client(http_client, endpoint)),
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Latest block number, used as a connectivity probe
    pub async fn block_number(&self) -> Result<u64, ReadError> {
        let number = self
            .web3
            .eth()
            .block_number()
            .await
            .map_err(|e| ReadError::Rpc(e.to_string()))?;
        Ok(number.as_u64())
    }
}

#[async_trait]
impl ContractCaller for EvmRpcClient {
    async fn query(&self, to: Address, function: &Function, args: Vec<Token>) -> Result<Vec<Token>, ReadError> {
        let data = encode_call(function, &args)?;
        debug!("➡️ eth_call {} @ {:#x}", function.name, to);

        let request = CallRequest {
            to: Some(to),
            data: Some(data),
            ..Default::default()
        };
        let output = self
            .web3
            .eth()
            .call(request, Some(BlockId::Number(BlockNumber::Latest)))
            .await
            .map_err(|e| ReadError::Rpc(e.to_string()))?;

        decode_return(function, &output)
    }
}

fn encode_call(function: &Function, args: &[Token]) -> Result<Bytes, ReadError> {
    function
        .encode_input(args)
        .map(Bytes)
        .map_err(|e| ReadError::Decode(format!("{} arguments: {}", function.name, e)))
}

// revert без данных приходит как пустой ответ
fn decode_return(function: &Function, output: &Bytes) -> Result<Vec<Token>, ReadError> {
    function
        .decode_output(&output.0)
        .map_err(|e| ReadError::Decode(format!("{} returned {} bytes: {}", function.name, output.0.len(), e)))
}
