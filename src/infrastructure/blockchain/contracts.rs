//! Lending contract ABI (cToken, comptroller, ERC-20, Aave data provider)

use std::sync::Arc;
use web3::ethabi::{Contract, Function, Token};

use super::traits::ContractCaller;
use crate::shared::errors::ReadError;
use crate::shared::types::{Address, U256};

const LENDING_ABI: &[u8] = include_bytes!("../../../abi/lending.json");

pub const GET_CASH: &str = "getCash";
pub const BALANCE_OF: &str = "balanceOf";
pub const MARKETS: &str = "markets";
pub const GET_ACCOUNT_LIQUIDITY: &str = "getAccountLiquidity";
pub const GET_ACCOUNT_SNAPSHOT: &str = "getAccountSnapshot";
pub const GET_RESERVE_CONFIGURATION_DATA: &str = "getReserveConfigurationData";

#[derive(Debug)]
pub struct LendingAbi {
    contract: Contract,
}

impl LendingAbi {
    pub fn load() -> Result<Self, ReadError> {
        let contract = Contract::load(LENDING_ABI)
            .map_err(|e| ReadError::Decode(format!("lending ABI: {}", e)))?;
        Ok(Self { contract })
    }

    pub fn function(&self, name: &str) -> Result<&Function, ReadError> {
        self.contract
            .function(name)
            .map_err(|e| ReadError::Decode(format!("{}: {}", name, e)))
    }
}

/// Contract caller bound to the lending ABI, shared by the readers
#[derive(Clone)]
pub struct LendingContracts {
    caller: Arc<dyn ContractCaller>,
    abi: Arc<LendingAbi>,
}

impl LendingContracts {
    pub fn new(caller: Arc<dyn ContractCaller>, abi: Arc<LendingAbi>) -> Self {
        Self { caller, abi }
    }

    pub async fn query(&self, to: Address, name: &str, args: Vec<Token>) -> Result<Vec<Token>, ReadError> {
        let function = self.abi.function(name)?;
        self.caller.query(to, function, args).await
    }
}

pub fn uint_at(tokens: &[Token], index: usize) -> Result<U256, ReadError> {
    match tokens.get(index) {
        Some(Token::Uint(value)) => Ok(*value),
        other => Err(ReadError::Decode(format!("expected uint at {}, got {:?}", index, other))),
    }
}

pub fn bool_at(tokens: &[Token], index: usize) -> Result<bool, ReadError> {
    match tokens.get(index) {
        Some(Token::Bool(value)) => Ok(*value),
        other => Err(ReadError::Decode(format!("expected bool at {}, got {:?}", index, other))),
    }
}

/// Compound error codes are small enums; wider values saturate
pub fn error_code(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.low_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_match_deployed_contracts() {
        let abi = LendingAbi::load().unwrap();
        let selector = |name: &str| abi.function(name).unwrap().short_signature();

        assert_eq!(selector(GET_CASH), [0x3b, 0x1d, 0x21, 0xa2]);
        assert_eq!(selector(BALANCE_OF), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(selector(MARKETS), [0x8e, 0x8f, 0x29, 0x4b]);
        assert_eq!(selector(GET_ACCOUNT_LIQUIDITY), [0x5e, 0xc8, 0x8c, 0x79]);
        assert_eq!(selector(GET_ACCOUNT_SNAPSHOT), [0xc3, 0x7f, 0x68, 0xe2]);
        assert_eq!(selector(GET_RESERVE_CONFIGURATION_DATA), [0x3e, 0x15, 0x01, 0x41]);
    }

    #[test]
    fn test_unknown_function() {
        let abi = LendingAbi::load().unwrap();
        assert!(matches!(abi.function("borrow"), Err(ReadError::Decode(_))));
    }

    #[test]
    fn test_token_accessors() {
        let tokens = vec![Token::Bool(true), Token::Uint(U256::exp10(30))];

        assert!(bool_at(&tokens, 0).unwrap());
        assert_eq!(uint_at(&tokens, 1).unwrap(), U256::exp10(30));
        assert!(uint_at(&tokens, 0).is_err());
        assert!(bool_at(&tokens, 2).is_err());
    }

    #[test]
    fn test_error_code_saturates() {
        assert_eq!(error_code(U256::from(9u64)), 9);
        assert_eq!(error_code(U256::exp10(30)), u64::MAX);
    }
}
