//! Compound v2 family reader (cToken + comptroller)

use async_trait::async_trait;
use web3::ethabi::Token;

use super::contracts::{
    bool_at, error_code, uint_at, LendingContracts, GET_ACCOUNT_LIQUIDITY, GET_ACCOUNT_SNAPSHOT, GET_CASH,
    MARKETS,
};
use crate::domain::liquidity::{PoolCashSource, PoolDefinition};
use crate::domain::monitor::{AccountLiquidity, AccountLiquiditySource};
use crate::domain::position::{LendingReader, MarketDefinition, MarketSnapshot};
use crate::shared::errors::ReadError;
use crate::shared::types::{Address, ProtocolFamily, U256};
use crate::shared::utils::to_units;

const MANTISSA_DECIMALS: u8 = 18;

/// Reads cToken markets, pool cash and comptroller account liquidity
pub struct CompoundReader {
    contracts: LendingContracts,
    comptroller: Option<Address>,
}

impl CompoundReader {
    pub fn new(contracts: LendingContracts) -> Self {
        Self {
            contracts,
            comptroller: None,
        }
    }

    pub fn with_comptroller(mut self, comptroller: Address) -> Self {
        self.comptroller = Some(comptroller);
        self
    }

    fn comptroller(&self) -> Result<Address, ReadError> {
        self.comptroller
            .ok_or_else(|| ReadError::MissingContract("comptroller".to_string()))
    }

    /// (error, cToken balance, borrow balance, exchange rate) in one round
    async fn account_snapshot(&self, c_token: Address, account: Address) -> Result<[U256; 4], ReadError> {
        let out = self
            .contracts
            .query(c_token, GET_ACCOUNT_SNAPSHOT, vec![Token::Address(account)])
            .await?;
        Ok([
            uint_at(&out, 0)?,
            uint_at(&out, 1)?,
            uint_at(&out, 2)?,
            uint_at(&out, 3)?,
        ])
    }

    async fn collateral_factor(&self, market: &MarketDefinition, c_token: Address) -> Result<f64, ReadError> {
        if let Some(cf) = market.collateral_factor {
            return Ok(cf);
        }

        // markets(cToken) -> (isListed, collateralFactorMantissa, isComped)
        let out = self
            .contracts
            .query(self.comptroller()?, MARKETS, vec![Token::Address(c_token)])
            .await?;
        if !bool_at(&out, 0)? {
            return Err(ReadError::MissingCollateralFactor(market.symbol.clone()));
        }
        Ok(to_units(uint_at(&out, 1)?, MANTISSA_DECIMALS))
    }
}

#[async_trait]
impl LendingReader for CompoundReader {
    fn family(&self) -> ProtocolFamily {
        ProtocolFamily::Compound
    }

    async fn read_market(
        &self,
        account: &Address,
        market: &MarketDefinition,
    ) -> Result<MarketSnapshot, ReadError> {
        let c_token = *market.contract(0)?;

        let (snapshot, collateral_factor) = tokio::try_join!(
            self.account_snapshot(c_token, *account),
            self.collateral_factor(market, c_token),
        )?;

        let [code, supplied_raw, borrowed_raw, rate] = snapshot;
        if !code.is_zero() {
            return Err(ReadError::ContractError(error_code(code)));
        }

        MarketSnapshot::new(
            market.symbol.clone(),
            supplied_raw,
            borrowed_raw,
            rate,
            collateral_factor,
        )
    }
}

#[async_trait]
impl PoolCashSource for CompoundReader {
    async fn get_cash(&self, pool: &PoolDefinition) -> Result<f64, ReadError> {
        let out = self.contracts.query(pool.address, GET_CASH, vec![]).await?;
        Ok(to_units(uint_at(&out, 0)?, pool.decimals))
    }
}

#[async_trait]
impl AccountLiquiditySource for CompoundReader {
    async fn account_liquidity(&self, account: &Address) -> Result<AccountLiquidity, ReadError> {
        let out = self
            .contracts
            .query(self.comptroller()?, GET_ACCOUNT_LIQUIDITY, vec![Token::Address(*account)])
            .await?;

        Ok(AccountLiquidity {
            error_code: error_code(uint_at(&out, 0)?),
            liquidity: to_units(uint_at(&out, 1)?, MANTISSA_DECIMALS),
            shortfall: to_units(uint_at(&out, 2)?, MANTISSA_DECIMALS),
        })
    }
}
