//! Aave family reader (aToken / debt token balances)

use async_trait::async_trait;
use web3::ethabi::Token;

use super::contracts::{uint_at, LendingContracts, BALANCE_OF, GET_RESERVE_CONFIGURATION_DATA};
use crate::domain::position::{LendingReader, MarketDefinition, MarketSnapshot};
use crate::shared::errors::ReadError;
use crate::shared::types::{Address, ProtocolFamily, U256};
use crate::shared::utils::u256_to_f64;

/// aToken balances are already in underlying units: rate 1.0 at WAD scale
pub const AAVE_UNIT_RATE: u64 = 1_000_000_000_000_000_000;

const BASIS_POINTS: f64 = 10_000.0;

/// Market contracts: [aToken, variableDebtToken, underlying, stableDebtToken?]
pub struct AaveReader {
    contracts: LendingContracts,
    data_provider: Option<Address>,
}

impl AaveReader {
    pub fn new(contracts: LendingContracts) -> Self {
        Self {
            contracts,
            data_provider: None,
        }
    }

    pub fn with_data_provider(mut self, data_provider: Address) -> Self {
        self.data_provider = Some(data_provider);
        self
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, ReadError> {
        let out = self
            .contracts
            .query(token, BALANCE_OF, vec![Token::Address(account)])
            .await?;
        uint_at(&out, 0)
    }

    /// Variable plus stable debt; markets without a stable debt token carry none
    async fn borrowed(&self, market: &MarketDefinition, account: Address) -> Result<U256, ReadError> {
        let variable_debt = *market.contract(1)?;
        let stable_debt = market.contracts.get(3).copied();

        let (variable, stable) = tokio::try_join!(self.balance_of(variable_debt, account), async {
            match stable_debt {
                Some(token) => self.balance_of(token, account).await,
                None => Ok(U256::zero()),
            }
        })?;
        Ok(variable.saturating_add(stable))
    }

    /// Liquidation threshold of the reserve, used as the collateral factor
    async fn collateral_factor(&self, market: &MarketDefinition) -> Result<f64, ReadError> {
        if let Some(cf) = market.collateral_factor {
            return Ok(cf);
        }

        let (provider, underlying) = match (self.data_provider, market.contracts.get(2)) {
            (Some(provider), Some(underlying)) => (provider, *underlying),
            _ => return Err(ReadError::MissingCollateralFactor(market.symbol.clone())),
        };

        // (decimals, ltv, liquidationThreshold, ...)
        let out = self
            .contracts
            .query(provider, GET_RESERVE_CONFIGURATION_DATA, vec![Token::Address(underlying)])
            .await?;
        Ok(u256_to_f64(uint_at(&out, 2)?) / BASIS_POINTS)
    }
}

#[async_trait]
impl LendingReader for AaveReader {
    fn family(&self) -> ProtocolFamily {
        ProtocolFamily::Aave
    }

    async fn read_market(
        &self,
        account: &Address,
        market: &MarketDefinition,
    ) -> Result<MarketSnapshot, ReadError> {
        let a_token = *market.contract(0)?;

        let (supplied_raw, borrowed_raw, collateral_factor) = tokio::try_join!(
            self.balance_of(a_token, *account),
            self.borrowed(market, *account),
            self.collateral_factor(market),
        )?;

        MarketSnapshot::new(
            market.symbol.clone(),
            supplied_raw,
            borrowed_raw,
            U256::from(AAVE_UNIT_RATE),
            collateral_factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{borrowed_underlying, supplied_underlying};
    use crate::infrastructure::blockchain::fake::{addr, uints, FakeCaller};

    fn a_weth(contracts: Vec<Address>, collateral_factor: Option<f64>) -> MarketDefinition {
        MarketDefinition {
            symbol: "WETH".to_string(),
            protocol: "Aave".to_string(),
            contracts,
            asset_decimals: 18,
            balance_decimals: 18,
            rate_scale: None,
            price_id: Some("ethereum".to_string()),
            collateral_factor,
        }
    }

    fn balance(caller: FakeCaller, token: Address, account: Address, value: u128) -> FakeCaller {
        caller.with(token, BALANCE_OF, vec![Token::Address(account)], uints(&[value]))
    }

    fn balances(account: Address) -> FakeCaller {
        let caller = balance(FakeCaller::default(), addr(0xa1), account, 1_500_000_000_000_000_000);
        balance(caller, addr(0xd1), account, 250_000_000_000_000_000)
    }

    #[tokio::test]
    async fn test_read_market_with_data_provider() {
        let account = addr(0xaa);
        let mut reserve = uints(&[18, 8000, 8250, 10500, 1000]);
        reserve.extend([true, true, true, true, false].map(Token::Bool));
        let caller = balances(account).with(
            addr(0xdd),
            GET_RESERVE_CONFIGURATION_DATA,
            vec![Token::Address(addr(0x0e))],
            reserve,
        );
        let reader = AaveReader::new(caller.into_contracts()).with_data_provider(addr(0xdd));
        let market = a_weth(vec![addr(0xa1), addr(0xd1), addr(0x0e)], None);

        let snapshot = reader.read_market(&account, &market).await.unwrap();
        assert!((snapshot.collateral_factor - 0.825).abs() < 1e-12);
        assert_eq!(snapshot.borrowed_raw, U256::from(250_000_000_000_000_000u64));
        assert!((supplied_underlying(&snapshot, &market) - 1.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_stable_debt_is_added_to_variable_debt() {
        let account = addr(0xaa);
        let caller = balance(balances(account), addr(0x5d), account, 100_000_000_000_000_000);
        let reader = AaveReader::new(caller.into_contracts());
        let market = a_weth(vec![addr(0xa1), addr(0xd1), addr(0x0e), addr(0x5d)], Some(0.8));

        let snapshot = reader.read_market(&account, &market).await.unwrap();
        assert_eq!(snapshot.borrowed_raw, U256::from(350_000_000_000_000_000u64));
        assert!((borrowed_underlying(&snapshot, &market) - 0.35).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_stable_debt_read_failure_fails_market() {
        let account = addr(0xaa);
        // stable debt token configured but reverts
        let reader = AaveReader::new(balances(account).into_contracts());
        let market = a_weth(vec![addr(0xa1), addr(0xd1), addr(0x0e), addr(0x5d)], Some(0.8));

        assert!(matches!(
            reader.read_market(&account, &market).await,
            Err(ReadError::Rpc(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_collateral_factor() {
        let account = addr(0xaa);
        let reader = AaveReader::new(balances(account).into_contracts());
        let market = a_weth(vec![addr(0xa1), addr(0xd1)], None);

        assert_eq!(
            reader.read_market(&account, &market).await.unwrap_err(),
            ReadError::MissingCollateralFactor("WETH".to_string())
        );
    }

    #[tokio::test]
    async fn test_override_and_missing_debt_token() {
        let account = addr(0xaa);
        let reader = AaveReader::new(balances(account).into_contracts());

        let ok = a_weth(vec![addr(0xa1), addr(0xd1)], Some(0.8));
        assert_eq!(reader.read_market(&account, &ok).await.unwrap().collateral_factor, 0.8);

        let broken = a_weth(vec![addr(0xa1)], Some(0.8));
        assert_eq!(
            reader.read_market(&account, &broken).await.unwrap_err(),
            ReadError::MissingContract("WETH".to_string())
        );
    }
}
