use std::sync::Arc;

use super::aave_reader::AaveReader;
use super::compound_reader::CompoundReader;
use super::contracts::{LendingAbi, LendingContracts};
use super::traits::ContractCaller;
use crate::domain::position::LendingReader;
use crate::shared::errors::AppError;
use crate::shared::types::{parse_address, Address, ProtocolConfig, ProtocolFamily};

/// Factory for creating protocol readers
pub struct ReaderFactory {
    contracts: LendingContracts,
}

impl ReaderFactory {
    pub fn new(caller: Arc<dyn ContractCaller>) -> Result<Self, AppError> {
        let abi = LendingAbi::load()?;
        Ok(Self {
            contracts: LendingContracts::new(caller, Arc::new(abi)),
        })
    }

    /// Create a reader for the protocol's family
    pub fn create_reader(&self, protocol: &ProtocolConfig) -> Result<Arc<dyn LendingReader>, AppError> {
        let reader: Arc<dyn LendingReader> = match protocol.family {
            ProtocolFamily::Compound => {
                let mut reader = CompoundReader::new(self.contracts.clone());
                if let Some(comptroller) = parse_optional(&protocol.comptroller)? {
                    reader = reader.with_comptroller(comptroller);
                }
                Arc::new(reader)
            }
            ProtocolFamily::Aave => {
                let mut reader = AaveReader::new(self.contracts.clone());
                if let Some(provider) = parse_optional(&protocol.data_provider)? {
                    reader = reader.with_data_provider(provider);
                }
                Arc::new(reader)
            }
        };
        Ok(reader)
    }

    /// Reader for pool cash (no comptroller needed)
    pub fn pool_reader(&self) -> CompoundReader {
        CompoundReader::new(self.contracts.clone())
    }

    /// Reader for account liquidity on the given comptroller
    pub fn liquidity_reader(&self, comptroller: &str) -> Result<CompoundReader, AppError> {
        Ok(CompoundReader::new(self.contracts.clone()).with_comptroller(parse_address(comptroller)?))
    }
}

fn parse_optional(value: &Option<String>) -> Result<Option<Address>, AppError> {
    value.as_deref().map(parse_address).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::blockchain::fake::FakeCaller;

    fn protocol(family: ProtocolFamily, comptroller: Option<&str>) -> ProtocolConfig {
        ProtocolConfig {
            name: "P".to_string(),
            family,
            comptroller: comptroller.map(str::to_string),
            data_provider: None,
            portfolio_basis: None,
            markets: vec![],
        }
    }

    fn factory() -> ReaderFactory {
        ReaderFactory::new(Arc::new(FakeCaller::default())).unwrap()
    }

    #[test]
    fn test_create_reader_per_family() {
        let factory = factory();

        let compound = factory
            .create_reader(&protocol(
                ProtocolFamily::Compound,
                Some("0x3d9819210A31b4961b30EF54bE2aeD79B9c9Cd3B"),
            ))
            .unwrap();
        assert_eq!(compound.family(), ProtocolFamily::Compound);

        let aave = factory.create_reader(&protocol(ProtocolFamily::Aave, None)).unwrap();
        assert_eq!(aave.family(), ProtocolFamily::Aave);
    }

    #[test]
    fn test_create_reader_rejects_bad_address() {
        let factory = factory();
        assert!(factory
            .create_reader(&protocol(ProtocolFamily::Compound, Some("0x1234")))
            .is_err());
        assert!(factory.liquidity_reader("comptroller").is_err());
    }
}
