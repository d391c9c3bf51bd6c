use std::collections::HashMap;

use log::*;
use thiserror::Error;

use super::address::to_checksum_address;
use crate::db_types::CollectionId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionRegistryError {
    #[error("Invalid collection entry '{0}'. Expected name=0xContractAddress")]
    InvalidEntry(String),
    #[error("Contract {0} is registered more than once")]
    DuplicateContract(String),
}

/// Maps NFT contract addresses onto the collections this deployment tracks.
///
/// Orders and balances for contracts that are not registered belong to someone else's deployment and are skipped by
/// every reconciler.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    by_contract: HashMap<String, CollectionId>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: &str, contract_address: &str) -> Self {
        self.by_contract.insert(to_checksum_address(contract_address), CollectionId::from(name.trim()));
        self
    }

    /// Parses a comma-separated list of `name=0xContractAddress` pairs. Empty entries are ignored.
    pub fn parse(value: &str) -> Result<Self, CollectionRegistryError> {
        let mut by_contract = HashMap::new();
        for entry in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, contract) = entry
                .split_once('=')
                .map(|(n, c)| (n.trim(), c.trim()))
                .filter(|(n, c)| !n.is_empty() && !c.is_empty())
                .ok_or_else(|| CollectionRegistryError::InvalidEntry(entry.to_string()))?;
            let contract = to_checksum_address(contract);
            if by_contract.insert(contract.clone(), CollectionId::from(name)).is_some() {
                return Err(CollectionRegistryError::DuplicateContract(contract));
            }
        }
        Ok(Self { by_contract })
    }

    pub fn resolve(&self, contract_address: &str) -> Option<CollectionId> {
        let result = self.by_contract.get(&to_checksum_address(contract_address)).cloned();
        if result.is_none() {
            trace!("🔖️ Contract {contract_address} is not a tracked collection");
        }
        result
    }

    pub fn len(&self) -> usize {
        self.by_contract.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_contract.is_empty()
    }

    pub fn collections(&self) -> impl Iterator<Item = (&CollectionId, &str)> {
        self.by_contract.iter().map(|(contract, id)| (id, contract.as_str()))
    }
}
