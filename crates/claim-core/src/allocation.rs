//! Allocation index: maps a canonical address to its allocation record
//!
//! Built once at startup from the static distribution dataset and never
//! mutated afterwards, so lookups need no synchronization.
//!
//! ## Dataset format
//!
//! ```json
//! {
//!   "merkleRoot": "0x…",
//!   "allocations": [
//!     { "address": "0x…", "amount": "100000", "proof": ["0x…", "0x…"] }
//!   ]
//! }
//! ```
//!
//! Amounts are decimal strings in base units. Every malformed field and every
//! duplicate address (after normalization) is reported as
//! [`GatewayError::DatasetCorruption`]; there is no partial load.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use crate::address::{normalize, CanonicalAddress};
use crate::error::GatewayError;
use crate::Result;

/// One entry of the distribution as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub address: String,
    pub amount: String,
    #[serde(default)]
    pub proof: Vec<String>,
}

/// The on-disk dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDataset {
    #[serde(default)]
    pub merkle_root: Option<String>,
    pub allocations: Vec<AllocationEntry>,
}

/// A validated allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    pub address: CanonicalAddress,
    /// Originally allocated quantity in base units
    pub amount: U256,
    /// Merkle proof the ledger verifies against its committed root
    pub proof: Vec<B256>,
}

/// Immutable address -> allocation map
#[derive(Debug, Default)]
pub struct AllocationIndex {
    records: HashMap<CanonicalAddress, AllocationRecord>,
    merkle_root: Option<B256>,
    total_allocated: U256,
}

impl AllocationIndex {
    /// Build an index from raw entries.
    ///
    /// Fails on the first malformed entry or duplicate address.
    pub fn build(entries: impl IntoIterator<Item = AllocationEntry>) -> Result<Self> {
        let mut records = HashMap::new();
        let mut total_allocated = U256::ZERO;

        for (position, entry) in entries.into_iter().enumerate() {
            let record = parse_entry(position, &entry)?;

            total_allocated = total_allocated.checked_add(record.amount).ok_or_else(|| {
                GatewayError::DatasetCorruption("total allocation overflows uint256".to_string())
            })?;

            if records.contains_key(&record.address) {
                return Err(GatewayError::DatasetCorruption(format!(
                    "entry {}: duplicate address {}",
                    position, record.address
                )));
            }
            records.insert(record.address, record);
        }

        Ok(Self {
            records,
            merkle_root: None,
            total_allocated,
        })
    }

    /// Build an index from a parsed dataset, including its Merkle root
    pub fn from_dataset(dataset: AllocationDataset) -> Result<Self> {
        let merkle_root = dataset
            .merkle_root
            .as_deref()
            .map(|root| {
                B256::from_str(root).map_err(|e| {
                    GatewayError::DatasetCorruption(format!("merkleRoot {root:?}: {e}"))
                })
            })
            .transpose()?;

        let mut index = Self::build(dataset.allocations)?;
        index.merkle_root = merkle_root;
        Ok(index)
    }

    /// Parse a dataset from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: AllocationDataset = serde_json::from_str(json)
            .map_err(|e| GatewayError::DatasetCorruption(format!("invalid JSON: {e}")))?;
        Self::from_dataset(dataset)
    }

    /// Load the dataset file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::DatasetCorruption(format!("cannot read {}: {e}", path.display()))
        })?;
        let index = Self::from_json_str(&json)?;

        tracing::info!(
            path = %path.display(),
            records = index.len(),
            total_allocated = %index.total_allocated,
            merkle_root = ?index.merkle_root,
            "Loaded allocation dataset"
        );

        Ok(index)
    }

    /// Look up the allocation for an address
    pub fn lookup(&self, address: &CanonicalAddress) -> Option<&AllocationRecord> {
        self.records.get(address)
    }

    pub fn contains(&self, address: &CanonicalAddress) -> bool {
        self.records.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all allocated amounts in the dataset
    pub fn total_allocated(&self) -> U256 {
        self.total_allocated
    }

    pub fn merkle_root(&self) -> Option<B256> {
        self.merkle_root
    }
}

fn parse_entry(position: usize, entry: &AllocationEntry) -> Result<AllocationRecord> {
    let corrupt = |what: String| GatewayError::DatasetCorruption(format!("entry {position}: {what}"));

    let address = normalize(&entry.address).map_err(|e| corrupt(e.to_string()))?;

    let amount = U256::from_str_radix(entry.amount.trim(), 10)
        .map_err(|e| corrupt(format!("amount {:?}: {e}", entry.amount)))?;

    let proof = entry
        .proof
        .iter()
        .map(|node| {
            B256::from_str(node.trim()).map_err(|e| corrupt(format!("proof node {node:?}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AllocationRecord {
        address,
        amount,
        proof,
    })
}
