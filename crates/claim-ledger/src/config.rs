//! Immutable ledger network configuration

use alloy_primitives::Address;
use claim_core::{normalize, TokenContracts};

use crate::error::{LedgerClientError, Result};

/// Everything a ledger client needs to know about one network.
///
/// Passed to [`crate::RpcLedger::connect`] by value; two configs for different
/// networks can live side by side in one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Human-readable network label, used in logs only
    pub network: String,
    pub rpc_url: String,
    /// Merkle distribution contract
    pub claim_contract: Address,
    pub tokens: TokenContracts,
}

impl LedgerConfig {
    /// Build a config from user-supplied address strings
    pub fn parse(
        network: impl Into<String>,
        rpc_url: impl Into<String>,
        claim_contract: &str,
        legacy_token: &str,
        wrapped_token: &str,
    ) -> Result<Self> {
        Ok(Self {
            network: network.into(),
            rpc_url: rpc_url.into(),
            claim_contract: contract("claim", claim_contract)?,
            tokens: TokenContracts {
                legacy: contract("legacy token", legacy_token)?,
                wrapped: contract("wrapped token", wrapped_token)?,
            },
        })
    }
}

fn contract(role: &'static str, value: &str) -> Result<Address> {
    normalize(value)
        .map(Address::from)
        .map_err(|source| LedgerClientError::InvalidContract { role, source })
}
