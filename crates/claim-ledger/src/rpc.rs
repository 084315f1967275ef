//! JSON-RPC ledger client
//!
//! Every operation is a single `eth_call` against the latest block, encoded
//! and decoded through the typed descriptors in [`claim_core::abi`].

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;

use claim_core::abi::{IERC20Balance, IMerkleClaim};
use claim_core::{CanonicalAddress, ClaimStats, GatewayError, LedgerGateway};

use crate::config::LedgerConfig;
use crate::error::{classify, LedgerClientError, Result};

/// Read-only ledger client over an HTTP JSON-RPC endpoint
#[derive(Clone)]
pub struct RpcLedger {
    provider: DynProvider,
    config: LedgerConfig,
}

impl RpcLedger {
    /// Create a client for the network described by `config`.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn connect(config: LedgerConfig) -> Result<Self> {
        let url = config.rpc_url.parse::<reqwest::Url>().map_err(|e| {
            LedgerClientError::InvalidRpcUrl {
                url: config.rpc_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        tracing::info!(
            network = %config.network,
            claim_contract = %config.claim_contract,
            legacy_token = %config.tokens.legacy,
            wrapped_token = %config.tokens.wrapped,
            "Ledger client configured"
        );

        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Execute a view call and decode its return value
    async fn view<C>(&self, to: Address, call: C) -> claim_core::Result<C::Return>
    where
        C: SolCall + Send + Sync,
    {
        let input = Bytes::from(call.abi_encode());
        let request = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::new(input));

        tracing::trace!(contract = %to, function = C::SIGNATURE, "eth_call");

        let output = self
            .provider
            .call(request)
            .await
            .map_err(|e| classify(C::SIGNATURE, e))?;

        C::abi_decode_returns(&output).map_err(|e| {
            GatewayError::LedgerCallReverted(format!(
                "{}: undecodable return data ({} bytes): {e}",
                C::SIGNATURE,
                output.len()
            ))
        })
    }
}

impl LedgerGateway for RpcLedger {
    async fn is_claim_enabled(&self) -> claim_core::Result<bool> {
        self.view(self.config.claim_contract, IMerkleClaim::isClaimEnabledCall {})
            .await
    }

    async fn has_claimed(&self, account: CanonicalAddress) -> claim_core::Result<bool> {
        self.view(
            self.config.claim_contract,
            IMerkleClaim::hasClaimedCall {
                account: account.address(),
            },
        )
        .await
    }

    async fn claimable_amount(
        &self,
        account: CanonicalAddress,
        allocated: U256,
        proof: &[B256],
    ) -> claim_core::Result<U256> {
        self.view(
            self.config.claim_contract,
            IMerkleClaim::getClaimableAmountCall {
                account: account.address(),
                amount: allocated,
                proof: proof.to_vec(),
            },
        )
        .await
    }

    async fn stats(&self) -> claim_core::Result<ClaimStats> {
        let stats = self
            .view(self.config.claim_contract, IMerkleClaim::getStatsCall {})
            .await?;

        Ok(ClaimStats {
            total_allocated: stats.totalAllocated,
            total_claimed: stats.totalClaimed,
            remaining_allocated: stats.remainingAllocated,
            contract_balance: stats.contractBalance,
        })
    }

    async fn balance_of(&self, token: Address, account: CanonicalAddress) -> claim_core::Result<U256> {
        self.view(
            token,
            IERC20Balance::balanceOfCall {
                account: account.address(),
            },
        )
        .await
    }
}
