//! Shared server state
//!
//! Everything in here is immutable after startup. Each request works on its
//! own values; the only shared pieces are the allocation index and the
//! stateless ledger client, both behind `Arc`.

use std::sync::Arc;
use std::time::Instant;

use alloy_primitives::{Address, U256};
use claim_core::{
    guarded, normalize, AllocationIndex, CanonicalAddress, ClaimStats, EligibilityResolver,
    EligibilityResult, InstructionBuilder, LedgerGateway, TokenContracts,
};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::metrics;
use crate::retry::RetryPolicy;

pub struct AppState<L> {
    pub resolver: EligibilityResolver<L>,
    pub instructions: InstructionBuilder,
    pub retry: RetryPolicy,
    pub claims_enabled: bool,
}

pub type SharedState<L> = Arc<AppState<L>>;

pub fn create_shared_state<L: LedgerGateway>(
    index: Arc<AllocationIndex>,
    ledger: Arc<L>,
    tokens: TokenContracts,
    config: &ServerConfig,
) -> SharedState<L> {
    Arc::new(AppState::new(index, ledger, tokens, config))
}

impl<L: LedgerGateway> AppState<L> {
    pub fn new(
        index: Arc<AllocationIndex>,
        ledger: Arc<L>,
        tokens: TokenContracts,
        config: &ServerConfig,
    ) -> Self {
        Self {
            resolver: EligibilityResolver::new(index, ledger)
                .with_ledger_timeout(config.ledger_timeout),
            instructions: InstructionBuilder::new(tokens),
            retry: config.retry,
            claims_enabled: config.claims_enabled,
        }
    }

    pub fn tokens(&self) -> TokenContracts {
        self.instructions.contracts()
    }

    /// Whether claiming is open. A gateway with claims disabled answers
    /// `false` without asking the ledger.
    pub async fn claim_enabled(&self) -> Result<bool> {
        if !self.claims_enabled {
            return Ok(false);
        }

        let ledger = self.resolver.ledger();
        let timeout = self.resolver.ledger_timeout();
        self.retry
            .run("isClaimEnabled", || {
                guarded("isClaimEnabled", timeout, ledger.is_claim_enabled())
            })
            .await
            .map_err(observed)
    }

    pub async fn stats(&self) -> Result<ClaimStats> {
        self.require_claims()?;

        let ledger = self.resolver.ledger();
        let timeout = self.resolver.ledger_timeout();
        self.retry
            .run("getStats", || guarded("getStats", timeout, ledger.stats()))
            .await
            .map_err(observed)
    }

    pub async fn check_claim(&self, raw_address: &str) -> Result<EligibilityResult> {
        self.require_claims()?;

        let address = normalize(raw_address)?;
        let started = Instant::now();
        let result = self
            .retry
            .run("resolve", || self.resolver.resolve_address(address))
            .await;

        metrics::record_resolution(started.elapsed(), result.as_ref().err());
        Ok(result?)
    }

    /// Balance of `address` on `token`
    pub async fn balance(&self, token: Address, address: CanonicalAddress) -> Result<U256> {
        let ledger = self.resolver.ledger();
        let timeout = self.resolver.ledger_timeout();
        self.retry
            .run("balanceOf", || {
                guarded("balanceOf", timeout, ledger.balance_of(token, address))
            })
            .await
            .map_err(observed)
    }

    fn require_claims(&self) -> Result<()> {
        if self.claims_enabled {
            Ok(())
        } else {
            Err(ServerError::ClaimsDisabled)
        }
    }
}

/// Count a ledger failure on its way out
fn observed(err: claim_core::GatewayError) -> ServerError {
    metrics::record_error(&err);
    ServerError::Gateway(err)
}
