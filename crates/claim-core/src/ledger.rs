//! Read-only view of the external ledger
//!
//! The [`LedgerGateway`] trait is the seam between the gateway logic and the
//! chain. Implementations perform no retries and enforce no timeouts; callers
//! wrap each call with [`guarded`].

use std::future::Future;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};

use crate::address::CanonicalAddress;
use crate::error::GatewayError;
use crate::Result;

/// Aggregate distribution figures reported by the claim contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimStats {
    pub total_allocated: U256,
    pub total_claimed: U256,
    pub remaining_allocated: U256,
    pub contract_balance: U256,
}

/// Token contracts involved in wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenContracts {
    /// Original token, wrapped via `approveAndCall`
    pub legacy: Address,
    /// Wrapper token, unwrapped via `unwrap`
    pub wrapped: Address,
}

/// Read-only ledger operations.
///
/// Every call either returns the ledger's current answer or fails with
/// [`GatewayError::LedgerUnavailable`] / [`GatewayError::LedgerCallReverted`].
pub trait LedgerGateway: Send + Sync {
    fn is_claim_enabled(&self) -> impl Future<Output = Result<bool>> + Send;

    fn has_claimed(&self, account: CanonicalAddress) -> impl Future<Output = Result<bool>> + Send;

    /// Remaining entitlement for `account`, verified by the ledger against
    /// `allocated` and `proof`.
    fn claimable_amount(
        &self,
        account: CanonicalAddress,
        allocated: U256,
        proof: &[B256],
    ) -> impl Future<Output = Result<U256>> + Send;

    fn stats(&self) -> impl Future<Output = Result<ClaimStats>> + Send;

    fn balance_of(
        &self,
        token: Address,
        account: CanonicalAddress,
    ) -> impl Future<Output = Result<U256>> + Send;
}

/// Run a ledger call under a deadline. An elapsed deadline is reported as
/// [`GatewayError::LedgerUnavailable`].
pub async fn guarded<T>(
    operation: &'static str,
    timeout: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "Ledger call timed out"
            );
            Err(GatewayError::LedgerUnavailable(format!(
                "{operation} timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}
