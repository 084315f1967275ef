//! Eligibility resolution
//!
//! The local dataset only tells us which proof to submit. Every figure in an
//! [`EligibilityResult`] comes from the ledger on the current request, so the
//! gateway cannot drift from chain state and keeps nothing to re-sync.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{B256, U256};

use crate::address::{normalize, CanonicalAddress};
use crate::allocation::AllocationIndex;
use crate::ledger::{guarded, LedgerGateway};
use crate::Result;

/// Default deadline for a single ledger call
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(10);

/// Claim state of one address, as of this request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityResult {
    pub address: CanonicalAddress,
    pub has_claimed: bool,
    pub claimable_amount: U256,
    /// Proof from the dataset, empty when the address has no allocation
    pub proof: Vec<B256>,
}

impl EligibilityResult {
    /// True when a claim transaction would currently make sense
    pub fn can_claim(&self) -> bool {
        !self.has_claimed && !self.claimable_amount.is_zero() && !self.proof.is_empty()
    }
}

/// Combines the allocation index with live ledger reads
pub struct EligibilityResolver<L> {
    index: Arc<AllocationIndex>,
    ledger: Arc<L>,
    ledger_timeout: Duration,
}

impl<L> Clone for EligibilityResolver<L> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            ledger: Arc::clone(&self.ledger),
            ledger_timeout: self.ledger_timeout,
        }
    }
}

impl<L: LedgerGateway> EligibilityResolver<L> {
    pub fn new(index: Arc<AllocationIndex>, ledger: Arc<L>) -> Self {
        Self {
            index,
            ledger,
            ledger_timeout: DEFAULT_LEDGER_TIMEOUT,
        }
    }

    /// Set the deadline applied to each ledger call
    pub fn with_ledger_timeout(mut self, timeout: Duration) -> Self {
        self.ledger_timeout = timeout;
        self
    }

    pub fn index(&self) -> &AllocationIndex {
        &self.index
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn ledger_timeout(&self) -> Duration {
        self.ledger_timeout
    }

    /// Resolve the claim state of a raw address string.
    ///
    /// Malformed input fails before any ledger call. Any ledger failure fails
    /// the whole resolution.
    pub async fn resolve(&self, raw_address: &str) -> Result<EligibilityResult> {
        let address = normalize(raw_address)?;
        self.resolve_address(address).await
    }

    /// Resolve an already-normalized address
    pub async fn resolve_address(&self, address: CanonicalAddress) -> Result<EligibilityResult> {
        let timeout = self.ledger_timeout;

        let result = match self.index.lookup(&address) {
            Some(record) => {
                let (has_claimed, claimable_amount) = tokio::try_join!(
                    guarded("hasClaimed", timeout, self.ledger.has_claimed(address)),
                    guarded(
                        "getClaimableAmount",
                        timeout,
                        self.ledger
                            .claimable_amount(address, record.amount, &record.proof)
                    ),
                )?;

                EligibilityResult {
                    address,
                    has_claimed,
                    claimable_amount,
                    proof: record.proof.clone(),
                }
            }
            None => {
                // Claims can land through channels outside the local dataset
                let has_claimed =
                    guarded("hasClaimed", timeout, self.ledger.has_claimed(address)).await?;

                EligibilityResult {
                    address,
                    has_claimed,
                    claimable_amount: U256::ZERO,
                    proof: Vec::new(),
                }
            }
        };

        tracing::debug!(
            address = %address,
            in_dataset = self.index.contains(&address),
            has_claimed = result.has_claimed,
            claimable = %result.claimable_amount,
            "Resolved eligibility"
        );

        Ok(result)
    }
}
