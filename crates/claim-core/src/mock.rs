//! In-memory ledger for tests and local runs
//!
//! Responses, failures and latency are programmable per method, and every
//! call is counted so tests can assert which ledger reads happened.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};

use crate::address::CanonicalAddress;
use crate::error::GatewayError;
use crate::ledger::{ClaimStats, LedgerGateway};
use crate::Result;

/// Ledger operations, for call counting and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerMethod {
    IsClaimEnabled,
    HasClaimed,
    ClaimableAmount,
    Stats,
    BalanceOf,
}

impl LedgerMethod {
    const ALL: [LedgerMethod; 5] = [
        LedgerMethod::IsClaimEnabled,
        LedgerMethod::HasClaimed,
        LedgerMethod::ClaimableAmount,
        LedgerMethod::Stats,
        LedgerMethod::BalanceOf,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Default)]
struct MockState {
    claim_enabled: bool,
    claimed: HashSet<CanonicalAddress>,
    claimable: HashMap<CanonicalAddress, U256>,
    stats: ClaimStats,
    balances: HashMap<(Address, CanonicalAddress), U256>,
    failures: HashMap<LedgerMethod, GatewayError>,
    delays: HashMap<LedgerMethod, Duration>,
    /// Failures that clear themselves after firing once
    transient: HashMap<LedgerMethod, usize>,
    last_claimable_args: Option<(U256, Vec<B256>)>,
}

/// Programmable [`LedgerGateway`]
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,
    calls: [AtomicUsize; 5],
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_claim_enabled(&self, enabled: bool) {
        self.with_state(|s| s.claim_enabled = enabled);
    }

    pub fn set_claimed(&self, account: CanonicalAddress, claimed: bool) {
        self.with_state(|s| {
            if claimed {
                s.claimed.insert(account);
            } else {
                s.claimed.remove(&account);
            }
        });
    }

    /// Amount returned by `claimable_amount` for `account` (zero when unset)
    pub fn set_claimable(&self, account: CanonicalAddress, amount: U256) {
        self.with_state(|s| {
            s.claimable.insert(account, amount);
        });
    }

    pub fn set_stats(&self, stats: ClaimStats) {
        self.with_state(|s| s.stats = stats);
    }

    pub fn set_balance(&self, token: Address, account: CanonicalAddress, balance: U256) {
        self.with_state(|s| {
            s.balances.insert((token, account), balance);
        });
    }

    /// Make every call to `method` fail with `error`
    pub fn fail(&self, method: LedgerMethod, error: GatewayError) {
        self.with_state(|s| {
            s.failures.insert(method, error);
        });
    }

    /// Make the next `times` calls to `method` fail with `error`, then recover
    pub fn fail_times(&self, method: LedgerMethod, error: GatewayError, times: usize) {
        self.with_state(|s| {
            s.failures.insert(method, error);
            s.transient.insert(method, times);
        });
    }

    pub fn clear_failures(&self) {
        self.with_state(|s| {
            s.failures.clear();
            s.transient.clear();
        });
    }

    /// Delay every call to `method` before answering
    pub fn set_delay(&self, method: LedgerMethod, delay: Duration) {
        self.with_state(|s| {
            s.delays.insert(method, delay);
        });
    }

    /// Number of calls made to `method`
    pub fn calls(&self, method: LedgerMethod) -> usize {
        self.calls[method.slot()].load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        LedgerMethod::ALL.iter().map(|m| self.calls(*m)).sum()
    }

    /// Amount and proof passed to the most recent `claimable_amount` call
    pub fn last_claimable_args(&self) -> Option<(U256, Vec<B256>)> {
        self.with_state(|s| s.last_claimable_args.clone())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    /// Count the call, apply its delay and injected failure
    async fn enter(&self, method: LedgerMethod) -> Result<()> {
        self.calls[method.slot()].fetch_add(1, Ordering::SeqCst);

        let delay = self.with_state(|s| s.delays.get(&method).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.with_state(|s| {
            let Some(error) = s.failures.get(&method).cloned() else {
                return Ok(());
            };
            if let Some(remaining) = s.transient.get_mut(&method) {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    s.transient.remove(&method);
                    s.failures.remove(&method);
                }
            }
            Err(error)
        })
    }
}

impl LedgerGateway for MockLedger {
    async fn is_claim_enabled(&self) -> Result<bool> {
        self.enter(LedgerMethod::IsClaimEnabled).await?;
        Ok(self.with_state(|s| s.claim_enabled))
    }

    async fn has_claimed(&self, account: CanonicalAddress) -> Result<bool> {
        self.enter(LedgerMethod::HasClaimed).await?;
        Ok(self.with_state(|s| s.claimed.contains(&account)))
    }

    async fn claimable_amount(
        &self,
        account: CanonicalAddress,
        allocated: U256,
        proof: &[B256],
    ) -> Result<U256> {
        self.enter(LedgerMethod::ClaimableAmount).await?;
        Ok(self.with_state(|s| {
            s.last_claimable_args = Some((allocated, proof.to_vec()));
            s.claimable.get(&account).copied().unwrap_or_default()
        }))
    }

    async fn stats(&self) -> Result<ClaimStats> {
        self.enter(LedgerMethod::Stats).await?;
        Ok(self.with_state(|s| s.stats))
    }

    async fn balance_of(&self, token: Address, account: CanonicalAddress) -> Result<U256> {
        self.enter(LedgerMethod::BalanceOf).await?;
        Ok(self.with_state(|s| {
            s.balances
                .get(&(token, account))
                .copied()
                .unwrap_or_default()
        }))
    }
}
