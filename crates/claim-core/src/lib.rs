//! claim-core: eligibility resolution and wrap/unwrap orchestration
//!
//! This crate holds everything the claim gateway decides on its own:
//! - Address normalization (EIP-55)
//! - The immutable allocation index loaded from the distribution dataset
//! - The read-only [`LedgerGateway`] seam over the claim contract
//! - Eligibility resolution combining the two
//! - Wrap/unwrap instruction building
//!
//! # Consistency Model
//!
//! | Figure | Source |
//! |--------|--------|
//! | Allocation amount, Merkle proof | Local dataset (hint only) |
//! | Has claimed | Ledger, every request |
//! | Claimable amount | Ledger, every request, given the local proof |
//! | Stats, balances | Ledger, every request |
//!
//! Nothing read from the ledger is cached. A resolution either returns a
//! complete answer from the current request's ledger reads or fails as a
//! whole.
//!
//! # Errors
//!
//! Input errors (`InvalidAddress`, `InvalidAmount`) are raised before any
//! ledger call. Ledger failures are split into `LedgerUnavailable` (transient)
//! and `LedgerCallReverted` (permanent for that input) so callers can retry
//! only the former.

pub mod abi;
mod address;
mod allocation;
mod error;
mod instructions;
mod ledger;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod resolver;

pub use address::{normalize, CanonicalAddress};
pub use allocation::{AllocationDataset, AllocationEntry, AllocationIndex, AllocationRecord};
pub use error::GatewayError;
pub use instructions::{parse_token_amount, ActionInstruction, ActionKind, InstructionBuilder};
pub use ledger::{guarded, ClaimStats, LedgerGateway, TokenContracts};
pub use resolver::{EligibilityResolver, EligibilityResult, DEFAULT_LEDGER_TIMEOUT};

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Token constants
pub mod constants {
    /// Decimal places of the legacy and wrapped tokens
    pub const TOKEN_DECIMALS: u8 = 3;

    /// Base units per whole token (`10^TOKEN_DECIMALS`)
    pub const TOKEN_SCALE: u64 = 10u64.pow(TOKEN_DECIMALS as u32);

    pub const TOKEN_SYMBOL: &str = "MEAT";

    pub const WRAPPED_TOKEN_SYMBOL: &str = "wMEAT";
}
