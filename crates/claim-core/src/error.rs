//! Gateway error taxonomy

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transport failure or timeout. Safe to retry.
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The contract rejected the call. Retrying with the same input will not help.
    #[error("Ledger call reverted: {0}")]
    LedgerCallReverted(String),

    #[error("Allocation dataset corrupted: {0}")]
    DatasetCorruption(String),
}

impl GatewayError {
    /// True for input errors that are reported before touching the ledger
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidAddress(_) | GatewayError::InvalidAmount(_)
        )
    }

    /// True only for transient ledger failures
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::LedgerUnavailable(_))
    }
}
