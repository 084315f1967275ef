//! Ledger client errors and transport error classification

use alloy_transport::TransportError;
use claim_core::GatewayError;
use thiserror::Error;

/// JSON-RPC code used by nodes for `execution reverted`
const EXECUTION_REVERTED_CODE: i64 = 3;

/// Errors raised while constructing a ledger client
#[derive(Error, Debug)]
pub enum LedgerClientError {
    #[error("Invalid RPC URL {url:?}: {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    #[error("Invalid {role} contract address: {source}")]
    InvalidContract {
        role: &'static str,
        #[source]
        source: GatewayError,
    },
}

pub type Result<T> = std::result::Result<T, LedgerClientError>;

/// Map a failed `eth_call` onto the gateway taxonomy.
///
/// Only a node's explicit revert answer counts as `LedgerCallReverted`; every
/// other failure (transport, rate limit, node error) is `LedgerUnavailable`.
pub(crate) fn classify(operation: &str, err: TransportError) -> GatewayError {
    match err.as_error_resp() {
        Some(payload) => classify_error_response(operation, payload.code, &payload.message),
        None => GatewayError::LedgerUnavailable(format!("{operation}: {err}")),
    }
}

pub(crate) fn classify_error_response(operation: &str, code: i64, message: &str) -> GatewayError {
    let reverted =
        code == EXECUTION_REVERTED_CODE || message.to_ascii_lowercase().contains("revert");

    if reverted {
        GatewayError::LedgerCallReverted(format!("{operation}: {message}"))
    } else {
        GatewayError::LedgerUnavailable(format!("{operation}: node error {code}: {message}"))
    }
}
