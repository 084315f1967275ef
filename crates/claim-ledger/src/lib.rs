//! claim-ledger: JSON-RPC implementation of the ledger seam
//!
//! [`RpcLedger`] answers every [`claim_core::LedgerGateway`] operation with an
//! `eth_call` through an alloy provider. It holds no mutable state, performs
//! no retries and sets no deadlines of its own; callers wrap each call with
//! [`claim_core::guarded`].

pub mod config;
pub mod error;
pub mod rpc;

pub use config::LedgerConfig;
pub use error::LedgerClientError;
pub use rpc::RpcLedger;
