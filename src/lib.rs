//! claim-gateway: eligibility and wrap/unwrap gateway for a Merkle token claim
//!
//! Re-exports the workspace crates:
//! - [`core`]: address normalization, allocation index, eligibility resolution
//! - [`ledger`]: JSON-RPC implementation of the ledger gateway
//! - [`server`]: HTTP API

pub use claim_core as core;
pub use claim_ledger as ledger;
pub use claim_server as server;
