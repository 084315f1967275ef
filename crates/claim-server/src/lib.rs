//! claim-server: HTTP boundary of the claim gateway
//!
//! Maps the JSON API onto [`claim_core`] operations, adds per-request
//! deadlines, bounded retries of transient ledger failures, and Prometheus
//! metrics on a separate admin listener.

pub mod config;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Args, ServerConfig};
pub use error::ServerError;
pub use metrics::init_prometheus_recorder;
pub use retry::RetryPolicy;
pub use routes::{create_admin_router, create_public_router, create_router};
pub use server::serve;
pub use state::{create_shared_state, AppState, SharedState};
