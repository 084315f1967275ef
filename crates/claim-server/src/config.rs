//! Command-line and environment configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use claim_ledger::LedgerConfig;

use crate::error::{Result, ServerError};
use crate::retry::RetryPolicy;

/// Claim gateway: eligibility, stats and wrap instructions over a Merkle claim contract
#[derive(Parser, Debug, Clone)]
#[command(name = "claim-server", version)]
pub struct Args {
    /// Allocation dataset (JSON)
    #[arg(long, env = "ALLOCATIONS_PATH", default_value = "data/allocations.json")]
    pub allocations: PathBuf,

    /// Ethereum JSON-RPC endpoint
    #[arg(long, env = "RPC_URL", default_value = "http://localhost:8545")]
    pub rpc_url: String,

    /// Network label for logs
    #[arg(long, env = "NETWORK", default_value = "mainnet")]
    pub network: String,

    #[arg(
        long,
        env = "CLAIM_CONTRACT",
        default_value = "0xEC2c2AdEB8Ee3A338485ae684D1B1CB6DA0A498c"
    )]
    pub claim_contract: String,

    #[arg(
        long,
        env = "LEGACY_TOKEN",
        default_value = "0xED6aC8de7c7CA7e3A22952e09C2a2A1232DDef9A"
    )]
    pub legacy_token: String,

    #[arg(
        long,
        env = "WRAPPED_TOKEN",
        default_value = "0xDFA208BB0B811cFBB5Fa3Ea98Ec37Aa86180e668"
    )]
    pub wrapped_token: String,

    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Listener for /metrics
    #[arg(long, env = "ADMIN_LISTEN_ADDR", default_value = "127.0.0.1:9100")]
    pub admin_listen: SocketAddr,

    /// Deadline for each ledger call, in milliseconds
    #[arg(
        long,
        env = "LEDGER_TIMEOUT_MS",
        default_value_t = claim_core::DEFAULT_LEDGER_TIMEOUT.as_millis() as u64
    )]
    pub ledger_timeout_ms: u64,

    /// Deadline for a whole HTTP request, in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    /// Extra attempts for ledger reads that failed transiently
    #[arg(long, env = "LEDGER_RETRIES", default_value_t = 2)]
    pub ledger_retries: u32,

    /// Backoff before the first retry, doubled on each further attempt
    #[arg(long, env = "LEDGER_RETRY_BACKOFF_MS", default_value_t = 200)]
    pub ledger_retry_backoff_ms: u64,

    /// Serve claim endpoints
    #[arg(
        long,
        env = "CLAIMS_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub claims_enabled: bool,

    #[arg(long, env = "MAX_CONCURRENT_REQUESTS", default_value_t = 512)]
    pub max_concurrent_requests: usize,
}

/// Settings of the HTTP boundary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub admin_listen: SocketAddr,
    pub allocations: PathBuf,
    pub ledger_timeout: Duration,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub claims_enabled: bool,
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            admin_listen: SocketAddr::from(([127, 0, 0, 1], 9100)),
            allocations: PathBuf::from("data/allocations.json"),
            ledger_timeout: claim_core::DEFAULT_LEDGER_TIMEOUT,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            claims_enabled: true,
            max_concurrent_requests: 512,
        }
    }
}

impl Args {
    /// Split into boundary and ledger configuration, validating addresses
    pub fn into_configs(self) -> Result<(ServerConfig, LedgerConfig)> {
        if self.ledger_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(ServerError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ServerError::Config(
                "max concurrent requests must be greater than zero".to_string(),
            ));
        }

        let ledger = LedgerConfig::parse(
            self.network,
            self.rpc_url,
            &self.claim_contract,
            &self.legacy_token,
            &self.wrapped_token,
        )
        .map_err(|e| ServerError::Config(e.to_string()))?;

        let server = ServerConfig {
            listen: self.listen,
            admin_listen: self.admin_listen,
            allocations: self.allocations,
            ledger_timeout: Duration::from_millis(self.ledger_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            retry: RetryPolicy::new(
                self.ledger_retries,
                Duration::from_millis(self.ledger_retry_backoff_ms),
            ),
            claims_enabled: self.claims_enabled,
            max_concurrent_requests: self.max_concurrent_requests,
        };

        Ok((server, ledger))
    }
}
