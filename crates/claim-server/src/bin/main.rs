//! Claim gateway server

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use claim_core::AllocationIndex;
use claim_ledger::RpcLedger;
use claim_server::{create_shared_state, init_prometheus_recorder, serve, Args};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "claim_server=info,claim_core=info,claim_ledger=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (server_config, ledger_config) = Args::parse().into_configs()?;

    tracing::info!(path = %server_config.allocations.display(), "Loading allocations");
    let index = AllocationIndex::load(&server_config.allocations).with_context(|| {
        format!(
            "refusing to start with allocation dataset {}",
            server_config.allocations.display()
        )
    })?;

    let tokens = ledger_config.tokens;
    let ledger = RpcLedger::connect(ledger_config)?;
    let metrics = init_prometheus_recorder()?;

    let state = create_shared_state(Arc::new(index), Arc::new(ledger), tokens, &server_config);

    if !server_config.claims_enabled {
        tracing::warn!("Claims disabled; only balances and wrap instructions are served");
    }

    serve(state, &server_config, Some(metrics)).await?;
    Ok(())
}
