//! Listener setup and graceful shutdown

use axum::Router;
use claim_core::LedgerGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::routes::{create_admin_router, create_router};
use crate::state::SharedState;

/// Serve the public API and, when a metrics handle is given, the admin
/// listener. Returns after ctrl-c once in-flight requests have drained.
pub async fn serve<L: LedgerGateway + 'static>(
    state: SharedState<L>,
    config: &ServerConfig,
    metrics: Option<PrometheusHandle>,
) -> Result<()> {
    let app = create_router(state, config.request_timeout, config.max_concurrent_requests);

    let admin = match metrics {
        Some(handle) => {
            let listener = TcpListener::bind(config.admin_listen).await?;
            tracing::info!(addr = %listener.local_addr()?, "Admin listener started");
            Some(tokio::spawn(run(listener, create_admin_router(handle))))
        }
        None => None,
    };

    let listener = TcpListener::bind(config.listen).await?;
    tracing::info!(addr = %listener.local_addr()?, "Claim gateway listening");
    run(listener, app).await?;

    if let Some(admin) = admin {
        admin.abort();
    }

    tracing::info!("Claim gateway stopped");
    Ok(())
}

async fn run(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
