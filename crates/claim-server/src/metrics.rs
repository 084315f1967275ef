//! Prometheus metrics
//!
//! Recording is a no-op until [`init_prometheus_recorder`] installs the
//! global recorder, so tests and library users pay nothing.

use std::time::Duration;

use claim_core::GatewayError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::{Result, ServerError};

/// Install the global Prometheus recorder
pub fn init_prometheus_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Internal(format!("metrics recorder: {e}")))
}

pub fn record_request(endpoint: &'static str) {
    metrics::counter!("claim_gateway_requests_total", "endpoint" => endpoint).increment(1);
}

pub fn record_resolution(elapsed: Duration, error: Option<&GatewayError>) {
    metrics::histogram!("claim_gateway_resolve_duration_seconds").record(elapsed.as_secs_f64());
    if let Some(err) = error {
        record_error(err);
    }
}

/// Count a failed ledger interaction by kind
pub fn record_error(err: &GatewayError) {
    let kind = match err {
        GatewayError::LedgerUnavailable(_) => "unavailable",
        GatewayError::LedgerCallReverted(_) => "reverted",
        _ => return,
    };
    metrics::counter!("claim_gateway_ledger_errors_total", "kind" => kind).increment(1);
}
