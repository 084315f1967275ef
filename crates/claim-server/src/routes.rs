//! HTTP routes
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | GET | `/api/claim-status` | `{success, claimEnabled}` |
//! | GET | `/api/claim-stats` | `{success, totalAllocated, totalClaimed, remainingAllocated, contractBalance}` |
//! | GET | `/api/check-claim/:address` | `{success, address, hasClaimed, claimableAmount, merkleProof}` |
//! | GET | `/api/balance/wrapped/:address` | `{success, address, token, balance}` |
//! | GET | `/api/balance/legacy/:address` | `{success, address, token, balance}` |
//! | POST | `/api/wrap` | `{success, action, instructions, amount, contract, calldata}` |
//! | POST | `/api/unwrap` | same as wrap |
//! | GET | `/health` | `OK` |
//!
//! Every integer read from the ledger is serialized as a decimal string.

use std::time::Duration;

use alloy_primitives::Address;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use claim_core::{normalize, ActionInstruction, ActionKind, EligibilityResult, LedgerGateway};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::{Result, ServerError};
use crate::metrics;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatusResponse {
    pub success: bool,
    pub claim_enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatsResponse {
    pub success: bool,
    pub total_allocated: String,
    pub total_claimed: String,
    pub remaining_allocated: String,
    pub contract_balance: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckClaimResponse {
    pub success: bool,
    pub address: String,
    pub has_claimed: bool,
    pub claimable_amount: String,
    pub merkle_proof: Vec<String>,
}

impl From<EligibilityResult> for CheckClaimResponse {
    fn from(result: EligibilityResult) -> Self {
        Self {
            success: true,
            address: result.address.to_string(),
            has_claimed: result.has_claimed,
            claimable_amount: result.claimable_amount.to_string(),
            merkle_proof: result.proof.iter().map(|node| node.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub success: bool,
    pub address: String,
    pub token: String,
    pub balance: String,
}

/// Body of wrap/unwrap requests
///
/// `amount` may arrive as a JSON string or number. It is kept as the raw
/// literal so a number is never rounded through `f64`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub amount: Option<Box<RawValue>>,
    pub user_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub action: ActionKind,
    pub instructions: Vec<String>,
    /// Base units
    pub amount: String,
    pub contract: String,
    pub calldata: String,
}

impl From<ActionInstruction> for ActionResponse {
    fn from(instruction: ActionInstruction) -> Self {
        Self {
            success: true,
            action: instruction.kind,
            instructions: instruction.steps,
            amount: instruction.amount.to_string(),
            contract: instruction.target.to_checksum(None),
            calldata: instruction.calldata.to_string(),
        }
    }
}

/// Create the API router without middleware
pub fn create_public_router<L: LedgerGateway + 'static>(state: SharedState<L>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/claim-status", get(claim_status::<L>))
        .route("/api/claim-stats", get(claim_stats::<L>))
        .route("/api/check-claim/:address", get(check_claim::<L>))
        .route("/api/balance/wrapped/:address", get(wrapped_balance::<L>))
        .route("/api/balance/legacy/:address", get(legacy_balance::<L>))
        .route("/api/wrap", post(wrap::<L>))
        .route("/api/unwrap", post(unwrap::<L>))
        .with_state(state)
}

/// Create the API router with tracing, CORS, request deadline and
/// concurrency limit
pub fn create_router<L: LedgerGateway + 'static>(
    state: SharedState<L>,
    request_timeout: Duration,
    max_concurrent_requests: usize,
) -> Router {
    create_public_router(state)
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Create the admin router serving Prometheus metrics
pub fn create_admin_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

async fn claim_status<L: LedgerGateway + 'static>(
    State(state): State<SharedState<L>>,
) -> Result<Json<ClaimStatusResponse>> {
    metrics::record_request("claim_status");
    let claim_enabled = state.claim_enabled().await?;
    Ok(Json(ClaimStatusResponse {
        success: true,
        claim_enabled,
    }))
}

async fn claim_stats<L: LedgerGateway + 'static>(
    State(state): State<SharedState<L>>,
) -> Result<Json<ClaimStatsResponse>> {
    metrics::record_request("claim_stats");
    let stats = state.stats().await?;
    Ok(Json(ClaimStatsResponse {
        success: true,
        total_allocated: stats.total_allocated.to_string(),
        total_claimed: stats.total_claimed.to_string(),
        remaining_allocated: stats.remaining_allocated.to_string(),
        contract_balance: stats.contract_balance.to_string(),
    }))
}

async fn check_claim<L: LedgerGateway + 'static>(
    State(state): State<SharedState<L>>,
    Path(address): Path<String>,
) -> Result<Json<CheckClaimResponse>> {
    metrics::record_request("check_claim");
    let result = state.check_claim(&address).await?;
    Ok(Json(result.into()))
}

async fn wrapped_balance<L: LedgerGateway + 'static>(
    State(state): State<SharedState<L>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>> {
    metrics::record_request("balance_wrapped");
    let token = state.tokens().wrapped;
    balance(&state, token, &address).await
}

async fn legacy_balance<L: LedgerGateway + 'static>(
    State(state): State<SharedState<L>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>> {
    metrics::record_request("balance_legacy");
    let token = state.tokens().legacy;
    balance(&state, token, &address).await
}

async fn balance<L: LedgerGateway + 'static>(
    state: &SharedState<L>,
    token: Address,
    raw_address: &str,
) -> Result<Json<BalanceResponse>> {
    let address = normalize(raw_address)?;
    let balance = state.balance(token, address).await?;
    Ok(Json(BalanceResponse {
        success: true,
        address: address.to_string(),
        token: token.to_checksum(None),
        balance: balance.to_string(),
    }))
}

async fn wrap<L: LedgerGateway + 'static>(
    State(state): State<SharedState<L>>,
    payload: std::result::Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>> {
    metrics::record_request("wrap");
    let (amount, user_address) = parse_action(payload)?;
    let account = normalize(&user_address)?;
    let instruction = state.instructions.build_wrap(&amount, account)?;
    Ok(Json(instruction.into()))
}

async fn unwrap<L: LedgerGateway + 'static>(
    State(state): State<SharedState<L>>,
    payload: std::result::Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>> {
    metrics::record_request("unwrap");
    let (amount, user_address) = parse_action(payload)?;
    let account = normalize(&user_address)?;
    let instruction = state.instructions.build_unwrap(&amount, account)?;
    Ok(Json(instruction.into()))
}

/// Extract `(amount, userAddress)` or fail with 400
fn parse_action(
    payload: std::result::Result<Json<ActionRequest>, JsonRejection>,
) -> Result<(String, String)> {
    let Json(request) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let amount = match request.amount {
        Some(raw) => amount_text(&raw)?,
        None => return Err(ServerError::InvalidRequest("missing field `amount`".into())),
    };

    let user_address = request
        .user_address
        .ok_or_else(|| ServerError::InvalidRequest("missing field `userAddress`".into()))?;

    Ok((amount, user_address))
}

/// Decimal text of a JSON string or number literal, exactly as sent
fn amount_text(raw: &RawValue) -> Result<String> {
    let literal = raw.get().trim();
    match literal.as_bytes().first() {
        Some(b'"') => serde_json::from_str::<String>(literal)
            .map_err(|e| ServerError::InvalidRequest(format!("amount: {e}"))),
        Some(b'-' | b'0'..=b'9') => Ok(literal.to_string()),
        _ => Err(ServerError::InvalidRequest(format!(
            "amount must be a string or number, got {literal}"
        ))),
    }
}
