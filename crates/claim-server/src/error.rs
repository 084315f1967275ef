//! Server error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use claim_core::GatewayError;
use serde::Serialize;
use thiserror::Error;

/// Structured error response for API clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Claims are disabled on this gateway")]
    ClaimsDisabled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get the error code for structured responses
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Gateway(e) => match e {
                GatewayError::InvalidAddress(_) => "INVALID_ADDRESS",
                GatewayError::InvalidAmount(_) => "INVALID_AMOUNT",
                GatewayError::LedgerUnavailable(_) => "LEDGER_UNAVAILABLE",
                GatewayError::LedgerCallReverted(_) => "LEDGER_CALL_REVERTED",
                GatewayError::DatasetCorruption(_) => "DATASET_CORRUPTION",
            },
            ServerError::InvalidRequest(_) => "INVALID_REQUEST",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::ClaimsDisabled => "CLAIMS_DISABLED",
            ServerError::Io(_) => "IO_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Gateway(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ServerError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::ClaimsDisabled => StatusCode::NOT_FOUND,
            ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
