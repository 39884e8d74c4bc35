//! RPC error types and their HTTP rendering.
//!
//! Every failure is returned in the same envelope as successes:
//! `{"success": false, "error": <summary>, "details": <message>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use seeds_wallet_core::TokenError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("metrics encoding failed: {0}")]
    Metrics(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::Token(TokenError::InvalidInput(_))
            | Self::Token(TokenError::InsufficientBalance { .. }) => StatusCode::BAD_REQUEST,
            Self::Token(_) | Self::Metrics(_) | Self::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short, stable description of the failure kind.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::Token(TokenError::InvalidInput(_)) => "Invalid request",
            Self::Token(TokenError::InsufficientBalance { .. }) => "Insufficient balance",
            Self::Token(TokenError::CapabilityUnavailable(_)) => "Signing capability unavailable",
            Self::Token(TokenError::LedgerUnavailable(_)) => "Ledger unavailable",
            Self::Token(TokenError::TransactionFailed { .. }) => "Transaction failed",
            Self::Metrics(_) | Self::Server(_) => "Internal server error",
        }
    }
}

impl From<std::io::Error> for RpcError {
    fn from(e: std::io::Error) -> Self {
        RpcError::Server(e.to_string())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = Json(json!({
            "success": false,
            "error": self.summary(),
            "details": self.to_string(),
        }));
        (status, body).into_response()
    }
}
