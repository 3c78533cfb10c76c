use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::error::LedgerError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(err) => match err {
                LedgerError::AccountNotFound(_) | LedgerError::UnknownInstrument(_) => {
                    StatusCode::NOT_FOUND
                }
                LedgerError::DuplicateEmail(_)
                | LedgerError::InvalidProfile(_)
                | LedgerError::InvalidQuantity
                | LedgerError::InsufficientFunds { .. }
                | LedgerError::InsufficientShares { .. }
                | LedgerError::PositionNotFound(_) => StatusCode::BAD_REQUEST,
                LedgerError::Store(_) | LedgerError::Quote(_) => StatusCode::SERVICE_UNAVAILABLE,
                LedgerError::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Validation failures carry their message to the caller. Infrastructure
/// failures are logged here and answered with a generic message.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Ledger(err) if !err.is_validation() => {
                tracing::error!(error = %err, "ledger infrastructure error");
                if status == StatusCode::SERVICE_UNAVAILABLE {
                    "the ledger is temporarily unavailable".to_string()
                } else {
                    "an internal error occurred".to_string()
                }
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                "an internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
