//! Error handling for the Seed Treatment Tracker
//!
//! Every rejection is synchronous and pre-commit: the caller gets a
//! structured body and no state changes. All errors are recoverable by
//! adjusting the input and resubmitting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Malformed or missing fields, caught before any store access
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Reference to a nonexistent record
    #[error("{0} not found")]
    NotFound(String),

    // A gatekeeper rule would be violated by the requested mutation
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // Delete refused while dependent records exist
    #[error("Referential integrity: {0}")]
    ReferentialIntegrity(String),

    // Ledger file I/O
    #[error("Store error: {0}")]
    Store(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a field-level validation rejection
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::InvariantViolation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVARIANT_VIOLATION".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::ReferentialIntegrity(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "REFERENTIAL_INTEGRITY".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::Store(_) | AppError::Serialization(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "STORE_ERROR".to_string(),
                    message: "The ledger store failed".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
