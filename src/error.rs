//! Typed errors raised by the reading store gateway.
//!
//! The classification and scoring engines are total functions and never fail;
//! everything that can go wrong in this service is one of the three variants
//! below, each carrying a human-readable message. Handlers return these
//! directly and the [`IntoResponse`] impl renders the `{"error": ...}` body
//! the API promises.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ---

/// Application error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed required input. Client-attributable; callers
    /// should not retry without changing the request.
    #[error("{0}")]
    Validation(String),

    /// Underlying persistence failure, possibly transient. Callers may retry
    /// with backoff; the service never retries internally.
    #[error("{0}")]
    Storage(String),

    /// Any uncaught failure with whatever message is available.
    #[error("{0}")]
    Unknown(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // ---
        AppError::Storage(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        let status = match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) | AppError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("request failed: {}", self);

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for the gateway and handlers.
pub type AppResult<T> = Result<T, AppError>;
