//! Admin error handling.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use sokoni_backend::StoreError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Store(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(error = %self, sentry_event_id = %event_id, "Request error");
                (StatusCode::BAD_GATEWAY, "External service error".to_owned())
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
