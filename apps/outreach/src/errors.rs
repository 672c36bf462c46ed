use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error type for the stub backend's handlers.
/// Rendered as `{"detail": "..."}`, the shape the request client reads.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => {
                tracing::debug!("Rejecting request: {msg}");
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
