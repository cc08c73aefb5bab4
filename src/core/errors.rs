use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the answering pipeline.
///
/// `InvalidConfig` is only ever raised while loading configuration; the
/// runtime variants are `EmbeddingFailure` (fatal for the affected index
/// build or turn) and `GenerationFailure` (non-fatal during condensation,
/// fatal during synthesis).
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("embedding failed: {0}")]
    EmbeddingFailure(String),
    #[error("generation failed: {0}")]
    GenerationFailure(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ChatError::Internal(err.to_string())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        ChatError::EmbeddingFailure(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        ChatError::GenerationFailure(err.to_string())
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ChatError::InvalidConfig(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ChatError::EmbeddingFailure(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ChatError::GenerationFailure(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ChatError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ChatError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ChatError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
