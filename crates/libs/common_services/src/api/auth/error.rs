use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid bearer token")]
    InvalidToken,

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        warn!("Auth rejected: {}", self);
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Missing bearer token."),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token."),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.",
            ),
        };
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
