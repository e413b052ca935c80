use crate::database::DbError;
use crate::inference_client::InferenceError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Inference service error: {0}")]
    Inference(String),

    #[error("Selfie rejected: {code}")]
    SelfieRejected { code: String, message: String },
}

fn log_error(error: &FaceError) {
    match error {
        FaceError::Database(e) => error!("Database query failed: {}", e),
        FaceError::Internal(e) => error!("Internal error: {:?}", e),
        FaceError::NotFound(message) => warn!("Face search -> Not found: {}", message),
        FaceError::BadRequest(message) => warn!("Face search -> Bad request: {}", message),
        FaceError::Unauthorized => warn!("Face search -> Unauthorized request."),
        FaceError::ServiceUnavailable(message) => {
            warn!("Face search -> Service unavailable: {}", message);
        }
        FaceError::Inference(message) => error!("Inference service error: {}", message),
        FaceError::SelfieRejected { code, message } => {
            warn!("Selfie rejected ({}): {}", code, message);
        }
    }
}

impl IntoResponse for FaceError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, body) = match self {
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "A database error occurred." }),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "An unexpected internal error occurred." }),
            ),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            Self::ServiceUnavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": message }))
            }
            Self::Inference(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": "Face processing service unavailable." }),
            ),
            Self::SelfieRejected { code, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": code, "message": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbError> for FaceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(sql_err) | DbError::Sqlx(sql_err) => Self::Database(sql_err),
            DbError::SerdeJson(err) => Self::Internal(eyre::Report::new(err)),
        }
    }
}

impl From<InferenceError> for FaceError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::SelfieRejected { code, message } => map_selfie_error(code, message),
            other => Self::Inference(other.to_string()),
        }
    }
}

/// Maps the embedding service's error codes to client-facing rejections
/// with friendlier wording. Unknown codes pass through as-is.
fn map_selfie_error(code: String, message: String) -> FaceError {
    let (code, message) = match code.as_str() {
        "no_face_detected" => (
            code,
            "No face detected in your selfie. Please try again with better lighting and face \
             the camera directly."
                .to_string(),
        ),
        "invalid_image" => (
            code,
            "Could not process your photo. Please try taking a new selfie.".to_string(),
        ),
        "invalid_embedding" => (
            "low_quality_selfie".to_string(),
            "Could not generate a valid face embedding. Please try again with better lighting."
                .to_string(),
        ),
        "processing_failed" => {
            return FaceError::Inference("Face processing failed on the GPU service.".to_string());
        }
        _ => (code, message),
    };
    FaceError::SelfieRejected { code, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection_code(err: &FaceError) -> Option<&str> {
        match err {
            FaceError::SelfieRejected { code, .. } => Some(code),
            _ => None,
        }
    }

    #[test]
    fn known_codes_become_rejections() {
        let err = map_selfie_error("no_face_detected".into(), String::new());
        assert_eq!(rejection_code(&err), Some("no_face_detected"));

        let err = map_selfie_error("invalid_embedding".into(), String::new());
        assert_eq!(rejection_code(&err), Some("low_quality_selfie"));
    }

    #[test]
    fn processing_failure_is_a_service_error() {
        let err = map_selfie_error("processing_failed".into(), String::new());
        assert!(matches!(err, FaceError::Inference(_)));
    }

    #[test]
    fn unknown_codes_pass_through() {
        let err = map_selfie_error("mystery".into(), "who knows".into());
        assert_eq!(rejection_code(&err), Some("mystery"));
    }
}
