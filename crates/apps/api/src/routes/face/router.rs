use crate::api_state::ApiContext;
use crate::face::handlers::{
    check_profile_handler, enqueue_job_handler, processing_status_handler, recall_search_handler,
    selfie_search_handler, trigger_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

pub fn face_public_router() -> Router<ApiContext> {
    Router::new()
        .route("/api/face/trigger", post(trigger_handler))
        .route("/api/face/jobs", post(enqueue_job_handler))
        .route("/api/face/status", get(processing_status_handler))
        .route("/api/face/profile", get(check_profile_handler))
        .route("/api/face/recall", post(recall_search_handler))
        .route("/api/face/search", post(selfie_search_handler))
}
