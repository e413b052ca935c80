use crate::api_state::ApiContext;
use crate::auth::middlewares::organizer::ApiOrganizer;
use axum::extract::{Query, State};
use axum::Json;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use common_services::api::face::error::FaceError;
use common_services::api::face::interfaces::{
    EnqueueRequest, EnqueueResponse, ProfileParams, ProfileResponse, RecallRequest,
    RecallResponse, SearchRequest, SearchResponse, StatusParams, StatusResponse, TriggerResponse,
};
use common_services::api::face::service;
use http::HeaderMap;
use tracing::instrument;

/// The scheduler and the upload pipeline authenticate with a shared secret
/// header instead of a user session.
const FACE_SECRET_HEADER: &str = "x-face-secret";

fn provided_secret(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(FACE_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
}

fn bearer_token(bearer: &Option<TypedHeader<Authorization<Bearer>>>) -> Option<&str> {
    bearer
        .as_ref()
        .map(|TypedHeader(Authorization(token))| token.token())
}

/// Claim pending work and dispatch it to the GPU service.
#[utoipa::path(
    post,
    path = "/api/face/trigger",
    tag = "Face",
    responses(
        (status = 200, description = "Claim and dispatch summary", body = TriggerResponse),
        (status = 401, description = "Bad or missing scheduler secret."),
        (status = 503, description = "Face processing is not configured."),
    )
)]
#[instrument(skip(context, headers), err(Debug))]
pub async fn trigger_handler(
    State(context): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<TriggerResponse>, FaceError> {
    service::verify_face_secret(&context.settings, provided_secret(&headers))?;
    let response = service::trigger_processing(
        &context.pool,
        &context.settings,
        &context.storage,
        context.inference.as_ref(),
    )
    .await?;
    Ok(Json(response))
}

/// Queue a face processing job for an uploaded image.
#[utoipa::path(
    post,
    path = "/api/face/jobs",
    tag = "Face",
    request_body = EnqueueRequest,
    responses(
        (status = 200, description = "Whether a new job was queued", body = EnqueueResponse),
        (status = 400, description = "Media is not an image."),
        (status = 401, description = "Bad or missing scheduler secret."),
        (status = 404, description = "Media not found."),
    )
)]
#[instrument(skip(context, headers), err(Debug))]
pub async fn enqueue_job_handler(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Json(request): Json<EnqueueRequest>,
) -> Result<Json<EnqueueResponse>, FaceError> {
    service::verify_face_secret(&context.settings, provided_secret(&headers))?;
    let response = service::enqueue_media(&context.pool, &context.settings, request.media_id).await?;
    Ok(Json(response))
}

/// Processing progress for one event, for the organizer dashboard.
#[utoipa::path(
    get,
    path = "/api/face/status",
    tag = "Face",
    params(StatusParams),
    responses(
        (status = 200, description = "Job counts for the event", body = StatusResponse),
        (status = 401, description = "Not logged in as an organizer."),
        (status = 404, description = "Event not found or not owned by this organizer."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, organizer), err(Debug))]
pub async fn processing_status_handler(
    State(context): State<ApiContext>,
    ApiOrganizer(organizer): ApiOrganizer,
    Query(params): Query<StatusParams>,
) -> Result<Json<StatusResponse>, FaceError> {
    let response = service::processing_status(&context.pool, organizer.sub, params.event_id).await?;
    Ok(Json(response))
}

/// Whether the caller has a stored recall profile for an event. Always 200;
/// failures read as "no profile".
#[utoipa::path(
    get,
    path = "/api/face/profile",
    tag = "Face",
    params(ProfileParams),
    responses(
        (status = 200, description = "Profile presence and metadata", body = ProfileResponse),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, bearer))]
pub async fn check_profile_handler(
    State(context): State<ApiContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Query(params): Query<ProfileParams>,
) -> Json<ProfileResponse> {
    let response = service::check_profile(
        &context.pool,
        &context.settings,
        bearer_token(&bearer),
        &params.event_hash,
    )
    .await;
    Json(response)
}

/// Instant search from the caller's stored prototype.
#[utoipa::path(
    post,
    path = "/api/face/recall",
    tag = "Face",
    request_body = RecallRequest,
    responses(
        (status = 200, description = "Tiered matches, or has_profile=false", body = RecallResponse),
        (status = 401, description = "Missing or invalid gallery session."),
        (status = 404, description = "Event not found."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, bearer), err(Debug))]
pub async fn recall_search_handler(
    State(context): State<ApiContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<RecallRequest>,
) -> Result<Json<RecallResponse>, FaceError> {
    let response = service::recall_search(
        &context.pool,
        &context.settings,
        &context.storage,
        bearer_token(&bearer),
        &request.event_hash,
    )
    .await?;
    Ok(Json(response))
}

/// Full selfie search with prototype refinement.
#[utoipa::path(
    post,
    path = "/api/face/search",
    tag = "Face",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Tiered matches", body = SearchResponse),
        (status = 400, description = "Missing or oversized selfie."),
        (status = 404, description = "Event not found or not public."),
        (status = 422, description = "Selfie rejected by the embedding service."),
        (status = 503, description = "Face search service not configured or unavailable."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, bearer, request), err(Debug))]
pub async fn selfie_search_handler(
    State(context): State<ApiContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, FaceError> {
    let response = service::selfie_search(
        &context.pool,
        &context.settings,
        &context.storage,
        context.inference.as_ref(),
        bearer_token(&bearer),
        request,
    )
    .await?;
    Ok(Json(response))
}
