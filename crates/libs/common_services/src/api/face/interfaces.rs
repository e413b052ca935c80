use crate::face::DisplayResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct TriggerResponse {
    pub dispatched: usize,
    pub total_claimed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueRequest {
    pub media_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnqueueResponse {
    pub enqueued: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    pub event_id: Uuid,
}

/// Organizer-facing processing progress for one event.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub total_images: i64,
    pub processed: i64,
    pub pending: i64,
    pub processing: i64,
    pub failed: i64,
    pub no_faces: i64,
    pub total_faces: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProfileParams {
    pub event_hash: String,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub has_profile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecallRequest {
    pub event_hash: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecallResponse {
    pub has_profile: bool,
    pub tier1: Vec<DisplayResult>,
    pub tier2: Vec<DisplayResult>,
    pub total_matches: usize,
    pub search_time_ms: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub event_hash: String,
    /// Base64-encoded selfie image.
    pub selfie_base64: String,
    /// Restricts results to one album when set.
    pub album_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub tier1: Vec<DisplayResult>,
    pub tier2: Vec<DisplayResult>,
    pub total_matches: usize,
    pub search_time_ms: u64,
}
