use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A gallery user's stored face prototype for one event.
///
/// `prototype_embedding` is kept as raw JSON because legacy rows store the
/// vector as a JSON string rather than a JSON array.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FaceProfileRow {
    pub gallery_user_id: Uuid,
    pub event_id: Uuid,
    pub prototype_embedding: serde_json::Value,
    pub match_count: i32,
    pub updated_at: DateTime<Utc>,
}
