use uuid::Uuid;

/// Event fields relevant to gallery-facing face search.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRef {
    pub id: Uuid,
    pub face_search_enabled: bool,
}
