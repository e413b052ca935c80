use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct MediaRef {
    pub id: Uuid,
    pub event_id: Uuid,
    pub media_type: String,
}

/// The storage key of a media item, used when dispatching to the GPU service.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaStorageRef {
    pub id: Uuid,
    pub event_id: Uuid,
    pub r2_key: String,
}

/// Everything needed to render one match in a search response.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DisplayMediaRow {
    pub id: Uuid,
    pub album_id: Option<Uuid>,
    pub r2_key: String,
    pub preview_r2_key: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}
