use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GalleryUser {
    pub id: Uuid,
    pub auth_id: String,
}
