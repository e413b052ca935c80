use crate::database::DbError;
use crate::database::tables::{EventRef, GalleryUser};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub struct EventStore;

impl EventStore {
    /// Resolves a gallery share hash to its event. Private events are
    /// invisible through this path.
    pub async fn find_public_by_hash(
        executor: impl Executor<'_, Database = Postgres>,
        event_hash: &str,
    ) -> Result<Option<EventRef>, DbError> {
        Ok(sqlx::query_as::<_, EventRef>(
            r"
            SELECT id, face_search_enabled
            FROM events
            WHERE event_hash = $1 AND is_public = true
            ",
        )
        .bind(event_hash)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn is_owned_by(
        executor: impl Executor<'_, Database = Postgres>,
        event_id: Uuid,
        organizer_id: Uuid,
    ) -> Result<bool, DbError> {
        let found = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM events
            WHERE id = $1 AND organizer_id = $2
            ",
        )
        .bind(event_id)
        .bind(organizer_id)
        .fetch_one(executor)
        .await?;
        Ok(found > 0)
    }
}

pub struct GalleryUserStore;

impl GalleryUserStore {
    pub async fn find_by_auth_id(
        executor: impl Executor<'_, Database = Postgres>,
        auth_id: &str,
    ) -> Result<Option<GalleryUser>, DbError> {
        Ok(sqlx::query_as::<_, GalleryUser>(
            r"
            SELECT id, auth_id
            FROM gallery_users
            WHERE auth_id = $1
            ",
        )
        .bind(auth_id)
        .fetch_optional(executor)
        .await?)
    }
}
