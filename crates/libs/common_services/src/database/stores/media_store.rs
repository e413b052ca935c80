use crate::database::DbError;
use crate::database::tables::{DisplayMediaRow, MediaRef, MediaStorageRef};
use sqlx::{Executor, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

pub struct MediaStore;

impl MediaStore {
    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        media_id: Uuid,
    ) -> Result<Option<MediaRef>, DbError> {
        Ok(sqlx::query_as::<_, MediaRef>(
            r"
            SELECT id, event_id, media_type
            FROM media
            WHERE id = $1
            ",
        )
        .bind(media_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Storage keys for the given media ids. Media deleted between claim
    /// and dispatch simply drop out of the result.
    pub async fn find_storage_refs(
        executor: impl Executor<'_, Database = Postgres>,
        media_ids: &[Uuid],
    ) -> Result<Vec<MediaStorageRef>, DbError> {
        Ok(sqlx::query_as::<_, MediaStorageRef>(
            r"
            SELECT id, event_id, r2_key
            FROM media
            WHERE id = ANY($1)
            ",
        )
        .bind(media_ids)
        .fetch_all(executor)
        .await?)
    }

    /// Display fields for matched media, keyed by id for result assembly.
    pub async fn find_display_rows(
        executor: impl Executor<'_, Database = Postgres>,
        media_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, DisplayMediaRow>, DbError> {
        let rows = sqlx::query_as::<_, DisplayMediaRow>(
            r"
            SELECT id, album_id, r2_key, preview_r2_key, width, height
            FROM media
            WHERE id = ANY($1)
            ",
        )
        .bind(media_ids)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    pub async fn count_event_images(
        executor: impl Executor<'_, Database = Postgres>,
        event_id: Uuid,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM media
            WHERE event_id = $1 AND media_type = 'image'
            ",
        )
        .bind(event_id)
        .fetch_one(executor)
        .await?)
    }
}
