use crate::database::DbError;
use crate::database::tables::FaceProfileRow;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub struct FaceProfileStore;

impl FaceProfileStore {
    pub async fn find(
        executor: impl Executor<'_, Database = Postgres>,
        gallery_user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<FaceProfileRow>, DbError> {
        Ok(sqlx::query_as::<_, FaceProfileRow>(
            r"
            SELECT gallery_user_id, event_id, prototype_embedding, match_count, updated_at
            FROM face_search_profiles
            WHERE gallery_user_id = $1 AND event_id = $2
            ",
        )
        .bind(gallery_user_id)
        .bind(event_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Stores the refined prototype after a selfie search, replacing any
    /// previous profile for this user and event.
    pub async fn upsert(
        executor: impl Executor<'_, Database = Postgres>,
        gallery_user_id: Uuid,
        event_id: Uuid,
        prototype: &[f32],
        match_count: i32,
    ) -> Result<(), DbError> {
        let embedding = serde_json::to_value(prototype)?;
        sqlx::query(
            r"
            INSERT INTO face_search_profiles
                (gallery_user_id, event_id, prototype_embedding, match_count, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (gallery_user_id, event_id)
            DO UPDATE SET prototype_embedding = EXCLUDED.prototype_embedding,
                          match_count = EXCLUDED.match_count,
                          updated_at = now()
            ",
        )
        .bind(gallery_user_id)
        .bind(event_id)
        .bind(embedding)
        .bind(match_count)
        .execute(executor)
        .await?;
        Ok(())
    }
}
