use crate::database::DbError;
use crate::database::tables::{ClaimedJob, JobStatusCounts, StatusCountRow};
use chrono::{DateTime, Duration, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

pub struct FaceJobStore;

impl FaceJobStore {
    /// Inserts a pending job for a media item. Returns `false` when a job
    /// for this media already exists, so re-uploads never duplicate work.
    pub async fn enqueue(
        executor: impl Executor<'_, Database = Postgres>,
        event_id: Uuid,
        media_id: Uuid,
        max_attempts: i16,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"
            INSERT INTO face_processing_jobs (event_id, media_id, max_attempts)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, media_id) DO NOTHING
            ",
        )
        .bind(event_id)
        .bind(media_id)
        .bind(max_attempts)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically claims up to `max_jobs` runnable jobs and moves them to
    /// `processing`. Eligible are pending jobs, `processing` jobs whose
    /// worker went silent for longer than `stuck_timeout_minutes`, and
    /// failed jobs whose retry delay elapsed with attempts remaining.
    ///
    /// `FOR UPDATE SKIP LOCKED` makes concurrent claimers partition the
    /// queue instead of blocking or double-claiming.
    pub async fn claim_batch(
        pool: &PgPool,
        max_jobs: i64,
        stuck_timeout_minutes: f64,
    ) -> Result<Vec<ClaimedJob>, DbError> {
        let mut tx = pool.begin().await?;
        let jobs = sqlx::query_as::<_, ClaimedJob>(
            r"
            WITH candidate AS (
                SELECT id
                FROM face_processing_jobs
                WHERE status = 'pending'
                   OR (status = 'processing'
                       AND updated_at < now() - interval '1 minute' * $2)
                   OR (status = 'failed'
                       AND next_retry_at <= now()
                       AND attempt_count < max_attempts)
                ORDER BY created_at
                FOR UPDATE SKIP LOCKED
                LIMIT $1
            )
            UPDATE face_processing_jobs
            SET status = 'processing',
                attempt_count = attempt_count + 1,
                started_at = now(),
                updated_at = now(),
                error_message = NULL
            WHERE id IN (SELECT id FROM candidate)
            RETURNING id, event_id, media_id, attempt_count, max_attempts
            ",
        )
        .bind(max_jobs)
        .bind(stuck_timeout_minutes)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(jobs)
    }

    /// Marks the jobs of the given media as failed and schedules the retry.
    /// Jobs that already burned through `max_attempts` stay `failed` and are
    /// simply never picked up again by the claimer.
    pub async fn mark_batch_failed(
        executor: impl Executor<'_, Database = Postgres>,
        media_ids: &[Uuid],
        error_message: &str,
        next_retry_at: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"
            UPDATE face_processing_jobs
            SET status = 'failed',
                error_message = $2,
                next_retry_at = $3,
                updated_at = now()
            WHERE media_id = ANY($1)
            ",
        )
        .bind(media_ids)
        .bind(error_message)
        .bind(next_retry_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn status_counts(
        executor: impl Executor<'_, Database = Postgres>,
        event_id: Uuid,
    ) -> Result<JobStatusCounts, DbError> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r"
            SELECT status,
                   COUNT(*) AS count,
                   COALESCE(SUM(faces_found), 0) AS faces
            FROM face_processing_jobs
            WHERE event_id = $1
            GROUP BY status
            ",
        )
        .bind(event_id)
        .fetch_all(executor)
        .await?;
        Ok(JobStatusCounts::from_rows(&rows))
    }

    /// Retry timestamp for a freshly failed job. Spacing is a fixed base
    /// delay; the attempt cap bounds total work per job, not the spacing.
    #[must_use]
    pub fn retry_at(base_delay_s: i64) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(base_delay_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_at_is_base_delay_in_the_future() {
        let before = Utc::now();
        let at = FaceJobStore::retry_at(30);
        let after = Utc::now();
        assert!(at >= before + Duration::seconds(30));
        assert!(at <= after + Duration::seconds(30));
    }
}
