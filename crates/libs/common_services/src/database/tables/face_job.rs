use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

/// Lifecycle of a face processing job. `completed` and `no_faces` are
/// written by the GPU service once it has stored the embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "face_job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FaceJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    NoFaces,
}

/// A job that was just moved to `processing` by the claimer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimedJob {
    pub id: Uuid,
    pub event_id: Uuid,
    pub media_id: Uuid,
    pub attempt_count: i16,
    pub max_attempts: i16,
}

#[derive(Debug, sqlx::FromRow)]
pub struct StatusCountRow {
    pub status: FaceJobStatus,
    pub count: i64,
    pub faces: i64,
}

/// Per-event job counts, aggregated from the grouped status query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobStatusCounts {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    pub no_faces: i64,
    pub total_faces: i64,
}

impl JobStatusCounts {
    #[must_use]
    pub fn from_rows(rows: &[StatusCountRow]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            match row.status {
                FaceJobStatus::Pending => counts.pending = row.count,
                FaceJobStatus::Processing => counts.processing = row.count,
                FaceJobStatus::Completed => {
                    counts.completed = row.count;
                    // Only completed jobs contribute face counts; a failed
                    // job's partial count would double once it retries.
                    counts.total_faces = row.faces;
                }
                FaceJobStatus::Failed => counts.failed = row.count,
                FaceJobStatus::NoFaces => counts.no_faces = row.count,
            }
        }
        counts
    }

    /// Jobs that finished successfully, with or without faces. Failed jobs
    /// are reported separately so organizers see them as actionable.
    #[must_use]
    pub const fn processed(&self) -> i64 {
        self.completed + self.no_faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_aggregate_by_status() {
        let rows = vec![
            StatusCountRow {
                status: FaceJobStatus::Completed,
                count: 5,
                faces: 12,
            },
            StatusCountRow {
                status: FaceJobStatus::NoFaces,
                count: 2,
                faces: 0,
            },
            StatusCountRow {
                status: FaceJobStatus::Failed,
                count: 1,
                faces: 4,
            },
            StatusCountRow {
                status: FaceJobStatus::Pending,
                count: 3,
                faces: 0,
            },
        ];
        let counts = JobStatusCounts::from_rows(&rows);
        assert_eq!(counts.completed, 5);
        assert_eq!(counts.no_faces, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.pending, 3);
        // Faces from failed attempts must not leak into the total.
        assert_eq!(counts.total_faces, 12);
        assert_eq!(counts.processed(), 7);
    }

    #[test]
    fn empty_rows_give_zero_counts() {
        let counts = JobStatusCounts::from_rows(&[]);
        assert_eq!(counts, JobStatusCounts::default());
        assert_eq!(counts.processed(), 0);
    }
}
