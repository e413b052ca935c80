use crate::database::FaceJobStore;
use crate::face::dispatch::dispatch_claimed;
use crate::inference_client::InferenceClient;
use crate::storage::R2Storage;
use app_state::AppSettings;
use color_eyre::Result;
use sqlx::PgPool;
use tracing::info;

/// Aggregate of one trigger invocation across all its rounds.
#[derive(Debug, Default)]
pub struct TriggerSummary {
    pub dispatched: usize,
    pub total_claimed: usize,
    pub errors: Vec<String>,
}

/// Claims and dispatches jobs in rounds until the queue is drained or the
/// round cap is hit. The cap bounds one invocation on a deep backlog; the
/// next trigger simply picks up where this one stopped.
pub async fn run_trigger_rounds(
    pool: &PgPool,
    settings: &AppSettings,
    storage: &R2Storage,
    inference: &InferenceClient,
) -> Result<TriggerSummary> {
    let face_search = &settings.face_search;
    let mut summary = TriggerSummary::default();

    for round in 0..face_search.max_trigger_rounds {
        let jobs = FaceJobStore::claim_batch(
            pool,
            face_search.max_batch_size,
            face_search.stuck_job_timeout_minutes,
        )
        .await?;
        if jobs.is_empty() {
            if round == 0 {
                info!("💤 No face jobs to dispatch.");
            }
            break;
        }

        info!("🐜 Round {}: claimed {} face job(s).", round + 1, jobs.len());
        summary.total_claimed += jobs.len();

        let outcome = dispatch_claimed(pool, settings, storage, inference, &jobs).await?;
        summary.dispatched += outcome.dispatched;
        summary.errors.extend(outcome.errors);
    }

    info!(
        "Trigger done: {} of {} job(s) dispatched, {} error(s).",
        summary.dispatched,
        summary.total_claimed,
        summary.errors.len()
    );
    Ok(summary)
}
