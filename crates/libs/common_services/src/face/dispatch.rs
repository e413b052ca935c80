use crate::alert;
use crate::database::tables::{ClaimedJob, MediaStorageRef};
use crate::database::{FaceJobStore, MediaStore};
use crate::inference_client::{InferenceClient, InferenceError, MediaItemPayload};
use crate::storage::R2Storage;
use app_state::AppSettings;
use color_eyre::Result;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// What happened to one claimed batch: how many jobs reached the GPU
/// service, and human-readable reasons for the ones that did not.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub dispatched: usize,
    pub errors: Vec<String>,
}

/// The GPU service processes one event per call, so a mixed batch is
/// split by event before dispatch.
pub fn group_by_event(refs: Vec<MediaStorageRef>) -> HashMap<Uuid, Vec<MediaStorageRef>> {
    let mut groups: HashMap<Uuid, Vec<MediaStorageRef>> = HashMap::new();
    for media_ref in refs {
        groups.entry(media_ref.event_id).or_default().push(media_ref);
    }
    groups
}

/// Prefix for a failed group's error strings. An HTTP error from the GPU
/// service, a request that never got a response, and a URL-signing failure
/// each read differently in telemetry.
fn failure_prefix(err: &InferenceError) -> &'static str {
    match err {
        InferenceError::Status { .. } => "GPU server error",
        _ => "GPU request failed",
    }
}

const PRESIGN_PREFIX: &str = "URL signing failed";

/// Sends claimed jobs to the GPU service, one batch per event. A batch
/// whose presigning or dispatch fails is marked failed with a retry
/// timestamp; the other batches are unaffected. Media deleted since the
/// claim is skipped and left for the stuck-job recovery to clean up.
pub async fn dispatch_claimed(
    pool: &PgPool,
    settings: &AppSettings,
    storage: &R2Storage,
    inference: &InferenceClient,
    jobs: &[ClaimedJob],
) -> Result<DispatchOutcome> {
    let media_ids: Vec<Uuid> = jobs.iter().map(|job| job.media_id).collect();
    let refs = MediaStore::find_storage_refs(pool, &media_ids).await?;
    if refs.is_empty() {
        warn!("Claimed {} job(s) but none of the media still exists.", jobs.len());
        return Ok(DispatchOutcome::default());
    }

    let mut outcome = DispatchOutcome::default();
    for (event_id, group) in group_by_event(refs) {
        let mut items = Vec::with_capacity(group.len());
        let mut failure: Option<(&str, String)> = None;
        for media_ref in &group {
            match storage.signed_get_url(&media_ref.r2_key).await {
                Ok(r2_url) => items.push(MediaItemPayload {
                    media_id: media_ref.id,
                    r2_url,
                }),
                Err(err) => {
                    failure = Some((PRESIGN_PREFIX, err.to_string()));
                    break;
                }
            }
        }

        if failure.is_none() {
            match inference.process_gallery(event_id, &items).await {
                Ok(()) => {
                    info!("🚀 Dispatched {} job(s) for event {event_id}.", items.len());
                    outcome.dispatched += items.len();
                }
                Err(err) => failure = Some((failure_prefix(&err), err.to_string())),
            }
        }

        if let Some((prefix, detail)) = failure {
            alert!("Dispatch for event {event_id} failed: {detail}");
            outcome
                .errors
                .push(format!("{prefix} for event {event_id}: {detail}"));
            let group_media_ids: Vec<Uuid> =
                group.iter().map(|media_ref| media_ref.id).collect();
            FaceJobStore::mark_batch_failed(
                pool,
                &group_media_ids,
                &format!("{prefix}: {detail}"),
                FaceJobStore::retry_at(settings.face_search.retry_base_delay_s),
            )
            .await?;
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_ref(event: u128, media: u128) -> MediaStorageRef {
        MediaStorageRef {
            id: Uuid::from_u128(media),
            event_id: Uuid::from_u128(event),
            r2_key: format!("events/{event}/{media}.jpg"),
        }
    }

    #[test]
    fn groups_media_by_event() {
        let groups = group_by_event(vec![
            storage_ref(1, 10),
            storage_ref(2, 20),
            storage_ref(1, 11),
            storage_ref(1, 12),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&Uuid::from_u128(1)].len(), 3);
        assert_eq!(groups[&Uuid::from_u128(2)].len(), 1);
    }

    #[test]
    fn empty_input_gives_no_groups() {
        assert!(group_by_event(Vec::new()).is_empty());
    }

    #[test]
    fn http_and_transport_failures_get_distinct_prefixes() {
        let status_err = InferenceError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert_eq!(failure_prefix(&status_err), "GPU server error");

        let transport_err = InferenceError::Url(url::ParseError::EmptyHost);
        assert_eq!(failure_prefix(&transport_err), "GPU request failed");
        assert_ne!(failure_prefix(&status_err), failure_prefix(&transport_err));
        assert_ne!(PRESIGN_PREFIX, failure_prefix(&status_err));
    }
}
