use crate::api::face::error::FaceError;
use crate::api::face::interfaces::{
    EnqueueResponse, ProfileResponse, RecallResponse, SearchRequest, SearchResponse,
    StatusResponse, TriggerResponse,
};
use crate::database::{
    DbError, EventStore, FaceJobStore, FaceProfileStore, GalleryUserStore, MediaStore,
};
use crate::database::tables::{EventRef, MediaKind};
use crate::face::{
    DisplayResult, assemble_results, parse_prototype, run_face_search, run_recall_search,
    run_trigger_rounds, validate_embedding,
};
use crate::inference_client::InferenceClient;
use crate::storage::R2Storage;
use crate::utils::constant_time_eq;
use app_state::AppSettings;
use sqlx::PgPool;
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

/// Guards the internal pipeline endpoints with the shared scheduler secret.
/// The comparison is constant-time so response timing does not leak prefix
/// matches of the secret.
pub fn verify_face_secret(
    settings: &AppSettings,
    provided: Option<&str>,
) -> Result<(), FaceError> {
    let Some(expected) = settings.secrets.face_processing_secret.as_deref() else {
        return Err(FaceError::ServiceUnavailable(
            "Face processing is not configured.".to_string(),
        ));
    };
    if constant_time_eq(provided.unwrap_or_default(), expected) {
        Ok(())
    } else {
        Err(FaceError::Unauthorized)
    }
}

pub async fn trigger_processing(
    pool: &PgPool,
    settings: &AppSettings,
    storage: &R2Storage,
    inference: Option<&InferenceClient>,
) -> Result<TriggerResponse, FaceError> {
    let Some(inference) = inference else {
        return Err(FaceError::ServiceUnavailable(
            "GPU server not configured.".to_string(),
        ));
    };
    let summary = run_trigger_rounds(pool, settings, storage, inference).await?;
    Ok(TriggerResponse {
        dispatched: summary.dispatched,
        total_claimed: summary.total_claimed,
        errors: (!summary.errors.is_empty()).then_some(summary.errors),
    })
}

pub async fn enqueue_media(
    pool: &PgPool,
    settings: &AppSettings,
    media_id: Uuid,
) -> Result<EnqueueResponse, FaceError> {
    let Some(media) = MediaStore::find_by_id(pool, media_id).await? else {
        return Err(FaceError::NotFound("Media not found.".to_string()));
    };
    if MediaKind::from_db(&media.media_type) != Some(MediaKind::Image) {
        return Err(FaceError::BadRequest(
            "Only images get face processing.".to_string(),
        ));
    }
    let enqueued = FaceJobStore::enqueue(
        pool,
        media.event_id,
        media.id,
        settings.face_search.max_job_attempts,
    )
    .await?;
    Ok(EnqueueResponse { enqueued })
}

pub async fn processing_status(
    pool: &PgPool,
    organizer_id: Uuid,
    event_id: Uuid,
) -> Result<StatusResponse, FaceError> {
    if !EventStore::is_owned_by(pool, event_id, organizer_id).await? {
        return Err(FaceError::NotFound("Event not found.".to_string()));
    }
    let total_images = MediaStore::count_event_images(pool, event_id).await?;
    let counts = FaceJobStore::status_counts(pool, event_id).await?;
    Ok(StatusResponse {
        total_images,
        processed: counts.processed(),
        pending: counts.pending,
        processing: counts.processing,
        failed: counts.failed,
        no_faces: counts.no_faces,
        total_faces: counts.total_faces,
    })
}

/// Answers whether the caller has a stored recall profile for the event.
/// This endpoint never errors: any failure along the way reads as "no
/// profile" so the gallery can quietly fall back to the selfie flow.
pub async fn check_profile(
    pool: &PgPool,
    settings: &AppSettings,
    bearer: Option<&str>,
    event_hash: &str,
) -> ProfileResponse {
    match try_check_profile(pool, settings, bearer, event_hash).await {
        Ok(response) => response,
        Err(err) => {
            warn!("Profile check failed, reporting no profile: {}", err);
            ProfileResponse::default()
        }
    }
}

async fn try_check_profile(
    pool: &PgPool,
    settings: &AppSettings,
    bearer: Option<&str>,
    event_hash: &str,
) -> Result<ProfileResponse, DbError> {
    let Some(claims) = bearer
        .and_then(|token| crate::api::auth::token::decode_gallery_token(token, &settings.secrets.jwt).ok())
    else {
        return Ok(ProfileResponse::default());
    };
    let Some(event) = EventStore::find_public_by_hash(pool, event_hash).await? else {
        return Ok(ProfileResponse::default());
    };
    let Some(gallery_user) = GalleryUserStore::find_by_auth_id(pool, &claims.sub).await? else {
        return Ok(ProfileResponse::default());
    };
    let Some(profile) = FaceProfileStore::find(pool, gallery_user.id, event.id).await? else {
        return Ok(ProfileResponse::default());
    };
    Ok(ProfileResponse {
        has_profile: true,
        match_count: Some(profile.match_count),
        updated_at: Some(profile.updated_at),
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn empty_recall(has_profile: bool, started: Instant) -> RecallResponse {
    RecallResponse {
        has_profile,
        tier1: Vec::new(),
        tier2: Vec::new(),
        total_matches: 0,
        search_time_ms: elapsed_ms(started),
    }
}

fn require_face_search(event: &EventRef) -> Result<(), FaceError> {
    if event.face_search_enabled {
        Ok(())
    } else {
        Err(FaceError::BadRequest(
            "Face search is disabled for this event.".to_string(),
        ))
    }
}

/// Instant results from a stored profile: one scan, no GPU round-trip.
/// A missing or unparseable profile is not an error; the client falls back
/// to the selfie flow.
pub async fn recall_search(
    pool: &PgPool,
    settings: &AppSettings,
    storage: &R2Storage,
    bearer: Option<&str>,
    event_hash: &str,
) -> Result<RecallResponse, FaceError> {
    let started = Instant::now();
    let claims = bearer
        .and_then(|token| {
            crate::api::auth::token::decode_gallery_token(token, &settings.secrets.jwt).ok()
        })
        .ok_or(FaceError::Unauthorized)?;

    let Some(event) = EventStore::find_public_by_hash(pool, event_hash).await? else {
        return Err(FaceError::NotFound("Event not found.".to_string()));
    };
    require_face_search(&event)?;

    let Some(gallery_user) = GalleryUserStore::find_by_auth_id(pool, &claims.sub).await? else {
        return Ok(empty_recall(false, started));
    };
    let Some(profile) = FaceProfileStore::find(pool, gallery_user.id, event.id).await? else {
        return Ok(empty_recall(false, started));
    };
    let Some(prototype) = parse_prototype(&profile.prototype_embedding) else {
        warn!(
            "Stored prototype for gallery user {} is unusable, reporting no profile.",
            gallery_user.id
        );
        return Ok(empty_recall(false, started));
    };

    let matches = run_recall_search(pool, &prototype, event.id, &settings.face_search).await?;
    if matches.total() == 0 {
        return Ok(empty_recall(true, started));
    }

    let media_ids: Vec<Uuid> = matches
        .tier1
        .iter()
        .chain(matches.tier2.iter())
        .map(|entry| entry.media_id)
        .collect();
    let media = MediaStore::find_display_rows(pool, &media_ids).await?;

    let display_threshold = Some(settings.face_search.display_threshold);
    let tier1: Vec<DisplayResult> =
        assemble_results(storage, &matches.tier1, &media, display_threshold, 1).await?;
    let tier2: Vec<DisplayResult> =
        assemble_results(storage, &matches.tier2, &media, display_threshold, 2).await?;

    Ok(RecallResponse {
        has_profile: true,
        total_matches: tier1.len() + tier2.len(),
        tier1,
        tier2,
        search_time_ms: elapsed_ms(started),
    })
}

/// Full selfie search: embed the selfie on the GPU service, run the
/// refinement search, and store the refined prototype as the caller's
/// recall profile for next time.
pub async fn selfie_search(
    pool: &PgPool,
    settings: &AppSettings,
    storage: &R2Storage,
    inference: Option<&InferenceClient>,
    bearer: Option<&str>,
    request: SearchRequest,
) -> Result<SearchResponse, FaceError> {
    let started = Instant::now();
    let face_search = &settings.face_search;

    if request.selfie_base64.is_empty() {
        return Err(FaceError::BadRequest("Missing selfie.".to_string()));
    }
    // Base64 inflates by 4/3, so this bounds the decoded image size.
    if request.selfie_base64.len() / 4 * 3 > face_search.max_selfie_bytes {
        return Err(FaceError::BadRequest("Selfie too large (max 5MB).".to_string()));
    }

    let Some(event) = EventStore::find_public_by_hash(pool, &request.event_hash).await? else {
        return Err(FaceError::NotFound(
            "Event not found or not public.".to_string(),
        ));
    };
    require_face_search(&event)?;

    let Some(inference) = inference else {
        return Err(FaceError::ServiceUnavailable(
            "Face search service not configured.".to_string(),
        ));
    };

    let selfie = inference.embed_selfie(&request.selfie_base64).await?;
    if selfie.confidence < face_search.min_selfie_confidence {
        return Err(FaceError::SelfieRejected {
            code: "low_quality_selfie".to_string(),
            message: "Face detection confidence is too low. Try better lighting.".to_string(),
        });
    }
    if !validate_embedding(&selfie.embedding) {
        return Err(FaceError::SelfieRejected {
            code: "low_quality_selfie".to_string(),
            message: "Could not generate a valid face embedding. Please try again with better \
                      lighting."
                .to_string(),
        });
    }

    let outcome = run_face_search(pool, selfie.embedding, event.id, face_search).await?;
    let matches = &outcome.matches;

    let media_ids: Vec<Uuid> = matches
        .tier1
        .iter()
        .chain(matches.tier2.iter())
        .map(|entry| entry.media_id)
        .collect();
    let mut media = MediaStore::find_display_rows(pool, &media_ids).await?;
    if let Some(album_id) = request.album_id {
        media.retain(|_, row| row.album_id == Some(album_id));
    }

    let tier1 = assemble_results(storage, &matches.tier1, &media, None, 1).await?;
    let tier2 = assemble_results(storage, &matches.tier2, &media, None, 2).await?;
    let total_matches = tier1.len() + tier2.len();

    save_profile(pool, settings, bearer, event.id, &outcome.prototype, total_matches).await;

    Ok(SearchResponse {
        tier1,
        tier2,
        total_matches,
        search_time_ms: elapsed_ms(started),
    })
}

/// Stores the refined prototype when the caller has a gallery session.
/// Profile storage is best-effort; a failure here must not fail the search
/// the user is looking at.
async fn save_profile(
    pool: &PgPool,
    settings: &AppSettings,
    bearer: Option<&str>,
    event_id: Uuid,
    prototype: &[f32],
    match_count: usize,
) {
    let Some(claims) = bearer
        .and_then(|token| crate::api::auth::token::decode_gallery_token(token, &settings.secrets.jwt).ok())
    else {
        return;
    };
    let result = async {
        let Some(gallery_user) = GalleryUserStore::find_by_auth_id(pool, &claims.sub).await? else {
            return Ok::<_, DbError>(());
        };
        FaceProfileStore::upsert(pool, gallery_user.id, event_id, prototype, match_count as i32)
            .await
    }
    .await;
    if let Err(err) = result {
        warn!("Could not store face profile: {}", err);
    }
}
