use crate::database::DbError;
use crate::face::embedding::mean_prototype;
use crate::face::recall::{FaceHit, TieredMatches, aggregate_by_media, scan_candidates, split_tiers};
use app_state::FaceSearchSettings;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

/// Result of a selfie search: tiered media matches plus the prototype that
/// produced them, which becomes the user's stored recall profile.
#[derive(Debug)]
pub struct FaceSearchOutcome {
    pub matches: TieredMatches,
    pub prototype: Vec<f32>,
}

/// Merges a scan's hits into the running face-level score map, expanding the
/// tier 1 face set. Returns the embeddings of faces that newly made tier 1.
fn merge_hits(
    all_scores: &mut HashMap<Uuid, (Uuid, f32)>,
    tier1_faces: &mut HashSet<Uuid>,
    hits: &[FaceHit],
    tier1_threshold: f32,
) -> Vec<Vec<f32>> {
    let mut new_embeddings = Vec::new();
    for hit in hits {
        all_scores
            .entry(hit.face_id)
            .and_modify(|(_, score)| {
                if hit.score > *score {
                    *score = hit.score;
                }
            })
            .or_insert((hit.media_id, hit.score));
        if hit.score >= tier1_threshold && tier1_faces.insert(hit.face_id) {
            new_embeddings.push(hit.embedding.as_slice().to_vec());
        }
    }
    new_embeddings
}

/// The prototype is the mean of the tier 1 face embeddings alone. The
/// selfie only seeds the query; it stays out of the prototype so a stored
/// profile represents gallery faces, not the capture conditions of one
/// selfie. Without any tier 1 face the selfie is all there is to search by.
fn build_prototype(tier1_embeddings: &[Vec<f32>], selfie: &[f32]) -> Vec<f32> {
    mean_prototype(tier1_embeddings).unwrap_or_else(|| selfie.to_vec())
}

/// Full selfie search with iterative prototype refinement.
///
/// The selfie embedding seeds a scan at the tier 2 floor. Tier 1 faces are
/// averaged into a prototype, which is re-scanned for up to
/// `refinement_cycles` rounds until no new tier 1 faces turn up. Tier
/// membership follows the face set, not the final score: a face that ever
/// cleared the tier 1 bar keeps its media in tier 1.
pub async fn run_face_search(
    pool: &PgPool,
    selfie_embedding: Vec<f32>,
    event_id: Uuid,
    face_search: &FaceSearchSettings,
) -> Result<FaceSearchOutcome, DbError> {
    let mut all_scores: HashMap<Uuid, (Uuid, f32)> = HashMap::new();
    let mut tier1_faces: HashSet<Uuid> = HashSet::new();
    let mut tier1_embeddings: Vec<Vec<f32>> = Vec::new();
    let mut prototype = selfie_embedding.clone();

    let initial_hits = scan_candidates(
        pool,
        &prototype,
        event_id,
        face_search.tier2_threshold,
        face_search.max_candidates,
    )
    .await?;
    let mut new_embeddings = merge_hits(
        &mut all_scores,
        &mut tier1_faces,
        &initial_hits,
        face_search.tier1_threshold,
    );

    for cycle in 0..face_search.refinement_cycles {
        if new_embeddings.is_empty() {
            break;
        }
        tier1_embeddings.extend(new_embeddings);
        prototype = build_prototype(&tier1_embeddings, &selfie_embedding);

        let hits = scan_candidates(
            pool,
            &prototype,
            event_id,
            face_search.tier2_threshold,
            face_search.max_candidates,
        )
        .await?;
        new_embeddings = merge_hits(
            &mut all_scores,
            &mut tier1_faces,
            &hits,
            face_search.tier1_threshold,
        );
        debug!(
            "Refinement cycle {}: {} tier 1 face(s), {} new.",
            cycle + 1,
            tier1_faces.len(),
            new_embeddings.len()
        );
    }

    // Tier 1 faces from the final scan still belong to the stored prototype.
    tier1_embeddings.extend(new_embeddings);
    prototype = build_prototype(&tier1_embeddings, &selfie_embedding);

    let matches = split_tiers(aggregate_by_media(all_scores.iter().map(
        |(face_id, (media_id, score))| (*media_id, *score, tier1_faces.contains(face_id)),
    )));
    Ok(FaceSearchOutcome { matches, prototype })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgvector::Vector;

    fn hit(face: u128, media: u128, score: f32) -> FaceHit {
        FaceHit {
            face_id: Uuid::from_u128(face),
            media_id: Uuid::from_u128(media),
            embedding: Vector::from(vec![1.0, 0.0]),
            score,
        }
    }

    #[test]
    fn merge_collects_new_tier1_embeddings_once() {
        let mut all_scores = HashMap::new();
        let mut tier1_faces = HashSet::new();
        let hits = vec![hit(1, 10, 0.95), hit(2, 11, 0.80)];

        let first = merge_hits(&mut all_scores, &mut tier1_faces, &hits, 0.90);
        assert_eq!(first.len(), 1);
        assert_eq!(tier1_faces.len(), 1);

        // Seeing the same tier 1 face again must not re-add its embedding.
        let second = merge_hits(&mut all_scores, &mut tier1_faces, &hits, 0.90);
        assert!(second.is_empty());
    }

    #[test]
    fn merge_keeps_best_score_across_scans() {
        let mut all_scores = HashMap::new();
        let mut tier1_faces = HashSet::new();
        merge_hits(&mut all_scores, &mut tier1_faces, &[hit(1, 10, 0.70)], 0.90);
        merge_hits(&mut all_scores, &mut tier1_faces, &[hit(1, 10, 0.93)], 0.90);
        merge_hits(&mut all_scores, &mut tier1_faces, &[hit(1, 10, 0.60)], 0.90);

        let (media_id, score) = all_scores[&Uuid::from_u128(1)];
        assert_eq!(media_id, Uuid::from_u128(10));
        assert!((score - 0.93).abs() < f32::EPSILON);
        assert!(tier1_faces.contains(&Uuid::from_u128(1)));
    }

    #[test]
    fn prototype_comes_from_tier1_faces_only() {
        let selfie = vec![1.0, 0.0];
        let face = vec![0.6, 0.8];
        // One tier 1 face: the prototype is that face, untouched by the
        // selfie that found it.
        let prototype = build_prototype(&[face], &selfie);
        assert!((prototype[0] - 0.6).abs() < 1e-6);
        assert!((prototype[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn prototype_falls_back_to_the_selfie_without_tier1_faces() {
        let selfie = vec![1.0, 0.0];
        assert_eq!(build_prototype(&[], &selfie), selfie);
    }

    #[test]
    fn tier_membership_follows_face_set_not_final_score() {
        let mut all_scores = HashMap::new();
        let mut tier1_faces = HashSet::new();
        // Face cleared the bar once, later scans score it lower.
        merge_hits(&mut all_scores, &mut tier1_faces, &[hit(1, 10, 0.92)], 0.90);
        merge_hits(&mut all_scores, &mut tier1_faces, &[hit(1, 10, 0.85)], 0.90);

        let tiers = split_tiers(aggregate_by_media(all_scores.iter().map(
            |(face_id, (media_id, score))| (*media_id, *score, tier1_faces.contains(face_id)),
        )));
        assert_eq!(tiers.tier1.len(), 1);
        assert!(tiers.tier2.is_empty());
    }
}
