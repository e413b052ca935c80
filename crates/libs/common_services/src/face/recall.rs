use crate::database::DbError;
use app_state::{FaceSearchSettings, GAMMA, SCORE_PRECISION, W_COSINE, W_L2};
use pgvector::Vector;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// One stored face compared against a query embedding.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FaceHit {
    pub face_id: Uuid,
    pub media_id: Uuid,
    pub embedding: Vector,
    pub score: f32,
}

/// A media item's best face score within one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaMatch {
    pub media_id: Uuid,
    pub score: f32,
    pub is_tier1: bool,
}

#[derive(Debug, Default)]
pub struct TieredMatches {
    pub tier1: Vec<MediaMatch>,
    pub tier2: Vec<MediaMatch>,
}

impl TieredMatches {
    #[must_use]
    pub fn total(&self) -> usize {
        self.tier1.len() + self.tier2.len()
    }
}

/// Pulls candidate faces for one event, scored against the query embedding.
///
/// The combined score blends cosine similarity with an exponentially decayed
/// L2 distance, then rounds so equal faces land on exactly equal scores.
/// Only faces at or above `threshold` (the tier 2 floor in practice) come
/// back, best first.
pub async fn scan_candidates(
    pool: &PgPool,
    query_embedding: &[f32],
    event_id: Uuid,
    threshold: f32,
    max_candidates: i64,
) -> Result<Vec<FaceHit>, DbError> {
    let sql = format!(
        r"
        SELECT face_id, media_id, embedding, score
        FROM (
            SELECT fe.id AS face_id,
                   fe.media_id,
                   fe.embedding,
                   round((
                       {W_COSINE} * (1 - (fe.embedding <=> $1))
                       + {W_L2} * exp(-{GAMMA} * (fe.embedding <-> $1))
                   )::numeric, {SCORE_PRECISION})::real AS score
            FROM face_embeddings fe
            WHERE fe.event_id = $2
        ) scored
        WHERE score >= $3
        ORDER BY score DESC, media_id
        LIMIT $4
        ",
    );
    Ok(sqlx::query_as::<_, FaceHit>(&sql)
        .bind(Vector::from(query_embedding.to_vec()))
        .bind(event_id)
        .bind(threshold)
        .bind(max_candidates)
        .fetch_all(pool)
        .await?)
}

/// Collapses face-level hits to one entry per media item, keeping the best
/// score and remembering whether any face of it made tier 1. Output order
/// is deterministic: score descending, media id as tie-breaker.
pub fn aggregate_by_media(hits: impl IntoIterator<Item = (Uuid, f32, bool)>) -> Vec<MediaMatch> {
    let mut best: HashMap<Uuid, MediaMatch> = HashMap::new();
    for (media_id, score, is_tier1) in hits {
        best.entry(media_id)
            .and_modify(|entry| {
                if score > entry.score {
                    entry.score = score;
                }
                entry.is_tier1 |= is_tier1;
            })
            .or_insert(MediaMatch {
                media_id,
                score,
                is_tier1,
            });
    }
    let mut matches: Vec<MediaMatch> = best.into_values().collect();
    matches.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.media_id.cmp(&b.media_id))
    });
    matches
}

#[must_use]
pub fn split_tiers(matches: Vec<MediaMatch>) -> TieredMatches {
    let mut tiers = TieredMatches::default();
    for entry in matches {
        if entry.is_tier1 {
            tiers.tier1.push(entry);
        } else {
            tiers.tier2.push(entry);
        }
    }
    tiers
}

/// Single-pass recall search against a stored prototype. One scan at the
/// tier 2 floor; faces at or above the tier 1 threshold put their media in
/// tier 1, the rest lands in tier 2.
pub async fn run_recall_search(
    pool: &PgPool,
    prototype: &[f32],
    event_id: Uuid,
    face_search: &FaceSearchSettings,
) -> Result<TieredMatches, DbError> {
    let hits = scan_candidates(
        pool,
        prototype,
        event_id,
        face_search.tier2_threshold,
        face_search.max_candidates,
    )
    .await?;
    let aggregated = aggregate_by_media(
        hits.iter()
            .map(|hit| (hit.media_id, hit.score, hit.score >= face_search.tier1_threshold)),
    );
    Ok(split_tiers(aggregated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn keeps_best_score_per_media() {
        let matches = aggregate_by_media(vec![
            (media(1), 0.50, false),
            (media(1), 0.91, true),
            (media(1), 0.73, false),
        ]);
        assert_eq!(matches.len(), 1);
        assert!((matches[0].score - 0.91).abs() < f32::EPSILON);
        assert!(matches[0].is_tier1);
    }

    #[test]
    fn tier1_membership_sticks_even_when_best_score_comes_later() {
        // A later low-score face must not demote media already in tier 1.
        let matches = aggregate_by_media(vec![(media(1), 0.95, true), (media(1), 0.40, false)]);
        assert!(matches[0].is_tier1);
        assert!((matches[0].score - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn sorts_by_score_then_media_id() {
        let matches = aggregate_by_media(vec![
            (media(3), 0.80, true),
            (media(1), 0.80, true),
            (media(2), 0.90, true),
        ]);
        let ids: Vec<Uuid> = matches.iter().map(|m| m.media_id).collect();
        assert_eq!(ids, vec![media(2), media(1), media(3)]);
    }

    #[test]
    fn identical_input_gives_identical_order() {
        let hits = vec![
            (media(5), 0.77, true),
            (media(9), 0.77, true),
            (media(2), 0.77, true),
            (media(7), 0.88, true),
        ];
        let first = aggregate_by_media(hits.clone());
        let second = aggregate_by_media(hits);
        assert_eq!(first, second);
    }

    #[test]
    fn splits_matches_into_tiers() {
        let tiers = split_tiers(aggregate_by_media(vec![
            (media(1), 0.95, true),
            (media(2), 0.80, false),
            (media(3), 0.92, true),
        ]));
        assert_eq!(tiers.tier1.len(), 2);
        assert_eq!(tiers.tier2.len(), 1);
        assert_eq!(tiers.tier2[0].media_id, media(2));
        assert_eq!(tiers.total(), 3);
    }

    #[test]
    fn scenario_with_three_media_lands_in_expected_tiers() {
        // Thresholds 0.90 / 0.75: A (0.95) is tier 1, B (0.80) is tier 2,
        // C (0.60) was already cut by the scan's tier 2 floor.
        let tier1_threshold = 0.90f32;
        let hits = vec![(media(1), 0.95f32), (media(2), 0.80f32)];
        let tiers = split_tiers(aggregate_by_media(
            hits.into_iter()
                .map(|(id, score)| (id, score, score >= tier1_threshold)),
        ));
        assert_eq!(tiers.tier1.len(), 1);
        assert_eq!(tiers.tier1[0].media_id, media(1));
        assert_eq!(tiers.tier2.len(), 1);
        assert_eq!(tiers.tier2[0].media_id, media(2));
    }
}
