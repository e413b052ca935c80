use crate::database::tables::DisplayMediaRow;
use crate::face::recall::MediaMatch;
use crate::storage::R2Storage;
use app_state::DISPLAY_PRECISION;
use color_eyre::Result;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// One matched photo as clients see it. URLs are short-lived signed links
/// into the private R2 bucket.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DisplayResult {
    pub media_id: Uuid,
    pub album_id: Option<Uuid>,
    pub thumbnail_url: String,
    pub full_url: String,
    pub original_url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub score: f32,
    pub tier: u8,
}

#[must_use]
pub fn round_display(score: f32) -> f32 {
    let factor = 10f32.powi(DISPLAY_PRECISION as i32);
    (score * factor).round() / factor
}

/// Pairs matches with their media rows, rounding scores to display
/// precision. Matches whose media was deleted (or filtered out of the map)
/// are dropped, as are matches whose rounded score falls below
/// `display_threshold` when one is given.
pub fn displayable<'m>(
    matches: &[MediaMatch],
    media: &'m HashMap<Uuid, DisplayMediaRow>,
    display_threshold: Option<f32>,
) -> Vec<(MediaMatch, &'m DisplayMediaRow)> {
    matches
        .iter()
        .filter_map(|entry| {
            let rounded = round_display(entry.score);
            if let Some(threshold) = display_threshold
                && rounded < threshold
            {
                return None;
            }
            let row = media.get(&entry.media_id)?;
            let mut entry = *entry;
            entry.score = rounded;
            Some((entry, row))
        })
        .collect()
}

/// Builds the client-facing results for one tier, signing storage URLs.
/// The thumbnail and full views prefer the web-sized preview key when the
/// upload pipeline produced one; the original link always points at the
/// unmodified upload.
pub async fn assemble_results(
    storage: &R2Storage,
    matches: &[MediaMatch],
    media: &HashMap<Uuid, DisplayMediaRow>,
    display_threshold: Option<f32>,
    tier: u8,
) -> Result<Vec<DisplayResult>> {
    let mut results = Vec::new();
    for (entry, row) in displayable(matches, media, display_threshold) {
        let preview_key = row.preview_r2_key.as_deref().unwrap_or(&row.r2_key);
        results.push(DisplayResult {
            media_id: row.id,
            album_id: row.album_id,
            thumbnail_url: storage.signed_get_url(preview_key).await?,
            full_url: storage.signed_get_url(preview_key).await?,
            original_url: storage.signed_get_url(&row.r2_key).await?,
            width: row.width,
            height: row.height,
            score: entry.score,
            tier,
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Uuid) -> DisplayMediaRow {
        DisplayMediaRow {
            id,
            album_id: None,
            r2_key: format!("events/e/{id}.jpg"),
            preview_r2_key: None,
            width: Some(1920),
            height: Some(1080),
        }
    }

    fn entry(id: Uuid, score: f32) -> MediaMatch {
        MediaMatch {
            media_id: id,
            score,
            is_tier1: true,
        }
    }

    #[test]
    fn rounds_to_three_decimals() {
        assert!((round_display(0.123_456) - 0.123).abs() < 1e-6);
        assert!((round_display(0.123_5) - 0.124).abs() < 1e-6);
        assert!((round_display(0.7) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn drops_matches_below_display_threshold_after_rounding() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let media: HashMap<Uuid, DisplayMediaRow> =
            [a, b].into_iter().map(|id| (id, row(id))).collect();

        // 0.699_6 rounds to 0.7 and survives; 0.699_4 rounds to 0.699 and
        // must not appear.
        let matches = vec![entry(a, 0.699_6), entry(b, 0.699_4)];
        let shown = displayable(&matches, &media, Some(0.7));
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0.media_id, a);
        assert!((shown[0].0.score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn no_threshold_keeps_everything_with_media() {
        let a = Uuid::from_u128(1);
        let media: HashMap<Uuid, DisplayMediaRow> = [(a, row(a))].into_iter().collect();
        let matches = vec![entry(a, 0.05)];
        assert_eq!(displayable(&matches, &media, None).len(), 1);
    }

    #[test]
    fn drops_matches_whose_media_is_gone() {
        let a = Uuid::from_u128(1);
        let missing = Uuid::from_u128(2);
        let media: HashMap<Uuid, DisplayMediaRow> = [(a, row(a))].into_iter().collect();
        let matches = vec![entry(a, 0.9), entry(missing, 0.95)];
        let shown = displayable(&matches, &media, Some(0.5));
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0.media_id, a);
    }

    #[test]
    fn preserves_match_order() {
        let ids: Vec<Uuid> = (1..=3).map(Uuid::from_u128).collect();
        let media: HashMap<Uuid, DisplayMediaRow> =
            ids.iter().map(|id| (*id, row(*id))).collect();
        let matches: Vec<MediaMatch> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| entry(*id, 0.9 - index as f32 * 0.1))
            .collect();
        let shown = displayable(&matches, &media, None);
        let shown_ids: Vec<Uuid> = shown.iter().map(|(m, _)| m.media_id).collect();
        assert_eq!(shown_ids, ids);
    }
}
