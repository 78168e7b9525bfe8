//! Top-N ranking cards.

use geospy_location_models::{LocationRecord, RankingTier};
use serde::{Deserialize, Serialize};

/// A ranking card for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedView {
    /// 1-based rank.
    pub rank: usize,
    /// Rank-derived tier.
    pub tier: RankingTier,
    /// Badge style class, `ranking-<min(rank, 3)>`.
    pub badge_class: String,
    /// `<city>, <country>`
    pub title: String,
    /// State or region.
    pub subtitle: String,
    /// Coordinates with six decimals.
    pub coordinates_label: String,
    /// The record, including its full explanation.
    pub record: LocationRecord,
}

impl RankedView {
    fn new(rank: usize, record: &LocationRecord) -> Self {
        Self {
            rank,
            tier: RankingTier::from_rank(rank),
            badge_class: format!("ranking-{}", rank.min(3)),
            title: format!("{}, {}", record.city, record.country),
            subtitle: record.state.clone(),
            coordinates_label: record.coordinates.label(6),
            record: record.clone(),
        }
    }
}

/// Takes the first `limit` records in list order.
///
/// No re-sorting and no confidence filtering; an empty input yields an
/// empty sequence.
#[must_use]
pub fn present(records: &[LocationRecord], limit: usize) -> Vec<RankedView> {
    records
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, record)| RankedView::new(i + 1, record))
        .collect()
}
