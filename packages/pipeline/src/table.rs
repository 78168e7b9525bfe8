//! Flat comparison table.

use geospy_location_models::{Confidence, LocationRecord};
use serde::{Deserialize, Serialize};

/// Column headers, in cell order.
pub const HEADERS: [&str; 7] = [
    "Rank",
    "City",
    "State/Region",
    "Country",
    "Confidence",
    "Latitude",
    "Longitude",
];

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    /// `#<rank>`
    pub rank: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Country.
    pub country: String,
    /// Confidence level.
    pub confidence: Confidence,
    /// Latitude with four decimals.
    pub latitude: String,
    /// Longitude with four decimals.
    pub longitude: String,
}

impl ComparisonRow {
    /// Cells in [`HEADERS`] order.
    #[must_use]
    pub fn cells(&self) -> [&str; 7] {
        [
            self.rank.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
            self.confidence.as_ref(),
            self.latitude.as_str(),
            self.longitude.as_str(),
        ]
    }
}

/// Projects every record into a row, preserving order.
#[must_use]
pub fn build(records: &[LocationRecord]) -> Vec<ComparisonRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| ComparisonRow {
            rank: format!("#{}", i + 1),
            city: record.city.clone(),
            state: record.state.clone(),
            country: record.country.clone(),
            confidence: record.confidence,
            latitude: format!("{:.4}", record.coordinates.latitude),
            longitude: format!("{:.4}", record.coordinates.longitude),
        })
        .collect()
}
