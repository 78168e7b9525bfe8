//! Map geometry: center, ranked markers, and heatmap points.

use geo::{Centroid, MultiPoint, Point};
use geospy_location_models::{Coordinates, LocationRecord, MarkerStyle, RankingTier};
use serde::{Deserialize, Serialize};

use crate::config::{HeatmapStyle, PipelineConfig, TileLayer};

/// Everything needed to draw the map for one result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapGeometry {
    /// Mean of the non-sentinel coordinates.
    pub center: Coordinates,
    /// Initial zoom level.
    pub zoom_start: u8,
    /// Base tile layers.
    pub base_layers: Vec<TileLayer>,
    /// One marker per record with real coordinates, in rank order.
    pub markers: Vec<Marker>,
    /// Heatmap input. Empty unless the list had more than one record.
    pub heatmap_points: Vec<Coordinates>,
    /// Heatmap layer styling.
    pub heatmap_style: HeatmapStyle,
}

/// A ranked map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// 1-based position in the upstream list.
    pub rank: usize,
    /// Marker position.
    pub coordinates: Coordinates,
    /// Card tier for the same rank.
    pub tier: RankingTier,
    /// Marker colour and icon.
    pub style: MarkerStyle,
    /// Hover text, `#<rank>: <city>, <country>`.
    pub tooltip: String,
    /// Click-through summary.
    pub popup: MarkerPopup,
}

/// Marker popup contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPopup {
    /// `Rank #<rank>: <city>`
    pub title: String,
    /// `<city>, <state>`
    pub location: String,
    /// Country name.
    pub country: String,
    /// Confidence label.
    pub confidence: String,
    /// Coordinates with six decimals.
    pub coordinates: String,
    /// Truncated explanation.
    pub reasoning: String,
}

/// Builds the map geometry for a ranked list.
///
/// Returns `None` when there is nothing to draw: the list is empty or
/// every record carries the sentinel coordinates.
#[must_use]
pub fn aggregate(records: &[LocationRecord], config: &PipelineConfig) -> Option<MapGeometry> {
    let center = center_of(records)?;

    let markers = records
        .iter()
        .enumerate()
        .filter(|(_, record)| !record.coordinates.is_sentinel())
        .map(|(i, record)| build_marker(i + 1, record, config.popup_explanation_chars))
        .collect();

    let heatmap_points = if records.len() > 1 {
        valid_coordinates(records).collect()
    } else {
        Vec::new()
    };

    Some(MapGeometry {
        center,
        zoom_start: config.map.zoom_start,
        base_layers: config.map.base_layers.clone(),
        markers,
        heatmap_points,
        heatmap_style: config.heatmap.clone(),
    })
}

/// Arithmetic mean of the non-sentinel coordinates.
#[must_use]
pub fn center_of(records: &[LocationRecord]) -> Option<Coordinates> {
    let points: Vec<Point<f64>> = valid_coordinates(records)
        .map(|c| Point::new(c.longitude, c.latitude))
        .collect();

    MultiPoint::new(points)
        .centroid()
        .map(|p| Coordinates::new(p.y(), p.x()))
}

/// Truncates to `max_chars` characters and appends `...`.
///
/// The marker is always appended, even when nothing was cut. Only the
/// popup is shortened; the record keeps the full text.
#[must_use]
pub fn truncate_explanation(text: &str, max_chars: usize) -> String {
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

fn valid_coordinates(records: &[LocationRecord]) -> impl Iterator<Item = Coordinates> + '_ {
    records
        .iter()
        .map(|r| r.coordinates)
        .filter(|c| !c.is_sentinel())
}

fn build_marker(rank: usize, record: &LocationRecord, explanation_chars: usize) -> Marker {
    Marker {
        rank,
        coordinates: record.coordinates,
        tier: RankingTier::from_rank(rank),
        style: MarkerStyle::for_rank(rank),
        tooltip: format!("#{rank}: {}, {}", record.city, record.country),
        popup: MarkerPopup {
            title: format!("Rank #{rank}: {}", record.city),
            location: format!("{}, {}", record.city, record.state),
            country: record.country.clone(),
            confidence: record.confidence.to_string(),
            coordinates: record.coordinates.label(6),
            reasoning: truncate_explanation(&record.explanation, explanation_chars),
        },
    }
}
