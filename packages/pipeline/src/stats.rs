//! Confidence distribution and summary metrics.

use geospy_location_models::{Confidence, LocationRecord};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

/// Count of records sharing one confidence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBucket {
    /// The label.
    pub confidence: Confidence,
    /// Number of records.
    pub count: usize,
}

/// A bar in the confidence distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    /// Confidence label.
    pub label: String,
    /// Number of predictions.
    pub count: usize,
    /// Bar colour.
    pub color: String,
}

/// Aggregate statistics over a location list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceSummary {
    /// One bucket per observed label, in first-seen order.
    pub buckets: Vec<ConfidenceBucket>,
    /// Number of records.
    pub total_count: usize,
    /// Records labelled exactly `High`.
    pub high_confidence_count: usize,
    /// Mean latitude over non-sentinel coordinates; `None` when there are
    /// none.
    pub mean_latitude: Option<f64>,
}

impl ConfidenceSummary {
    /// Count for one label (zero when not observed).
    #[must_use]
    pub fn count(&self, confidence: Confidence) -> usize {
        self.buckets
            .iter()
            .find(|b| b.confidence == confidence)
            .map_or(0, |b| b.count)
    }

    /// Mean latitude as `"<v>°"` with two decimals, or `"N/A"`.
    #[must_use]
    pub fn mean_latitude_label(&self) -> String {
        self.mean_latitude
            .map_or_else(|| "N/A".to_string(), |lat| format!("{lat:.2}°"))
    }

    /// Chart series with colours from `config`.
    #[must_use]
    pub fn chart(&self, config: &PipelineConfig) -> Vec<ChartBar> {
        self.buckets
            .iter()
            .map(|b| ChartBar {
                label: b.confidence.to_string(),
                count: b.count,
                color: config.confidence_color(b.confidence).to_string(),
            })
            .collect()
    }
}

/// Tallies confidence labels and derives the summary metrics.
///
/// Records that had no confidence were already defaulted to `Medium` by
/// the normalizer and count there; an explicit `Unknown` stays its own
/// bucket.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(records: &[LocationRecord]) -> ConfidenceSummary {
    let mut buckets: Vec<ConfidenceBucket> = Vec::new();
    for record in records {
        match buckets
            .iter_mut()
            .find(|b| b.confidence == record.confidence)
        {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(ConfidenceBucket {
                confidence: record.confidence,
                count: 1,
            }),
        }
    }

    let high_confidence_count = records
        .iter()
        .filter(|r| r.confidence == Confidence::High)
        .count();

    let latitudes: Vec<f64> = records
        .iter()
        .filter(|r| !r.coordinates.is_sentinel())
        .map(|r| r.coordinates.latitude)
        .collect();
    let mean_latitude = if latitudes.is_empty() {
        None
    } else {
        Some(latitudes.iter().sum::<f64>() / latitudes.len() as f64)
    };

    ConfidenceSummary {
        buckets,
        total_count: records.len(),
        high_confidence_count,
        mean_latitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geospy_location_models::Coordinates;

    fn record(confidence: Confidence, lat: f64, lng: f64) -> LocationRecord {
        LocationRecord {
            confidence,
            coordinates: Coordinates::new(lat, lng),
            ..LocationRecord::default()
        }
    }

    #[test]
    fn empty_list() {
        let summary = summarize(&[]);
        assert!(summary.buckets.is_empty());
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.high_confidence_count, 0);
        assert!(summary.mean_latitude.is_none());
        assert_eq!(summary.mean_latitude_label(), "N/A");
    }

    #[test]
    fn buckets_in_first_seen_order() {
        let summary = summarize(&[
            record(Confidence::Low, 1.0, 1.0),
            record(Confidence::High, 2.0, 2.0),
            record(Confidence::Low, 3.0, 3.0),
            record(Confidence::Unknown, 0.0, 0.0),
        ]);
        let order: Vec<Confidence> = summary.buckets.iter().map(|b| b.confidence).collect();
        assert_eq!(
            order,
            [Confidence::Low, Confidence::High, Confidence::Unknown]
        );
        assert_eq!(summary.count(Confidence::Low), 2);
        assert_eq!(summary.count(Confidence::Medium), 0);
        assert_eq!(summary.high_confidence_count, 1);
        let total: usize = summary.buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, summary.total_count);
    }

    #[test]
    fn mean_latitude_skips_sentinel() {
        let summary = summarize(&[
            record(Confidence::High, 48.8566, 2.3522),
            record(Confidence::Medium, 0.0, 0.0),
        ]);
        assert!((summary.mean_latitude.unwrap() - 48.8566).abs() < 1e-9);
        assert_eq!(summary.mean_latitude_label(), "48.86°");
    }

    #[test]
    fn equator_point_with_longitude_counts() {
        let summary = summarize(&[
            record(Confidence::High, 0.0, 30.0),
            record(Confidence::High, 10.0, 30.0),
        ]);
        assert!((summary.mean_latitude.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn all_sentinel_mean_is_undefined() {
        let summary = summarize(&[record(Confidence::High, 0.0, 0.0)]);
        assert!(summary.mean_latitude.is_none());
        assert_eq!(summary.high_confidence_count, 1);
    }

    #[test]
    fn chart_uses_configured_colours() {
        let summary = summarize(&[
            record(Confidence::High, 1.0, 1.0),
            record(Confidence::Unknown, 1.0, 1.0),
        ]);
        let chart = summary.chart(&PipelineConfig::default());
        assert_eq!(chart[0].label, "High");
        assert_eq!(chart[0].color, "#28a745");
        assert_eq!(chart[1].label, "Unknown");
        assert_eq!(chart[1].color, "#6c757d");
    }
}
