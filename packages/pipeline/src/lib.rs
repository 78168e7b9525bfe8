#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location result aggregation and map projections.
//!
//! Converts the ranked location list returned by the inference service into
//! the artifacts a presentation layer draws:
//!
//! - [`normalize`]: raw JSON entries to fully-populated records
//! - [`aggregate`]: map center, ranked markers, and heatmap points
//! - [`ranking`]: the top-N ranking cards
//! - [`table`]: the flat comparison table
//! - [`stats`]: confidence distribution and summary metrics
//!
//! All components are pure functions over an immutable slice. [`analyze`]
//! dispatches a whole [`RawAnalysis`] through them.

pub mod aggregate;
pub mod config;
pub mod export;
pub mod normalize;
pub mod ranking;
pub mod stats;
pub mod table;

use geospy_location_models::{LocationRecord, RawAnalysis};
use serde::{Deserialize, Serialize};

use crate::aggregate::MapGeometry;
use crate::config::PipelineConfig;
use crate::ranking::RankedView;
use crate::stats::{ChartBar, ConfidenceSummary};
use crate::table::ComparisonRow;

/// What the presentation layer should show for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AnalysisOutcome {
    /// The inference service reported an error; nothing was processed.
    #[serde(rename_all = "camelCase")]
    Failed {
        /// Error message, verbatim.
        error: String,
        /// Optional detail, verbatim.
        details: Option<String>,
    },
    /// The analysis succeeded but named no locations.
    #[serde(rename_all = "camelCase")]
    NoLocations {
        /// Narrative description, if any.
        interpretation: Option<String>,
    },
    /// At least one location was returned.
    Located(Box<LocationReport>),
}

/// The projections computed for a non-empty location list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    /// Narrative description, passed through unmodified.
    pub interpretation: Option<String>,
    /// Normalized records in upstream order.
    pub records: Vec<LocationRecord>,
    /// Map geometry, or `None` when no record has real coordinates.
    pub map: Option<MapGeometry>,
    /// Top-N ranking cards.
    pub rankings: Vec<RankedView>,
    /// Comparison table rows.
    pub table: Vec<ComparisonRow>,
    /// Confidence statistics.
    pub summary: ConfidenceSummary,
    /// Confidence distribution chart series.
    pub chart: Vec<ChartBar>,
}

impl LocationReport {
    /// Runs every component over an already-normalized list.
    #[must_use]
    pub fn build(
        records: Vec<LocationRecord>,
        interpretation: Option<String>,
        config: &PipelineConfig,
    ) -> Self {
        let map = aggregate::aggregate(&records, config);
        let rankings = ranking::present(&records, config.ranking_limit);
        let table = table::build(&records);
        let summary = stats::summarize(&records);
        let chart = summary.chart(config);

        Self {
            interpretation,
            records,
            map,
            rankings,
            table,
            summary,
            chart,
        }
    }
}

/// Routes an inference result through the pipeline.
///
/// An `error` short-circuits everything and is forwarded verbatim. A
/// missing, non-array, or empty `locations` field is reported as
/// [`AnalysisOutcome::NoLocations`], distinct from a failure.
#[must_use]
pub fn analyze(result: &RawAnalysis, config: &PipelineConfig) -> AnalysisOutcome {
    if let Some(error) = &result.error {
        log::warn!("Analysis failed upstream: {error}");
        return AnalysisOutcome::Failed {
            error: error.clone(),
            details: result.details.clone(),
        };
    }

    let raw = result.location_values();
    if raw.is_empty() {
        log::info!("Analysis returned no locations");
        return AnalysisOutcome::NoLocations {
            interpretation: result.interpretation.clone(),
        };
    }

    let records = normalize::normalize(raw);
    let report = LocationReport::build(records, result.interpretation.clone(), config);

    log::info!(
        "Analysis returned {} location(s), {} high confidence, map {}",
        report.summary.total_count,
        report.summary.high_confidence_count,
        if report.map.is_some() {
            "available"
        } else {
            "unavailable"
        }
    );

    AnalysisOutcome::Located(Box::new(report))
}
