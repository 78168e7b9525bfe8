//! Plain-text rendering of an analysis for the terminal.

use std::fmt::Write as _;

use console::{Style, style};
use geospy_ai::failure::UpstreamFailure;
use geospy_location_models::{Confidence, RankingTier};
use geospy_pipeline::aggregate::MapGeometry;
use geospy_pipeline::table::{ComparisonRow, HEADERS};
use geospy_pipeline::{AnalysisOutcome, LocationReport};

/// Longest bar in the confidence distribution, in characters.
const MAX_BAR_WIDTH: usize = 30;

/// Renders an outcome, plus the remediation hint when the provider failed.
#[must_use]
pub fn outcome(outcome: &AnalysisOutcome, failure: Option<&UpstreamFailure>) -> String {
    let mut out = String::new();

    match outcome {
        AnalysisOutcome::Failed { error, details } => {
            let _ = writeln!(out, "{} {}", style("✗").red().bold(), style(error).red().bold());
            if let Some(details) = details {
                let _ = writeln!(out, "  {details}");
            }
            if let Some(failure) = failure {
                let _ = writeln!(out);
                let _ = writeln!(out, "  {}", style(&failure.hint).dim());
            }
        }
        AnalysisOutcome::NoLocations { interpretation } => {
            let _ = writeln!(out, "{}", style("No locations identified.").yellow());
            if let Some(text) = interpretation {
                let _ = writeln!(out);
                section(&mut out, "Interpretation");
                let _ = writeln!(out, "  {text}");
            }
        }
        AnalysisOutcome::Located(report) => located(&mut out, report),
    }

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", style(title).bold().underlined());
}

fn located(out: &mut String, report: &LocationReport) {
    let summary = &report.summary;
    let _ = writeln!(
        out,
        "{} {}   {} {}   {} {}",
        style("Predictions:").dim(),
        summary.total_count,
        style("High confidence:").dim(),
        summary.high_confidence_count,
        style("Avg latitude:").dim(),
        summary.mean_latitude_label(),
    );
    let _ = writeln!(out);

    if let Some(text) = &report.interpretation {
        section(out, "Interpretation");
        let _ = writeln!(out, "  {text}");
        let _ = writeln!(out);
    }

    section(out, "Top predictions");
    for view in &report.rankings {
        let badge = tier_style(view.tier).apply_to(format!("#{}", view.rank));
        let _ = writeln!(
            out,
            "  {badge} {}  [{}]",
            style(&view.title).bold(),
            view.record.confidence
        );
        let _ = writeln!(out, "     {}", view.subtitle);
        let _ = writeln!(out, "     {}", style(&view.coordinates_label).dim());
        let _ = writeln!(out, "     {}", view.record.explanation);
    }
    let _ = writeln!(out);

    section(out, "Comparison");
    table(out, &report.table);
    let _ = writeln!(out);

    section(out, "Confidence distribution");
    let widest = summary.buckets.iter().map(|b| b.count).max().unwrap_or(0);
    for bucket in &summary.buckets {
        let width = if widest == 0 {
            0
        } else {
            (bucket.count * MAX_BAR_WIDTH).div_ceil(widest)
        };
        let _ = writeln!(
            out,
            "  {:<8} {} {}",
            bucket.confidence.as_ref(),
            confidence_style(bucket.confidence).apply_to("█".repeat(width)),
            bucket.count
        );
    }
    let _ = writeln!(out);

    section(out, "Map");
    match &report.map {
        Some(map) => map_summary(out, map),
        None => {
            let _ = writeln!(out, "  No valid coordinates to display.");
        }
    }
}

fn map_summary(out: &mut String, map: &MapGeometry) {
    let _ = writeln!(
        out,
        "  Center {} (zoom {})",
        map.center.label(4),
        map.zoom_start
    );
    for marker in &map.markers {
        let _ = writeln!(
            out,
            "  {} {} ({})",
            marker.style.icon.as_ref(),
            marker.tooltip,
            marker.style.color.as_ref()
        );
    }
    if !map.heatmap_points.is_empty() {
        let _ = writeln!(out, "  Heatmap of {} points", map.heatmap_points.len());
    }
}

fn table(out: &mut String, rows: &[ComparisonRow]) {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    table_line(out, &HEADERS, &widths);
    let rule = widths.map(|w| "-".repeat(w));
    table_line(out, &rule.each_ref().map(String::as_str), &widths);
    for row in rows {
        table_line(out, &row.cells(), &widths);
    }
}

fn table_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "  {}", padded.join("  ").trim_end());
}

fn tier_style(tier: RankingTier) -> Style {
    match tier {
        RankingTier::Gold => Style::new().yellow().bold(),
        RankingTier::Silver => Style::new().white().bold(),
        RankingTier::Bronze => Style::new().color256(166).bold(),
        RankingTier::Standard => Style::new().blue(),
    }
}

fn confidence_style(confidence: Confidence) -> Style {
    match confidence {
        Confidence::High => Style::new().green(),
        Confidence::Medium => Style::new().yellow(),
        Confidence::Low => Style::new().red(),
        Confidence::Unknown => Style::new().dim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geospy_location_models::RawAnalysis;
    use geospy_pipeline::analyze;
    use geospy_pipeline::config::PipelineConfig;
    use serde_json::json;

    fn render(value: serde_json::Value) -> String {
        console::set_colors_enabled(false);
        let result: RawAnalysis = serde_json::from_value(value).unwrap();
        outcome(&analyze(&result, &PipelineConfig::default()), None)
    }

    #[test]
    fn renders_located_report() {
        let text = render(json!({
            "interpretation": "Canal houses",
            "locations": [
                {"city": "Amsterdam", "state": "North Holland", "country": "Netherlands",
                 "confidence": "High",
                 "coordinates": {"latitude": 52.3676, "longitude": 4.9041}},
                {"city": "Utrecht", "country": "Netherlands", "confidence": "Low",
                 "coordinates": {"latitude": 52.0907, "longitude": 5.1214}},
            ]
        }));

        assert!(text.contains("Predictions: 2"));
        assert!(text.contains("High confidence: 1"));
        assert!(text.contains("Avg latitude: 52.23°"));
        assert!(text.contains("#1 Amsterdam, Netherlands  [High]"));
        assert!(text.contains("52.367600, 4.904100"));
        assert!(text.contains("Heatmap of 2 points"));
        assert!(text.contains("#1: Amsterdam, Netherlands"));
        assert!(text.contains("Rank  City"));
        assert!(text.contains("North Holland"));
    }

    #[test]
    fn renders_missing_map() {
        let text = render(json!({"locations": [{"city": "Nowhere"}]}));
        assert!(text.contains("Avg latitude: N/A"));
        assert!(text.contains("No valid coordinates to display."));
    }

    #[test]
    fn renders_failure_with_hint() {
        console::set_colors_enabled(false);
        let failure = UpstreamFailure::from_message("API key not valid");
        let result = failure.clone().into_result();
        let text = outcome(
            &analyze(&result, &PipelineConfig::default()),
            Some(&failure),
        );
        assert!(text.starts_with("✗ Invalid API Key"));
        assert!(text.contains("API key not valid"));
        assert!(text.contains(&failure.hint));
    }

    #[test]
    fn renders_no_locations() {
        let text = render(json!({"interpretation": "Open ocean"}));
        assert!(text.contains("No locations identified."));
        assert!(text.contains("Open ocean"));
    }
}
