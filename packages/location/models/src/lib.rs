#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location record types shared across the GeoSpy toolchain.
//!
//! The inference service returns a loosely-typed JSON document
//! ([`RawAnalysis`]). Everything downstream of the normalizer works on the
//! closed, fully-populated [`LocationRecord`] shape defined here, together
//! with the rank-derived display categories ([`RankingTier`] and
//! [`MarkerStyle`]).

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Placeholder for absent city/state/country fields.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Placeholder for an absent explanation.
pub const NO_EXPLANATION: &str = "No explanation provided";

/// A WGS84 latitude/longitude pair.
///
/// The pair `(0.0, 0.0)` is the "missing coordinates" sentinel. Upstream
/// defaulting writes zeros when the model gave no position, so a sentinel
/// pair is never treated as a real point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// The "no coordinate data" sentinel.
    pub const SENTINEL: Self = Self::new(0.0, 0.0);

    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether this pair is the `(0.0, 0.0)` sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Formats as `"<lat>, <lng>"` with the given number of decimals.
    #[must_use]
    pub fn label(&self, decimals: usize) -> String {
        format!(
            "{:.decimals$}, {:.decimals$}",
            self.latitude, self.longitude
        )
    }
}

/// Confidence level reported by the inference service.
///
/// Parsing is exact: the upstream labels are capitalized words, and any
/// other string lands in [`Confidence::Unknown`]. An absent field defaults
/// to [`Confidence::Medium`] during normalization.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Confidence {
    /// The model is confident in this location.
    High,
    /// Default when the model gave no confidence.
    #[default]
    Medium,
    /// The model considers this location a weak guess.
    Low,
    /// An explicit `"Unknown"` label, or any label outside the known set.
    Unknown,
}

impl Confidence {
    /// Maps a raw label onto the closed set.
    ///
    /// Matching is exact and case-sensitive: `"high"` or `"Very High"`
    /// become [`Self::Unknown`], and the upstream spelling is not kept.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(Self::Unknown)
    }

    /// Returns all variants in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low, Self::Unknown]
    }
}

/// A fully-populated candidate location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// City name, or [`UNKNOWN_LABEL`].
    pub city: String,
    /// State or region, or [`UNKNOWN_LABEL`].
    pub state: String,
    /// Country, or [`UNKNOWN_LABEL`].
    pub country: String,
    /// Position, or [`Coordinates::SENTINEL`] when missing.
    pub coordinates: Coordinates,
    /// Confidence level.
    pub confidence: Confidence,
    /// The model's reasoning for this candidate.
    pub explanation: String,
}

impl Default for LocationRecord {
    fn default() -> Self {
        Self {
            city: UNKNOWN_LABEL.to_string(),
            state: UNKNOWN_LABEL.to_string(),
            country: UNKNOWN_LABEL.to_string(),
            coordinates: Coordinates::SENTINEL,
            confidence: Confidence::default(),
            explanation: NO_EXPLANATION.to_string(),
        }
    }
}

/// The document returned by the inference service.
///
/// Text fields accept any JSON value: strings pass through unchanged, other
/// non-null values are kept as their compact JSON rendering. `locations` is
/// kept untyped so that each entry can be normalized independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAnalysis {
    /// Upstream failure message. When set, nothing else is processed.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    /// Optional detail accompanying `error`.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub details: Option<String>,
    /// Narrative description of the image.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub interpretation: Option<String>,
    /// Ranked candidate locations, best first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<serde_json::Value>,
}

impl RawAnalysis {
    /// Builds a failure document.
    #[must_use]
    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: Some(error.into()),
            details,
            ..Self::default()
        }
    }

    /// The raw location entries. A missing or non-array `locations` field
    /// yields an empty slice.
    #[must_use]
    pub fn location_values(&self) -> &[serde_json::Value] {
        match &self.locations {
            Some(serde_json::Value::Array(values)) => values,
            _ => &[],
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

/// Rank-derived display category for ranking cards.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingTier {
    /// Rank 1.
    Gold,
    /// Rank 2.
    Silver,
    /// Rank 3.
    Bronze,
    /// Rank 4 and below.
    Standard,
}

impl RankingTier {
    /// Derives the tier from a 1-based rank.
    #[must_use]
    pub const fn from_rank(rank: usize) -> Self {
        match rank {
            1 => Self::Gold,
            2 => Self::Silver,
            3 => Self::Bronze,
            _ => Self::Standard,
        }
    }

    /// Card badge colour.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Gold => "#ffd700",
            Self::Silver => "#c0c0c0",
            Self::Bronze => "#cd7f32",
            Self::Standard => "#667eea",
        }
    }

    /// Card badge icon.
    #[must_use]
    pub const fn icon(self) -> MarkerIcon {
        match self {
            Self::Gold | Self::Silver | Self::Bronze => MarkerIcon::Star,
            Self::Standard => MarkerIcon::InfoCircle,
        }
    }
}

/// Map marker colour.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerColor {
    /// Rank 1.
    Gold,
    /// Rank 2.
    Silver,
    /// Rank 3.
    Orange,
    /// Rank 4.
    Blue,
    /// Rank 5 and below.
    Gray,
}

/// Map marker icon (Font Awesome names).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MarkerIcon {
    /// `star`
    Star,
    /// `info-circle`
    InfoCircle,
}

/// Colour and icon of a map marker.
///
/// A pure function of rank, independent of confidence. Note that the marker
/// palette distinguishes rank 4 from rank 5+, which the card tiers do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Marker colour.
    pub color: MarkerColor,
    /// Marker icon.
    pub icon: MarkerIcon,
}

impl MarkerStyle {
    /// Returns the style for a 1-based rank.
    #[must_use]
    pub const fn for_rank(rank: usize) -> Self {
        let (color, icon) = match rank {
            1 => (MarkerColor::Gold, MarkerIcon::Star),
            2 => (MarkerColor::Silver, MarkerIcon::Star),
            3 => (MarkerColor::Orange, MarkerIcon::Star),
            4 => (MarkerColor::Blue, MarkerIcon::InfoCircle),
            _ => (MarkerColor::Gray, MarkerIcon::InfoCircle),
        };
        Self { color, icon }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_requires_both_zero() {
        assert!(Coordinates::SENTINEL.is_sentinel());
        assert!(!Coordinates::new(0.0, 12.5).is_sentinel());
        assert!(!Coordinates::new(-3.0, 0.0).is_sentinel());
    }

    #[test]
    fn coordinate_label_uses_requested_precision() {
        let c = Coordinates::new(48.8566, 2.3522);
        assert_eq!(c.label(6), "48.856600, 2.352200");
        assert_eq!(c.label(4), "48.8566, 2.3522");
    }

    #[test]
    fn confidence_parses_exact_labels_only() {
        assert_eq!(Confidence::from_label("High"), Confidence::High);
        assert_eq!(Confidence::from_label("Medium"), Confidence::Medium);
        assert_eq!(Confidence::from_label("Low"), Confidence::Low);
        assert_eq!(Confidence::from_label("Unknown"), Confidence::Unknown);
        assert_eq!(Confidence::from_label("high"), Confidence::Unknown);
        assert_eq!(Confidence::from_label("Very High"), Confidence::Unknown);
        assert_eq!(Confidence::default(), Confidence::Medium);
    }

    #[test]
    fn tiers_follow_rank() {
        assert_eq!(RankingTier::from_rank(1), RankingTier::Gold);
        assert_eq!(RankingTier::from_rank(2), RankingTier::Silver);
        assert_eq!(RankingTier::from_rank(3), RankingTier::Bronze);
        assert_eq!(RankingTier::from_rank(4), RankingTier::Standard);
        assert_eq!(RankingTier::from_rank(40), RankingTier::Standard);
        assert_eq!(RankingTier::Standard.icon(), MarkerIcon::InfoCircle);
    }

    #[test]
    fn marker_palette_distinguishes_rank_four() {
        assert_eq!(MarkerStyle::for_rank(3).color, MarkerColor::Orange);
        assert_eq!(MarkerStyle::for_rank(4).color, MarkerColor::Blue);
        assert_eq!(MarkerStyle::for_rank(5).color, MarkerColor::Gray);
        assert_eq!(MarkerStyle::for_rank(9).icon, MarkerIcon::InfoCircle);
        assert_eq!(MarkerIcon::InfoCircle.to_string(), "info-circle");
    }

    #[test]
    fn raw_analysis_accepts_non_string_text() {
        let raw: RawAnalysis = serde_json::from_value(serde_json::json!({
            "error": {"code": 503},
            "details": null,
            "locations": {"not": "an array"},
        }))
        .unwrap();
        assert_eq!(raw.error.as_deref(), Some(r#"{"code":503}"#));
        assert!(raw.details.is_none());
        assert!(raw.location_values().is_empty());
    }
}
