#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the `GeoSpy` server.
//!
//! The server keeps no state between requests. Clients hold the
//! [`AnalysisSession`] returned by one call and may send it back with the
//! next; the server only ever replaces it.

use chrono::{DateTime, Utc};
use geospy_ai::failure::UpstreamFailure;
use geospy_location_models::RawAnalysis;
use geospy_pipeline::AnalysisOutcome;
use serde::{Deserialize, Serialize};

/// The most recent analysis, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSession {
    /// Last raw result.
    pub result: Option<RawAnalysis>,
    /// Description of the analyzed image (path, URL, or upload name).
    pub image_source: Option<String>,
    /// When the last analysis finished.
    pub analysis_time: Option<DateTime<Utc>>,
}

impl AnalysisSession {
    /// Returns a session holding the new result. The previous one is
    /// discarded.
    #[must_use]
    pub fn record(
        self,
        result: RawAnalysis,
        image_source: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            result: Some(result),
            image_source,
            analysis_time: Some(now),
        }
    }

    /// Whether an analysis has been recorded.
    #[must_use]
    pub const fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Configured provider, if credentials were found.
    pub provider: Option<String>,
}

/// `POST /api/report` body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Raw result to process.
    pub result: RawAnalysis,
    /// The caller's current session.
    #[serde(default)]
    pub session: Option<AnalysisSession>,
}

/// `POST /api/report/geojson` body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeoJsonRequest {
    /// Raw result to export.
    pub result: RawAnalysis,
}

/// Processed result plus the updated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// Session now holding the result.
    pub session: AnalysisSession,
    /// What to display.
    pub outcome: AnalysisOutcome,
}

/// Image supplied to `POST /api/locate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ImagePayload {
    /// Remote image to fetch.
    Url {
        /// `http(s)` URL.
        url: String,
    },
    /// Inline upload.
    Upload {
        /// Original filename, used for the type check.
        filename: String,
        /// Base64-encoded bytes.
        data: String,
    },
}

/// `POST /api/locate` body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateRequestBody {
    /// The image to analyze.
    pub image: ImagePayload,
    /// Free-form context for the model.
    #[serde(default)]
    pub context_info: Option<String>,
    /// The caller's guess at the location.
    #[serde(default)]
    pub location_guess: Option<String>,
    /// The caller's current session.
    #[serde(default)]
    pub session: Option<AnalysisSession>,
}

/// `POST /api/locate` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateResponse {
    /// Session now holding the result.
    pub session: AnalysisSession,
    /// What to display.
    pub outcome: AnalysisOutcome,
    /// Classified upstream failure, when the provider call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<UpstreamFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    #[test]
    fn record_replaces_previous_analysis() {
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 1, 1, 12, 5, 0).unwrap();

        let session = AnalysisSession::default();
        assert!(!session.has_result());

        let session = session.record(
            RawAnalysis::failure("boom", None),
            Some("a.png".to_string()),
            first,
        );
        let session = session.record(RawAnalysis::default(), None, second);

        assert!(session.has_result());
        assert!(session.result.as_ref().unwrap().error.is_none());
        assert!(session.image_source.is_none());
        assert_eq!(session.analysis_time, Some(second));
    }

    #[test]
    fn image_payload_accepts_url_or_upload() {
        let url: ImagePayload =
            serde_json::from_str(r#"{"url": "https://example.com/a.jpg"}"#).unwrap();
        assert_eq!(
            url,
            ImagePayload::Url {
                url: "https://example.com/a.jpg".to_string()
            }
        );

        let upload: ImagePayload =
            serde_json::from_str(r#"{"filename": "a.png", "data": "AQID"}"#).unwrap();
        assert!(matches!(upload, ImagePayload::Upload { .. }));
    }

    #[test]
    fn locate_body_uses_camel_case_and_optional_fields() {
        let body: LocateRequestBody = serde_json::from_str(
            r#"{"image": {"url": "https://x/y.png"}, "locationGuess": "Oslo"}"#,
        )
        .unwrap();
        assert_eq!(body.location_guess.as_deref(), Some("Oslo"));
        assert!(body.context_info.is_none());
        assert!(body.session.is_none());
    }
}
