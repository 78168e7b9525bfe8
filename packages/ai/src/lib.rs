#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Image geolocation through a vision-capable LLM.
//!
//! Loads an image (local file, URL, or in-memory upload), sends it with a
//! fixed prompt to Google Gemini or any `OpenAI`-compatible chat endpoint,
//! and parses the reply into a [`RawAnalysis`]. Provider failures are
//! classified ([`failure::FailureKind`]) and can be folded into a failure
//! document so the location pipeline reports them verbatim.
//!
//! There is no retry or backoff: a failed call is reported once.

pub mod failure;
pub mod image;
pub mod prompt;
pub mod providers;

use geospy_location_models::RawAnalysis;
use thiserror::Error;

use crate::image::LoadedImage;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the provider or image host failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local image failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The provider answered without any usable text.
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// The image type is not accepted.
    #[error("Unsupported image: {message}")]
    UnsupportedImage {
        /// Description.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Everything a provider needs for one geolocation call.
#[derive(Debug, Clone)]
pub struct LocateRequest {
    /// The image to analyze.
    pub image: LoadedImage,
    /// Free-form context (time of day, weather, known landmarks).
    pub context_info: Option<String>,
    /// The user's guess at the location.
    pub location_guess: Option<String>,
}

impl LocateRequest {
    /// Creates a request, dropping blank context and hint strings.
    #[must_use]
    pub fn new(
        image: LoadedImage,
        context_info: Option<String>,
        location_guess: Option<String>,
    ) -> Self {
        Self {
            image,
            context_info: non_blank(context_info),
            location_guess: non_blank(location_guess),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Calls the provider and folds any failure into a failure document.
///
/// The returned document is always suitable for the location pipeline:
/// either the provider's answer, or `{error, details}` where `error` is the
/// classified title and `details` the raw provider message.
pub async fn locate_to_result(
    provider: &dyn providers::LocationProvider,
    request: &LocateRequest,
) -> RawAnalysis {
    locate_classified(provider, request).await.0
}

/// Like [`locate_to_result`], but also returns the classified failure so
/// callers can show its remediation hint.
pub async fn locate_classified(
    provider: &dyn providers::LocationProvider,
    request: &LocateRequest,
) -> (RawAnalysis, Option<failure::UpstreamFailure>) {
    match provider.locate(request).await {
        Ok(result) => (result, None),
        Err(e) => {
            let failure = failure::UpstreamFailure::from_error(&e);
            (failure.clone().into_result(), Some(failure))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureKind;

    struct FailingProvider;

    #[async_trait::async_trait]
    impl providers::LocationProvider for FailingProvider {
        fn name(&self) -> String {
            "Failing".to_string()
        }

        async fn locate(&self, _request: &LocateRequest) -> Result<RawAnalysis, AiError> {
            Err(AiError::Provider {
                message: "429 RESOURCE_EXHAUSTED: Quota exceeded".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn provider_failure_becomes_failure_document() {
        let request = LocateRequest::new(
            LoadedImage {
                mime_type: "image/png",
                bytes: vec![1],
            },
            None,
            None,
        );

        let (result, failure) = locate_classified(&FailingProvider, &request).await;
        assert_eq!(failure.map(|f| f.kind), Some(FailureKind::QuotaExceeded));
        assert_eq!(result.error.as_deref(), Some("API Quota Exceeded"));

        let result = locate_to_result(&FailingProvider, &request).await;
        assert!(
            result
                .details
                .as_deref()
                .is_some_and(|d| d.contains("Quota exceeded"))
        );
    }

    #[test]
    fn blank_context_is_dropped() {
        let image = LoadedImage {
            mime_type: "image/png",
            bytes: vec![1, 2, 3],
        };
        let request = LocateRequest::new(
            image,
            Some("   ".to_string()),
            Some("Maybe Lisbon".to_string()),
        );
        assert!(request.context_info.is_none());
        assert_eq!(request.location_guess.as_deref(), Some("Maybe Lisbon"));
    }
}
