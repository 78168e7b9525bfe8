//! Classification of upstream provider failures.
//!
//! Failures are matched on their message text because providers signal
//! overload, quota, and credential problems inconsistently (status codes,
//! status names, or prose).

use geospy_location_models::RawAnalysis;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::AiError;

/// Broad category of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FailureKind {
    /// The service is temporarily overloaded or unavailable.
    Overloaded,
    /// A usage quota or rate limit was hit.
    QuotaExceeded,
    /// The API key was rejected.
    InvalidApiKey,
    /// Anything else.
    Other,
}

impl FailureKind {
    /// Classifies a failure message. Checks run in order, first match wins.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("503") || lower.contains("overloaded") || lower.contains("unavailable") {
            Self::Overloaded
        } else if lower.contains("quota") || lower.contains("limit") {
            Self::QuotaExceeded
        } else if (lower.contains("invalid") || lower.contains("not valid"))
            && lower.contains("key")
        {
            Self::InvalidApiKey
        } else {
            Self::Other
        }
    }

    /// Short heading for the failure.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Overloaded => "API Temporarily Overloaded",
            Self::QuotaExceeded => "API Quota Exceeded",
            Self::InvalidApiKey => "Invalid API Key",
            Self::Other => "Analysis Error",
        }
    }

    /// What the user can do about it.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Overloaded => {
                "The service is under heavy load. This is temporary and not a problem \
                 with your setup: wait a minute or two and try again."
            }
            Self::QuotaExceeded => {
                "You have reached the usage limit for this API key. Check the quota in \
                 your provider console, wait for it to reset, or upgrade the plan."
            }
            Self::InvalidApiKey => {
                "The API key was rejected. Copy it again without extra spaces, or \
                 generate a new key."
            }
            Self::Other => {
                "If this persists, check your internet connection and API key."
            }
        }
    }
}

/// A classified upstream failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Heading for the category.
    pub title: String,
    /// Remediation hint.
    pub hint: String,
    /// The raw failure message.
    pub message: String,
}

impl UpstreamFailure {
    /// Classifies a raw message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = FailureKind::classify(&message);
        Self {
            kind,
            title: kind.title().to_string(),
            hint: kind.hint().to_string(),
            message,
        }
    }

    /// Classifies an [`AiError`].
    #[must_use]
    pub fn from_error(error: &AiError) -> Self {
        log::error!("Location request failed: {error}");
        Self::from_message(error.to_string())
    }

    /// Folds the failure into a failure document: the title becomes
    /// `error` and the raw message `details`.
    #[must_use]
    pub fn into_result(self) -> RawAnalysis {
        RawAnalysis::failure(self.title, Some(self.message))
    }
}
