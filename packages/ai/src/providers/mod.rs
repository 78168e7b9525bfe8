//! Vision LLM provider abstraction and implementations.
//!
//! Supports Google Gemini and `OpenAI` (or any `OpenAI`-compatible
//! server via `AI_BASE_URL`) behind a common trait.

pub mod gemini;
pub mod openai;

use geospy_location_models::RawAnalysis;

use crate::{AiError, LocateRequest};

/// Trait for geolocation providers.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    /// Human-readable provider and model name, for logging.
    fn name(&self) -> String;

    /// Sends the image and prompt, returning the parsed reply.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the reply cannot be
    /// parsed.
    async fn locate(&self, request: &LocateRequest) -> Result<RawAnalysis, AiError>;
}

/// Creates a provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `GEMINI_API_KEY` or `GOOGLE_API_KEY` set -> Gemini
/// 2. `OPENAI_API_KEY` set -> `OpenAI`
///
/// `AI_MODEL` overrides the default model and `AI_BASE_URL` the endpoint.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env() -> Result<Box<dyn LocationProvider>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());
    let model = std::env::var("AI_MODEL").ok();
    let base_url = std::env::var("AI_BASE_URL").ok();

    match provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = gemini_key_from_env().ok_or_else(|| AiError::Config {
                message: "GEMINI_API_KEY environment variable not set".to_string(),
            })?;
            create_provider("gemini", api_key, model, base_url)
        }
        "openai" | "gpt" => {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| AiError::Config {
                message: "OPENAI_API_KEY environment variable not set".to_string(),
            })?;
            create_provider("openai", api_key, model, base_url)
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'gemini' or 'openai'."),
        }),
    }
}

/// Creates a provider from explicit settings, e.g. an API key typed in by
/// the user.
///
/// # Errors
///
/// Returns [`AiError::Config`] for an unknown provider name or a blank
/// key.
pub fn create_provider(
    provider: &str,
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
) -> Result<Box<dyn LocationProvider>, AiError> {
    if api_key.trim().is_empty() {
        return Err(AiError::Config {
            message: "API key required".to_string(),
        });
    }
    let api_key = api_key.trim().to_string();

    match provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            let mut p = gemini::GeminiProvider::new(
                api_key,
                model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            );
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Ok(Box::new(p))
        }
        "openai" | "gpt" => {
            let mut p = openai::OpenAiProvider::new(
                api_key,
                model.unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            );
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Ok(Box::new(p))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'gemini' or 'openai'."),
        }),
    }
}

fn gemini_key_from_env() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("GOOGLE_API_KEY"))
        .ok()
}

/// Auto-detects which provider to use based on available credentials.
fn detect_provider() -> String {
    if gemini_key_from_env().is_some() {
        log::info!("Auto-detected AI provider: Gemini");
        return "gemini".to_string();
    }

    if std::env::var("OPENAI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set one of: GEMINI_API_KEY, GOOGLE_API_KEY, \
         or OPENAI_API_KEY. You can also set AI_PROVIDER explicitly."
    );

    // Gemini reports the missing key below.
    "gemini".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_provider_requires_key() {
        assert!(matches!(
            create_provider("gemini", "  ".to_string(), None, None),
            Err(AiError::Config { .. })
        ));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(matches!(
            create_provider("bard", "key".to_string(), None, None),
            Err(AiError::Config { .. })
        ));
    }

    #[test]
    fn creates_named_providers() {
        let p = create_provider("Gemini", "key".to_string(), None, None).unwrap();
        assert_eq!(p.name(), format!("Gemini ({})", gemini::DEFAULT_MODEL));

        let p = create_provider("openai", "key".to_string(), Some("gpt-4.1".to_string()), None)
            .unwrap();
        assert_eq!(p.name(), "OpenAI (gpt-4.1)");
    }
}
