//! Google Gemini provider implementation.

use geospy_location_models::RawAnalysis;
use serde::{Deserialize, Serialize};

use super::LocationProvider;
use crate::prompt::{build_prompt, parse_reply};
use crate::{AiError, LocateRequest};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` API provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Points the provider at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    code: Option<u16>,
    status: Option<String>,
    message: String,
}

impl GeminiErrorDetail {
    fn describe(&self) -> String {
        match (self.code, self.status.as_deref()) {
            (Some(code), Some(status)) => format!("{code} {status}: {}", self.message),
            (Some(code), None) => format!("{code}: {}", self.message),
            (None, Some(status)) => format!("{status}: {}", self.message),
            (None, None) => self.message.clone(),
        }
    }
}

/// Extracts the concatenated reply text from a response body.
fn reply_text(response: GeminiResponse) -> Result<String, AiError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(AiError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(match candidate.finish_reason {
            Some(reason) if reason != "STOP" => AiError::Provider {
                message: format!("Gemini stopped without an answer ({reason})"),
            },
            _ => AiError::EmptyResponse,
        });
    }

    Ok(text)
}

#[async_trait::async_trait]
impl LocationProvider for GeminiProvider {
    fn name(&self) -> String {
        format!("Gemini ({})", self.model)
    }

    async fn locate(&self, request: &LocateRequest) -> Result<RawAnalysis, AiError> {
        let prompt = build_prompt(request);

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::Text { text: &prompt },
                    GeminiPart::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.mime_type,
                            data: request.image.base64(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.4,
            },
        };

        log::info!("Sending image to {}", self.name());

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&text).map_or_else(
                |_| format!("HTTP {status}: {text}"),
                |err| err.error.describe(),
            );
            return Err(AiError::Provider { message });
        }

        let response: GeminiResponse = serde_json::from_str(&text)?;
        parse_reply(&reply_text(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::LoadedImage;

    #[test]
    fn serializes_inline_image_request() {
        let image = LoadedImage {
            mime_type: "image/png",
            bytes: vec![1, 2, 3],
        };
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::Text { text: "where?" },
                    GeminiPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: image.base64(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.4,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "where?");
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"]["data"],
            "AQID"
        );
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn joins_reply_parts() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"locations\":"}, {"text": " []}"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(reply_text(response).unwrap(), "{\"locations\": []}");
    }

    #[test]
    fn blocked_reply_reports_finish_reason() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        let err = reply_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        let response: GeminiResponse =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(reply_text(response), Err(AiError::EmptyResponse)));
    }

    #[test]
    fn error_body_keeps_status_for_classification() {
        let err: GeminiError = serde_json::from_value(serde_json::json!({
            "error": {"code": 503, "status": "UNAVAILABLE", "message": "The model is overloaded."}
        }))
        .unwrap();
        assert_eq!(
            err.error.describe(),
            "503 UNAVAILABLE: The model is overloaded."
        );
    }

    #[test]
    fn endpoint_uses_model_and_base_url() {
        let p = GeminiProvider::new("k".to_string(), "gemini-x".to_string())
            .with_base_url("http://localhost:9000/v1beta/".to_string());
        assert_eq!(
            p.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-x:generateContent"
        );
    }
}
