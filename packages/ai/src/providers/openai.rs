//! `OpenAI` GPT provider implementation.
//!
//! Works with any server speaking the chat completions API with image
//! content parts.

use geospy_location_models::RawAnalysis;
use serde::{Deserialize, Serialize};

use super::LocationProvider;
use crate::prompt::{build_prompt, parse_reply};
use crate::{AiError, LocateRequest};

/// Default `OpenAI` model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Points the provider at a compatible server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    response_format: ResponseFormat,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn build_request<'a>(model: &'a str, prompt: &'a str, data_url: String) -> OpenAiRequest<'a> {
    OpenAiRequest {
        model,
        messages: vec![OpenAiMessage {
            role: "user",
            content: vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ],
        }],
        response_format: ResponseFormat {
            format_type: "json_object",
        },
        max_tokens: 4096,
    }
}

fn reply_text(response: OpenAiResponse) -> Result<String, AiError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Provider {
            message: "No choices in OpenAI response".to_string(),
        })?;

    choice
        .message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or(AiError::EmptyResponse)
}

#[async_trait::async_trait]
impl LocationProvider for OpenAiProvider {
    fn name(&self) -> String {
        format!("OpenAI ({})", self.model)
    }

    async fn locate(&self, request: &LocateRequest) -> Result<RawAnalysis, AiError> {
        let prompt = build_prompt(request);
        let body = build_request(&self.model, &prompt, request.image.data_url());

        log::info!("Sending image to {}", self.name());

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAiError>(&text).map_or_else(
                |_| format!("HTTP {status}: {text}"),
                |err| format!("{}: {}", status.as_u16(), err.error.message),
            );
            return Err(AiError::Provider { message });
        }

        let response: OpenAiResponse = serde_json::from_str(&text)?;
        parse_reply(&reply_text(response)?)
    }
}
