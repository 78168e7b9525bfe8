//! Geolocation prompt and reply parsing.

use std::fmt::Write as _;

use geospy_location_models::RawAnalysis;

use crate::{AiError, LocateRequest};

/// Builds the instruction text sent alongside the image.
#[must_use]
pub fn build_prompt(request: &LocateRequest) -> String {
    let mut prompt = String::from(
        r#"You are an expert in image geolocation. Study the attached image and work out where it was taken, using architecture, vegetation, terrain, signage and language, road markings, vehicles, and any other cultural or environmental clues.

Respond with a single JSON object and nothing else, in exactly this shape:

{
  "interpretation": "A thorough description of the visual clues and how they narrow down the location.",
  "locations": [
    {
      "city": "City name",
      "state": "State, province, or region",
      "country": "Country name",
      "confidence": "High" | "Medium" | "Low",
      "coordinates": {"latitude": 0.0, "longitude": 0.0},
      "explanation": "Why this specific location matches the image."
    }
  ]
}

Rules:
1. Order "locations" from most to least likely. Give up to 5 candidates, at least 3 when the evidence allows.
2. "confidence" must be exactly one of "High", "Medium", or "Low".
3. Coordinates are decimal degrees (WGS84). Omit the "coordinates" object if you cannot estimate a position; never invent 0, 0.
4. Do not wrap the JSON in Markdown."#,
    );

    if let Some(context) = &request.context_info {
        let _ = write!(prompt, "\n\nAdditional context from the user: {context}");
    }
    if let Some(guess) = &request.location_guess {
        let _ = write!(
            prompt,
            "\n\nThe user suspects this location: {guess}. Consider it, but rely on the visual evidence."
        );
    }

    prompt
}

/// Parses the model's reply text into a [`RawAnalysis`].
///
/// Tolerates Markdown code fences and prose around the JSON object.
///
/// # Errors
///
/// Returns [`AiError::EmptyResponse`] for blank text, or [`AiError::Json`]
/// if no JSON object can be parsed.
pub fn parse_reply(text: &str) -> Result<RawAnalysis, AiError> {
    let trimmed = strip_code_fence(text.trim());
    if trimmed.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    match serde_json::from_str(trimmed) {
        Ok(result) => Ok(result),
        Err(e) => {
            // Fall back to the outermost braces when the model added prose.
            match (trimmed.find('{'), trimmed.rfind('}')) {
                (Some(start), Some(end)) if start < end => {
                    Ok(serde_json::from_str(&trimmed[start..=end])?)
                }
                _ => Err(e.into()),
            }
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::LoadedImage;

    fn request(context: Option<&str>, guess: Option<&str>) -> LocateRequest {
        LocateRequest::new(
            LoadedImage {
                mime_type: "image/png",
                bytes: vec![0],
            },
            context.map(str::to_string),
            guess.map(str::to_string),
        )
    }

    #[test]
    fn prompt_includes_optional_hints() {
        let bare = build_prompt(&request(None, None));
        assert!(!bare.contains("Additional context"));
        assert!(!bare.contains("suspects"));

        let full = build_prompt(&request(Some("Taken at dusk"), Some("Porto")));
        assert!(full.contains("Additional context from the user: Taken at dusk"));
        assert!(full.contains("The user suspects this location: Porto."));
    }

    #[test]
    fn parses_plain_json() {
        let result = parse_reply(
            r#"{"interpretation": "Harbor", "locations": [{"city": "Porto"}]}"#,
        )
        .unwrap();
        assert_eq!(result.interpretation.as_deref(), Some("Harbor"));
        assert_eq!(result.location_values().len(), 1);
    }

    #[test]
    fn parses_fenced_json() {
        let text = "```json\n{\"locations\": []}\n```";
        let result = parse_reply(text).unwrap();
        assert!(result.location_values().is_empty());
        assert!(result.error.is_none());
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let text = "Here is my answer:\n{\"interpretation\": \"Desert\"}\nHope that helps!";
        let result = parse_reply(text).unwrap();
        assert_eq!(result.interpretation.as_deref(), Some("Desert"));
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(parse_reply("   "), Err(AiError::EmptyResponse)));
        assert!(matches!(parse_reply("```\n```"), Err(AiError::EmptyResponse)));
        assert!(matches!(parse_reply("no json here"), Err(AiError::Json(_))));
    }
}
