//! services/agent/src/adapters/gemini.rs
//!
//! This module contains the adapter for the Gemini `generateContent` API.
//! It implements the `ContentGenerator` port from the `core` crate: one call
//! produces structured trivia JSON, the other an inline image.

const PERSONA: &str = "You are VeloBot, a cycling historian and bike mechanic. \
Your tone is enthusiastic, authoritative and a little witty. You know the Tour de France, \
the evolution of cycling technology and the sport's legendary riders.";

const TRIVIA_TEMPLATE: &str = r#"Write one daily trivia post for a cycling community about {topic}.

Requirements:
- Medium-hard difficulty: it should surprise long-time enthusiasts.
- The fact must be verifiable. Avoid popular myths.
- The fun fact adds a second, surprising detail.
- The image description is a detailed prompt for a photorealistic editorial photo of a related scene.
- Provide 4 to 6 relevant hashtags without the leading '#'."#;

const IMAGE_TEMPLATE: &str = r#"Create a photorealistic editorial photograph for a premium cycling magazine.

Scene: {description}

Use atmospheric light, rich material detail and a shallow depth of field.
Do not render any text, letters, numbers, logos, watermarks or captions."#;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use velotrivia_core::domain::TriviaContent;
use velotrivia_core::ports::{ContentGenerator, PortError, PortResult};

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ContentGenerator` against the Gemini REST API.
#[derive(Clone)]
pub struct GeminiAdapter {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    trivia_model: String,
    image_model: String,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`. A missing key is sent as no key at all;
    /// the upstream then rejects the call.
    pub fn new(
        client: Client,
        api_base: String,
        api_key: Option<String>,
        trivia_model: String,
        image_model: String,
    ) -> Self {
        Self {
            client,
            api_base,
            api_key,
            trivia_model,
            image_model,
        }
    }

    async fn generate_content(&self, model: &str, body: &Value) -> PortResult<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.api_base, model);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PortError::Unauthorized);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "Gemini returned status {}: {}",
                status, detail
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Unreadable Gemini response: {}", e)))
    }
}

fn trivia_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "question": { "type": "STRING", "description": "A trivia question that challenges the reader." },
            "answer": { "type": "STRING", "description": "The direct, accurate answer." },
            "funFact": { "type": "STRING", "description": "A second surprising fact on the same subject." },
            "imageDescription": { "type": "STRING", "description": "A photography prompt for a related scene." },
            "hashtags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["question", "answer", "funFact", "imageDescription", "hashtags"]
    })
}

/// Models occasionally wrap JSON in a Markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => rest
            .trim_start_matches("json")
            .trim_end()
            .trim_end_matches("```")
            .trim(),
        None => trimmed,
    }
}

//=========================================================================================
// `ContentGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentGenerator for GeminiAdapter {
    async fn generate_trivia(&self, topic: &str) -> PortResult<TriviaContent> {
        let body = json!({
            "systemInstruction": { "parts": [{ "text": PERSONA }] },
            "contents": [{
                "role": "user",
                "parts": [{ "text": TRIVIA_TEMPLATE.replace("{topic}", topic) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": trivia_schema(),
                "temperature": 0.8
            }
        });

        let response = self.generate_content(&self.trivia_model, &body).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .ok_or_else(|| {
                PortError::Unexpected("Trivia response contained no candidates.".to_string())
            })?;

        debug!("Trivia response: {}", text);
        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| PortError::Unexpected(format!("Trivia response was not valid JSON: {}", e)))
    }

    async fn generate_image_from_description(&self, description: &str) -> PortResult<String> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": IMAGE_TEMPLATE.replace("{description}", description) }]
            }],
            "generationConfig": {
                "imageConfig": { "aspectRatio": "1:1" }
            }
        });

        let response = self.generate_content(&self.image_model, &body).await?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            PortError::ContentRejected("Empty response from image generation model.".to_string())
        })?;
        let finish_reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());

        candidate
            .content
            .into_iter()
            .flat_map(|content| content.parts)
            .find_map(|part| part.inline_data)
            .map(|inline| {
                let mime_type = inline.mime_type.unwrap_or_else(|| "image/png".to_string());
                format!("data:{};base64,{}", mime_type, inline.data)
            })
            .ok_or_else(|| {
                PortError::ContentRejected(format!(
                    "No image data returned (finish reason {}, possibly a safety filter).",
                    finish_reason
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_trivia_schema_requires_every_field() {
        let schema = trivia_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec!["question", "answer", "funFact", "imageDescription", "hashtags"]
        );
    }
}
