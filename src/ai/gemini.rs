// src/ai/gemini.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AiError, CategorizeInput, ExamQuizRequest, StudyAssistant, prompts};
use crate::{
    engine::RoastRequest,
    models::{chat::ChatMessage, question::GeneratedQuestion, topic::Topic},
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const JSON_MIME: &str = "application/json";
const TEXT_MIME: &str = "text/plain";
const ROAST_TEMPERATURE: f32 = 1.2;

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// `None` disables every call with `AiError::Disabled`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// `StudyAssistant` backed by the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, AiError> {
        let api_key = self.config.api_key.as_deref().ok_or(AiError::Disabled)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    tracing::error!("Gemini request failed: {:?}", e);
                    AiError::from(e)
                }
            })?;

        if !response.status().is_success() {
            tracing::warn!("Gemini returned status {}", response.status());
            return Err(AiError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body.text();
        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }

    async fn generate_questions(&self, prompt: &str) -> Result<Vec<GeneratedQuestion>, AiError> {
        let request = GenerateRequest::text(prompt, JSON_MIME).with_schema(prompts::quiz_schema());
        let raw = self.generate(request).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl StudyAssistant for GeminiClient {
    async fn categorize(&self, input: CategorizeInput) -> Result<Vec<Topic>, AiError> {
        let prompt;
        let parts = match &input {
            CategorizeInput::Image(data) => vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: "image/jpeg",
                        data: data.as_str(),
                    },
                },
                Part::Text {
                    text: prompts::ORGANIZER_IMAGE_TEXT,
                },
            ],
            CategorizeInput::Text(raw) => {
                prompt = prompts::organizer_text(raw);
                vec![Part::Text { text: &prompt }]
            }
        };

        let request = GenerateRequest {
            contents: vec![Content { parts }],
            system_instruction: Some(Content {
                parts: vec![Part::Text {
                    text: prompts::ORGANIZER_SYSTEM,
                }],
            }),
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME,
                response_schema: Some(prompts::organizer_schema()),
                temperature: None,
            },
        };

        let raw = self.generate(request).await?;
        let organized: OrganizedContent = serde_json::from_str(&raw)?;
        Ok(organized.topics)
    }

    async fn generate_review_quiz(
        &self,
        topics: &[Topic],
    ) -> Result<Vec<GeneratedQuestion>, AiError> {
        self.generate_questions(&prompts::review_quiz(topics)).await
    }

    async fn generate_exam_quiz(
        &self,
        request: &ExamQuizRequest,
    ) -> Result<Vec<GeneratedQuestion>, AiError> {
        self.generate_questions(&prompts::exam_quiz(request)).await
    }

    async fn generate_diagram(&self, concept: &str) -> Result<String, AiError> {
        let prompt = prompts::diagram(concept);
        self.generate(GenerateRequest::text(&prompt, TEXT_MIME)).await
    }

    async fn roast(&self, request: &RoastRequest) -> Result<String, AiError> {
        let prompt = prompts::roast(request);
        let mut body = GenerateRequest::text(&prompt, TEXT_MIME);
        body.generation_config.temperature = Some(ROAST_TEMPERATURE);
        Ok(self.generate(body).await?.trim().to_string())
    }

    async fn chat_reply(&self, history: &[ChatMessage], message: &str) -> Result<String, AiError> {
        let prompt = prompts::chat(history, message);
        match self.generate(GenerateRequest::text(&prompt, TEXT_MIME)).await {
            Ok(reply) => Ok(reply.trim().to_string()),
            Err(AiError::EmptyResponse) => Ok(prompts::CHAT_FALLBACK.to_string()),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn text(prompt: &'a str, mime: &'static str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::Text { text: prompt }],
            }],
            system_instruction: None,
            generation_config: GenerationConfig {
                response_mime_type: mime,
                response_schema: None,
                temperature: None,
            },
        }
    }

    fn with_schema(mut self, schema: Value) -> Self {
        self.generation_config.response_schema = Some(schema);
        self
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'static str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganizedContent {
    #[serde(default)]
    topics: Vec<Topic>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_body_uses_rest_field_names() {
        let body = GenerateRequest::text("Explain SN2", JSON_MIME).with_schema(json!({"type": "ARRAY"}));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Explain SN2");
        assert_eq!(value["generationConfig"]["responseMimeType"], JSON_MIME);
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(value.get("systemInstruction").is_none());
        assert!(value["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_inline_image_part_shape() {
        let part = Part::InlineData {
            inline_data: InlineData {
                mime_type: "image/jpeg",
                data: "AAAA",
            },
        };
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({"inlineData": {"mimeType": "image/jpeg", "data": "AAAA"}})
        );
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "[{\"a\":"}, {"text": "1}]"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response.text(), "[{\"a\":1}]");

        let blocked: GenerateResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert_eq!(blocked.text(), "");
    }

    #[tokio::test]
    async fn test_missing_key_disables_calls() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert!(!client.enabled());
        assert!(matches!(
            client.generate_diagram("benzene").await,
            Err(AiError::Disabled)
        ));
    }
}
