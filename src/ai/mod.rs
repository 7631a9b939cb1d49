// src/ai/mod.rs

//! Generative collaborator: question organiser, quiz generator, diagram
//! renderer, roast commentary and tutor chat.
//!
//! Handlers only see the `StudyAssistant` trait. `gemini::GeminiClient` is the
//! production implementation; the test suites plug in a canned one.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    engine::RoastRequest,
    models::{chat::ChatMessage, question::GeneratedQuestion, question::Section, topic::Topic},
};

/// Commentary used whenever the roast call fails, times out or returns nothing.
pub const ROAST_FALLBACK: &str =
    "That answer was more unstable than a carbocation in water. Try again! 💧";

/// Errors emitted by a `StudyAssistant`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    #[error("AI assistant is not configured")]
    Disabled,
    #[error("AI assistant returned an empty response")]
    EmptyResponse,
    #[error("AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("AI request timed out")]
    Timeout,
    #[error("AI response was malformed: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::Malformed(err.to_string())
    }
}

/// Material handed to the organiser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorizeInput {
    Text(String),
    /// Base64-encoded JPEG.
    Image(String),
}

/// Exam tier for generated quizzes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamLevel {
    #[default]
    Standard,
    Advanced,
}

impl ExamLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ExamLevel::Standard => "JEE Main",
            ExamLevel::Advanced => "JEE Advanced",
        }
    }
}

/// Parameters of an exam-style quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamQuizRequest {
    pub sections: Vec<Section>,
    pub level: ExamLevel,
    pub count: usize,
    /// Syllabus topics to prioritise; may be empty.
    pub topics: Vec<String>,
}

#[async_trait]
pub trait StudyAssistant: Send + Sync {
    /// Sorts raw questions into a topic / subtopic hierarchy.
    async fn categorize(&self, input: CategorizeInput) -> Result<Vec<Topic>, AiError>;

    /// Five-question review quiz built from an organised hierarchy.
    async fn generate_review_quiz(
        &self,
        topics: &[Topic],
    ) -> Result<Vec<GeneratedQuestion>, AiError>;

    async fn generate_exam_quiz(
        &self,
        request: &ExamQuizRequest,
    ) -> Result<Vec<GeneratedQuestion>, AiError>;

    /// Raw model output for an animated SVG; see `prompts::extract_svg`.
    async fn generate_diagram(&self, concept: &str) -> Result<String, AiError>;

    /// One or two sentences of playful commentary on a wrong answer.
    async fn roast(&self, request: &RoastRequest) -> Result<String, AiError>;

    /// Tutor reply given the stored history (oldest first) and a new message.
    async fn chat_reply(&self, history: &[ChatMessage], message: &str) -> Result<String, AiError>;
}
