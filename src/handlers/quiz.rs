// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use super::session::open_session;
use crate::{
    ai::{ExamLevel, ExamQuizRequest, StudyAssistant},
    engine::{Session, SessionKind, bank::syllabus},
    error::AppError,
    models::{
        question::{Section, normalize_generated},
        topic::{Topic, question_count},
    },
    sessions::SessionRegistry,
    utils::jwt::Claims,
};

/// Syllabus topics per section, used by clients to pick exam focus areas.
pub async fn get_syllabus() -> impl IntoResponse {
    let map: Map<String, Value> = Section::ALL
        .iter()
        .map(|section| {
            let topics = syllabus(*section)
                .iter()
                .map(|t| Value::String(t.to_string()))
                .collect();
            (section.to_string(), Value::Array(topics))
        })
        .collect();
    Json(Value::Object(map))
}

fn roast_on() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewQuizRequest {
    #[validate(length(min = 1, max = 50, message = "Provide between 1 and 50 topics"))]
    pub topics: Vec<Topic>,
    #[serde(default = "roast_on")]
    pub roast: bool,
}

/// Generates a five-question review quiz from an organised hierarchy and starts it.
pub async fn start_review_quiz(
    State(assistant): State<Arc<dyn StudyAssistant>>,
    State(registry): State<Arc<SessionRegistry>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReviewQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if question_count(&payload.topics) == 0 {
        return Err(AppError::BadRequest(
            "The organised topics contain no questions".to_string(),
        ));
    }
    let user_id = claims.user_id()?;

    let generated = assistant.generate_review_quiz(&payload.topics).await?;
    let questions = normalize_generated(generated)?;

    let mut session = Session::new(SessionKind::Quiz).with_roast(payload.roast);
    session.start(questions)?;

    let filter = payload
        .topics
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(open_session(&registry, user_id, session, format!("Review: {}", filter)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExamQuizBody {
    #[validate(length(min = 1, max = 3, message = "Pick at least one section"))]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub level: ExamLevel,
    #[validate(range(min = 1, max = 30, message = "Count must be between 1 and 30"))]
    pub count: usize,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub topics: Vec<String>,
    #[serde(default = "roast_on")]
    pub roast: bool,
}

/// Generates an exam-style quiz for the chosen sections and starts it.
pub async fn start_exam_quiz(
    State(assistant): State<Arc<dyn StudyAssistant>>,
    State(registry): State<Arc<SessionRegistry>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ExamQuizBody>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let mut sections: Vec<Section> = Vec::with_capacity(payload.sections.len());
    for section in payload.sections {
        if !sections.contains(&section) {
            sections.push(section);
        }
    }

    let request = ExamQuizRequest {
        sections,
        level: payload.level,
        count: payload.count,
        topics: payload
            .topics
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    };

    let generated = assistant.generate_exam_quiz(&request).await?;
    let questions = normalize_generated(generated)?;

    let mut session = Session::new(SessionKind::Quiz).with_roast(payload.roast);
    session.start(questions)?;

    let filter = format!(
        "{}: {}",
        request.level.label(),
        request
            .sections
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(open_session(&registry, user_id, session, filter))
}
