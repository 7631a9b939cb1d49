// src/handlers/organizer.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    ai::{CategorizeInput, StudyAssistant},
    error::AppError,
    models::topic::{CategorizeRequest, question_count},
};

/// Sorts pasted text or a photographed question sheet into topics and subtopics.
pub async fn categorize(
    State(assistant): State<Arc<dyn StudyAssistant>>,
    Json(payload): Json<CategorizeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let input = match (payload.image_base64, payload.text) {
        (Some(image), _) => CategorizeInput::Image(image),
        (None, Some(text)) if !text.trim().is_empty() => CategorizeInput::Text(text),
        _ => {
            return Err(AppError::BadRequest(
                "Provide either text or image_base64".to_string(),
            ));
        }
    };

    let topics = assistant.categorize(input).await?;
    let count = question_count(&topics);
    tracing::debug!("Organised {} questions into {} topics", count, topics.len());

    Ok(Json(json!({
        "topics": topics,
        "question_count": count,
    })))
}
