// src/handlers/diagram.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    ai::{StudyAssistant, prompts::extract_svg},
    error::AppError,
};

#[derive(Debug, Deserialize, Validate)]
pub struct DiagramRequest {
    #[validate(length(min = 1, max = 200, message = "Concept must be between 1 and 200 characters"))]
    pub concept: String,
}

/// Renders an animated SVG for a chemistry concept.
pub async fn generate(
    State(assistant): State<Arc<dyn StudyAssistant>>,
    Json(payload): Json<DiagramRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let concept = payload.concept.trim();

    let raw = assistant.generate_diagram(concept).await?;
    let svg = extract_svg(&raw)?;

    Ok(Json(json!({
        "concept": concept,
        "svg": svg,
    })))
}
