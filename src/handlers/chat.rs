// src/handlers/chat.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    ai::StudyAssistant,
    error::AppError,
    models::chat::{ROLE_ASSISTANT, ROLE_USER, SendMessageRequest},
    store::Store,
    utils::jwt::Claims,
};

/// The caller's tutor conversation, oldest first.
pub async fn get_history(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let history = store.chat_history(claims.user_id()?).await?;
    Ok(Json(history))
}

/// Sends a message to the tutor.
///
/// Nothing is stored until the reply arrives; then the user message and the
/// reply are appended together.
pub async fn send_message(
    State(store): State<Arc<dyn Store>>,
    State(assistant): State<Arc<dyn StudyAssistant>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message must not be blank".to_string()));
    }

    let history = store.chat_history(user_id).await?;
    let reply = assistant.chat_reply(&history, message).await?;

    let created = store
        .append_chat_messages(user_id, &[(ROLE_USER, message), (ROLE_ASSISTANT, reply.as_str())])
        .await?;

    Ok(Json(json!({
        "reply": reply,
        "messages": created,
    })))
}

/// Wipes the caller's conversation.
pub async fn clear_history(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = store.clear_chat(claims.user_id()?).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
