// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::note::{CreateNoteRequest, NewNote},
    sessions::SessionRegistry,
    store::{Store, StoreError},
    utils::{html::clean_note_html, jwt::Claims},
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let users = store.list_users().await?;
    Ok(Json(users))
}

/// Deletes a user along with their results, chat and live sessions.
/// Admin only. Admins cannot delete themselves.
pub async fn delete_user(
    State(store): State<Arc<dyn Store>>,
    State(registry): State<Arc<SessionRegistry>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if claims.user_id()? == id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    store.delete_user(id).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("User not found".to_string()),
        other => AppError::from(other),
    })?;
    registry.remove_owner(id);

    tracing::info!("Admin {} deleted user {}", claims.sub, id);

    Ok(StatusCode::NO_CONTENT)
}

/// Every stored result, newest first.
/// Admin only.
pub async fn list_results(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let results = store.list_results().await?;
    Ok(Json(results))
}

/// Publishes a note. The HTML body is sanitized before it is stored.
/// Admin only.
pub async fn create_note(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let author = store
        .find_user_by_id(claims.user_id()?)
        .await?
        .ok_or(AppError::AuthError("Account no longer exists".to_string()))?;

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    let note = store
        .create_note(NewNote {
            title,
            content: clean_note_html(&payload.content),
            author_id: author.id,
            author_name: author.name,
            file_url: payload.file_url,
            file_name: payload.file_name,
            file_type: payload.file_type,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// Deletes a note.
/// Admin only.
pub async fn delete_note(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    store.delete_note(id).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("Note not found".to_string()),
        other => AppError::from(other),
    })?;
    Ok(StatusCode::NO_CONTENT)
}
