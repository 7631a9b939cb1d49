// src/handlers/notes.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};

use crate::{error::AppError, store::Store};

/// Lists published notes, newest first.
pub async fn list_notes(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let notes = store.list_notes().await?;
    Ok(Json(notes))
}

pub async fn get_note(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let note = store
        .get_note(id)
        .await?
        .ok_or(AppError::NotFound("Note not found".to_string()))?;
    Ok(Json(note))
}

/// Redirects to the attachment when there is one, otherwise serves the
/// note body as an HTML download.
pub async fn download_note(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let note = store
        .get_note(id)
        .await?
        .ok_or(AppError::NotFound("Note not found".to_string()))?;

    if let Some(url) = note.file_url.as_deref() {
        return Ok(Redirect::temporary(url).into_response());
    }

    let disposition = format!("attachment; filename=\"{}.html\"", download_name(&note.title));
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        note.content,
    )
        .into_response())
}

/// ASCII-only file stem safe for a Content-Disposition header.
fn download_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "note".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_name_is_header_safe() {
        assert_eq!(download_name("Alkenes & \"Alkynes\""), "Alkenes____Alkynes");
        assert_eq!(download_name("Ölçü"), "l");
        assert_eq!(download_name("***"), "note");
    }
}
