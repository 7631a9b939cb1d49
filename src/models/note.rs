// src/models/note.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'notes' table in the database.
/// Notes are published by admins and readable by every signed-in user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,

    /// Sanitized HTML body.
    pub content: String,

    pub author_id: i64,
    pub author_name: String,

    /// Optional attachment hosted elsewhere.
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_name: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
}

/// DTO for publishing a note.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 50000))]
    pub content: String,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub file_url: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub file_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub file_type: Option<String>,
}

/// Validates that a string is a correctly formatted http(s) URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_url")),
    }
}
