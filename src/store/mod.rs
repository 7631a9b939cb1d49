// src/store/mod.rs

//! Persistence gateway.
//!
//! Handlers and the session engine talk to storage only through these traits.
//! `postgres::PgStore` is the production backend; `memory::MemoryStore` backs
//! the test suites.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    engine::SessionKind,
    models::{
        chat::ChatMessage,
        note::{NewNote, Note},
        result::SessionRecord,
        user::{NewUser, User},
    },
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Insert payload for a submitted session.
#[derive(Debug, Clone)]
pub struct NewSessionRecord {
    pub user_id: i64,
    pub kind: SessionKind,
    pub score: i32,
    pub total: i32,
    pub selected_answers: Vec<i64>,
    pub question_ids: Vec<String>,
    pub category_filter: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Removes the user together with their results and chat history.
    async fn delete_user(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Newest first.
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError>;

    async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError>;

    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError>;

    async fn delete_note(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Appends a fresh record; the store assigns id and timestamp.
    async fn create_result(&self, record: NewSessionRecord) -> Result<SessionRecord, StoreError>;

    /// Newest first.
    async fn list_results_for_user(&self, user_id: i64) -> Result<Vec<SessionRecord>, StoreError>;

    /// Every stored result, newest first.
    async fn list_results(&self) -> Result<Vec<SessionRecord>, StoreError>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Oldest first.
    async fn chat_history(&self, user_id: i64) -> Result<Vec<ChatMessage>, StoreError>;

    /// Appends messages in order, all or nothing.
    async fn append_chat_messages(
        &self,
        user_id: i64,
        messages: &[(&str, &str)],
    ) -> Result<Vec<ChatMessage>, StoreError>;

    async fn clear_chat(&self, user_id: i64) -> Result<u64, StoreError>;
}

/// Everything the HTTP layer needs from storage.
pub trait Store: UserStore + NoteStore + ResultStore + ChatStore {}

impl<T> Store for T where T: UserStore + NoteStore + ResultStore + ChatStore {}
