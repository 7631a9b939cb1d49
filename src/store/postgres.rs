// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use super::{ChatStore, NewSessionRecord, NoteStore, ResultStore, StoreError, UserStore};
use crate::models::{
    chat::ChatMessage,
    note::{NewNote, Note},
    result::SessionRecord,
    user::{NewUser, User},
};

const USER_COLUMNS: &str = "id, name, email, password, role, created_at";
const NOTE_COLUMNS: &str =
    "id, title, content, author_id, author_name, file_url, file_name, file_type, created_at";
const RESULT_COLUMNS: &str = "id, user_id, kind, score, total, selected_answers, question_ids, category_filter, created_at";
const CHAT_COLUMNS: &str = "id, user_id, role, content, created_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres error code for unique violation is 23505.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(format!("Email '{}' is already registered", user.email))
                } else {
                    tracing::error!("Failed to insert user: {:?}", e);
                    StoreError::from(e)
                }
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users ORDER BY id DESC", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        // results and chat rows go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for PgStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let sql = format!("SELECT {} FROM notes ORDER BY created_at DESC, id DESC", NOTE_COLUMNS);
        Ok(sqlx::query_as::<_, Note>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        let sql = format!("SELECT {} FROM notes WHERE id = $1", NOTE_COLUMNS);
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO notes (title, content, author_id, author_name, file_url, file_name, file_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            NOTE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(note.title)
            .bind(note.content)
            .bind(note.author_id)
            .bind(note.author_name)
            .bind(note.file_url)
            .bind(note.file_name)
            .bind(note.file_type)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_note(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ResultStore for PgStore {
    async fn create_result(&self, record: NewSessionRecord) -> Result<SessionRecord, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO session_results
            (user_id, kind, score, total, selected_answers, question_ids, category_filter)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            RESULT_COLUMNS
        );
        sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(record.user_id)
            .bind(record.kind.as_str())
            .bind(record.score)
            .bind(record.total)
            .bind(Json(record.selected_answers))
            .bind(Json(record.question_ids))
            .bind(record.category_filter)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert session result: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn list_results_for_user(&self, user_id: i64) -> Result<Vec<SessionRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM session_results WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            RESULT_COLUMNS
        );
        Ok(sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_results(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM session_results ORDER BY created_at DESC, id DESC",
            RESULT_COLUMNS
        );
        Ok(sqlx::query_as::<_, SessionRecord>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn chat_history(&self, user_id: i64) -> Result<Vec<ChatMessage>, StoreError> {
        let sql = format!(
            "SELECT {} FROM chat_messages WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
            CHAT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn append_chat_messages(
        &self,
        user_id: i64,
        messages: &[(&str, &str)],
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let sql = format!(
            "INSERT INTO chat_messages (user_id, role, content) VALUES ($1, $2, $3) RETURNING {}",
            CHAT_COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(messages.len());
        for (role, content) in messages {
            let message = sqlx::query_as::<_, ChatMessage>(&sql)
                .bind(user_id)
                .bind(*role)
                .bind(*content)
                .fetch_one(&mut *tx)
                .await?;
            created.push(message);
        }
        tx.commit().await?;

        Ok(created)
    }

    async fn clear_chat(&self, user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
