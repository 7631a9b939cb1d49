// src/store/memory.rs

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;

use super::{ChatStore, NewSessionRecord, NoteStore, ResultStore, StoreError, UserStore};
use crate::models::{
    chat::ChatMessage,
    note::{NewNote, Note},
    result::SessionRecord,
    user::{NewUser, User},
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    notes: Vec<Note>,
    results: Vec<SessionRecord>,
    chat: Vec<ChatMessage>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store for tests and prototyping. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict(format!(
                "Email '{}' is already registered",
                user.email
            )));
        }

        let created = User {
            id: tables.next_id(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.lock()?;
        let mut users = tables.users.clone();
        users.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(users)
    }

    async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(StoreError::NotFound);
        }
        tables.notes.retain(|n| n.author_id != id);
        tables.results.retain(|r| r.user_id != id);
        tables.chat.retain(|m| m.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let tables = self.lock()?;
        let mut notes = tables.notes.clone();
        notes.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(notes)
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.notes.iter().find(|n| n.id == id).cloned())
    }

    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let mut tables = self.lock()?;
        let created = Note {
            id: tables.next_id(),
            title: note.title,
            content: note.content,
            author_id: note.author_id,
            author_name: note.author_name,
            file_url: note.file_url,
            file_name: note.file_name,
            file_type: note.file_type,
            created_at: Utc::now(),
        };
        tables.notes.push(created.clone());
        Ok(created)
    }

    async fn delete_note(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let before = tables.notes.len();
        tables.notes.retain(|n| n.id != id);
        if tables.notes.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn create_result(&self, record: NewSessionRecord) -> Result<SessionRecord, StoreError> {
        let mut tables = self.lock()?;
        let created = SessionRecord {
            id: tables.next_id(),
            user_id: record.user_id,
            kind: record.kind.as_str().to_string(),
            score: record.score,
            total: record.total,
            selected_answers: Json(record.selected_answers),
            question_ids: Json(record.question_ids),
            category_filter: record.category_filter,
            created_at: Utc::now(),
        };
        tables.results.push(created.clone());
        Ok(created)
    }

    async fn list_results_for_user(&self, user_id: i64) -> Result<Vec<SessionRecord>, StoreError> {
        let tables = self.lock()?;
        let mut results: Vec<_> = tables
            .results
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(results)
    }

    async fn list_results(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let tables = self.lock()?;
        let mut results = tables.results.clone();
        results.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(results)
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn chat_history(&self, user_id: i64) -> Result<Vec<ChatMessage>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .chat
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn append_chat_messages(
        &self,
        user_id: i64,
        messages: &[(&str, &str)],
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let mut tables = self.lock()?;
        let mut created = Vec::with_capacity(messages.len());
        for (role, content) in messages {
            let message = ChatMessage {
                id: tables.next_id(),
                user_id,
                role: role.to_string(),
                content: content.to_string(),
                created_at: Utc::now(),
            };
            tables.chat.push(message.clone());
            created.push(message);
        }
        Ok(created)
    }

    async fn clear_chat(&self, user_id: i64) -> Result<u64, StoreError> {
        let mut tables = self.lock()?;
        let before = tables.chat.len();
        tables.chat.retain(|m| m.user_id != user_id);
        Ok((before - tables.chat.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SessionKind;
    use crate::models::chat::{ROLE_ASSISTANT, ROLE_USER};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Marie".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: "student".to_string(),
        }
    }

    fn new_record(user_id: i64, score: i32) -> NewSessionRecord {
        NewSessionRecord {
            user_id,
            kind: SessionKind::Cbt,
            score,
            total: 5,
            selected_answers: vec![0, 1, 2, 3, 0],
            question_ids: vec!["q1".into(), "q2".into(), "q3".into(), "q4".into(), "q5".into()],
            category_filter: "All".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_case_insensitively() {
        let store = MemoryStore::new();
        store.create_user(new_user("marie@example.com")).await.unwrap();
        let err = store
            .create_user(new_user("Marie@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_results_are_scoped_and_newest_first() {
        let store = MemoryStore::new();
        store.create_result(new_record(1, 2)).await.unwrap();
        store.create_result(new_record(2, 5)).await.unwrap();
        store.create_result(new_record(1, 4)).await.unwrap();

        let mine = store.list_results_for_user(1).await.unwrap();
        assert_eq!(mine.iter().map(|r| r.score).collect::<Vec<_>>(), vec![4, 2]);
        assert_eq!(store.list_results().await.unwrap().len(), 3);
        assert!(store.list_results_for_user(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_user_drops_their_data() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        store.create_result(new_record(user.id, 1)).await.unwrap();
        store
            .append_chat_messages(user.id, &[(ROLE_USER, "hi"), (ROLE_ASSISTANT, "hello")])
            .await
            .unwrap();
        store
            .create_note(NewNote {
                title: "Moles".to_string(),
                content: "<p>6.022e23</p>".to_string(),
                author_id: user.id,
                author_name: "A".to_string(),
                file_url: None,
                file_name: None,
                file_type: None,
            })
            .await
            .unwrap();

        store.delete_user(user.id).await.unwrap();
        assert!(store.list_notes().await.unwrap().is_empty());
        assert!(store.find_user_by_id(user.id).await.unwrap().is_none());
        assert!(store.list_results().await.unwrap().is_empty());
        assert!(store.chat_history(user.id).await.unwrap().is_empty());
        assert!(matches!(
            store.delete_user(user.id).await,
            Err(StoreError::NotFound)
        ));
    }
}
