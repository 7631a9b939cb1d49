// src/sessions.rs

//! Process-local registry of live quiz and CBT sessions.
//!
//! Each session sits behind its own `tokio::sync::Mutex`; every transition is
//! applied while that lock is held, including the result write on submit.
//! Roast commentary is fetched on a detached task and only written back if the
//! answer it was requested for is still the latest one.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::{
    ai::{ROAST_FALLBACK, StudyAssistant},
    engine::{AnswerOutcome, RoastRequest, Session, SessionError, SessionKind, SessionResult, SessionState},
    models::question::PublicQuestion,
};

pub type SharedSession = Arc<AsyncMutex<LiveSession>>;

/// Commentary attached to the most recent wrong answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commentary {
    pub position: usize,
    pub option: usize,
    /// `None` while the fetch is still running.
    pub text: Option<String>,
}

impl Commentary {
    pub fn is_pending(&self) -> bool {
        self.text.is_none()
    }
}

/// A session plus the bookkeeping the HTTP layer needs around it.
#[derive(Debug)]
pub struct LiveSession {
    pub id: Uuid,
    pub owner: i64,
    pub session: Session,
    /// Written with the result on submit.
    pub category_filter: String,
    commentary: Option<Commentary>,
}

impl LiveSession {
    pub fn new(owner: i64, session: Session, category_filter: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            session,
            category_filter: category_filter.into(),
            commentary: None,
        }
    }

    pub fn commentary(&self) -> Option<&Commentary> {
        self.commentary.as_ref()
    }

    /// Records an answer and tracks which answer any pending roast belongs to.
    pub fn answer(&mut self, position: usize, option: usize) -> Result<AnswerOutcome, SessionError> {
        let outcome = self.session.select_answer(position, option)?;
        self.commentary = outcome.roast.as_ref().map(|_| Commentary {
            position,
            option,
            text: None,
        });
        Ok(outcome)
    }

    /// Commentary is tied to the question on screen, so moving clears it.
    pub fn clear_commentary(&mut self) {
        self.commentary = None;
    }

    /// Stores fetched commentary. Returns `false` when it went stale.
    pub fn resolve_commentary(&mut self, position: usize, option: usize, text: String) -> bool {
        match self.commentary.as_mut() {
            Some(c) if c.position == position && c.option == option && c.is_pending() => {
                c.text = Some(text);
                true
            }
            _ => false,
        }
    }

    pub fn view(&self) -> SessionView {
        let finished = self.session.is_finished();
        SessionView {
            id: self.id,
            kind: self.session.kind(),
            state: self.session.state(),
            category_filter: self.category_filter.clone(),
            questions: self
                .session
                .questions()
                .iter()
                .map(|q| PublicQuestion::from_question(q, finished))
                .collect(),
            selected_answers: self.session.selected_answers().to_vec(),
            current_index: self.session.current_index(),
            unanswered: self.session.unanswered(),
            can_submit: self.session.state() == SessionState::InProgress && self.session.can_submit(),
            roast_enabled: self.session.roast_enabled(),
            commentary: self.commentary.clone(),
            result: self.session.result().cloned(),
        }
    }
}

/// Client-facing snapshot of a live session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub kind: SessionKind,
    pub state: SessionState,
    pub category_filter: String,
    pub questions: Vec<PublicQuestion>,
    pub selected_answers: Vec<Option<usize>>,
    pub current_index: usize,
    pub unanswered: usize,
    pub can_submit: bool,
    pub roast_enabled: bool,
    pub commentary: Option<Commentary>,
    pub result: Option<SessionResult>,
}

/// Owner and kind are fixed at insert and checked without the session lock.
struct Entry {
    owner: i64,
    kind: SessionKind,
    session: SharedSession,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<Uuid, Entry>,
    by_owner: HashMap<(i64, SessionKind), Uuid>,
}

/// All live sessions, keyed by id. One per user and kind.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<Registry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        // the map is never left half-updated, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers `live`, discarding the owner's previous session of the same kind.
    pub fn insert(&self, live: LiveSession) -> (Uuid, SharedSession) {
        let id = live.id;
        let key = (live.owner, live.session.kind());
        let shared = Arc::new(AsyncMutex::new(live));

        let mut registry = self.registry();
        if let Some(previous) = registry.by_owner.insert(key, id) {
            registry.sessions.remove(&previous);
            tracing::debug!("Replaced live session {} for user {}", previous, key.0);
        }
        registry.sessions.insert(
            id,
            Entry {
                owner: key.0,
                kind: key.1,
                session: shared.clone(),
            },
        );
        (id, shared)
    }

    /// Looks up a session; sessions owned by someone else are invisible.
    pub fn get(&self, id: Uuid, owner: i64) -> Option<SharedSession> {
        self.registry()
            .sessions
            .get(&id)
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.session.clone())
    }

    /// Abandons a session. Returns `false` if it does not exist for `owner`.
    pub fn remove(&self, id: Uuid, owner: i64) -> bool {
        let mut registry = self.registry();
        let kind = match registry.sessions.get(&id) {
            Some(entry) if entry.owner == owner => entry.kind,
            _ => return false,
        };
        registry.sessions.remove(&id);
        if registry.by_owner.get(&(owner, kind)) == Some(&id) {
            registry.by_owner.remove(&(owner, kind));
        }
        true
    }

    /// Drops every session of a deleted user.
    pub fn remove_owner(&self, owner: i64) {
        let mut registry = self.registry();
        let ids: Vec<Uuid> = registry
            .by_owner
            .iter()
            .filter(|((user, _), _)| *user == owner)
            .map(|(_, id)| *id)
            .collect();
        registry.by_owner.retain(|(user, _), _| *user != owner);
        for id in ids {
            registry.sessions.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.registry().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches roast commentary in the background and writes it back if still current.
///
/// Failures, empty replies and timeouts resolve to `ROAST_FALLBACK`.
pub fn spawn_roast(
    assistant: Arc<dyn StudyAssistant>,
    live: SharedSession,
    request: RoastRequest,
    position: usize,
    option: usize,
    timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let text = match tokio::time::timeout(timeout, assistant.roast(&request)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text,
            Ok(Ok(_)) => ROAST_FALLBACK.to_string(),
            Ok(Err(e)) => {
                tracing::warn!("Roast generation failed: {}", e);
                ROAST_FALLBACK.to_string()
            }
            Err(_) => {
                tracing::warn!("Roast generation timed out after {:?}", timeout);
                ROAST_FALLBACK.to_string()
            }
        };

        let mut guard = live.lock().await;
        if !guard.resolve_commentary(position, option, text) {
            tracing::debug!("Dropped stale roast for session {}", guard.id);
        }
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        ai::{AiError, CategorizeInput, ExamQuizRequest},
        models::{
            chat::ChatMessage,
            question::{GeneratedQuestion, Question},
            topic::Topic,
        },
    };

    enum RoastMode {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct RoastOnly(RoastMode);

    #[async_trait]
    impl StudyAssistant for RoastOnly {
        async fn categorize(&self, _: CategorizeInput) -> Result<Vec<Topic>, AiError> {
            Err(AiError::Disabled)
        }

        async fn generate_review_quiz(&self, _: &[Topic]) -> Result<Vec<GeneratedQuestion>, AiError> {
            Err(AiError::Disabled)
        }

        async fn generate_exam_quiz(
            &self,
            _: &ExamQuizRequest,
        ) -> Result<Vec<GeneratedQuestion>, AiError> {
            Err(AiError::Disabled)
        }

        async fn generate_diagram(&self, _: &str) -> Result<String, AiError> {
            Err(AiError::Disabled)
        }

        async fn roast(&self, _: &RoastRequest) -> Result<String, AiError> {
            match self.0 {
                RoastMode::Reply(text) => Ok(text.to_string()),
                RoastMode::Fail => Err(AiError::EmptyResponse),
                RoastMode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".to_string())
                }
            }
        }

        async fn chat_reply(&self, _: &[ChatMessage], _: &str) -> Result<String, AiError> {
            Err(AiError::Disabled)
        }
    }

    fn quiz(owner: i64) -> LiveSession {
        let questions = (0..3)
            .map(|i| Question {
                id: format!("q{}", i),
                prompt_text: format!("Prompt {}", i),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_option: 0,
                explanation: String::new(),
                hint: None,
                topic: None,
                difficulty: None,
                section: None,
            })
            .collect();
        let mut session = Session::new(SessionKind::Quiz).with_roast(true);
        session.start(questions).unwrap();
        LiveSession::new(owner, session, "review")
    }

    async fn answer_and_roast(mode: RoastMode, timeout: Duration) -> SharedSession {
        let shared = Arc::new(AsyncMutex::new(quiz(1)));
        let outcome = shared.lock().await.answer(0, 2).unwrap();
        let request = outcome.roast.unwrap();
        spawn_roast(Arc::new(RoastOnly(mode)), shared.clone(), request, 0, 2, timeout)
            .await
            .unwrap();
        shared
    }

    #[tokio::test]
    async fn test_roast_is_written_back() {
        let shared = answer_and_roast(RoastMode::Reply("Carbon is crying."), Duration::from_secs(5)).await;
        let live = shared.lock().await;
        assert_eq!(
            live.commentary().unwrap().text.as_deref(),
            Some("Carbon is crying.")
        );
    }

    #[tokio::test]
    async fn test_roast_failure_uses_fallback() {
        let shared = answer_and_roast(RoastMode::Fail, Duration::from_secs(5)).await;
        assert_eq!(
            shared.lock().await.commentary().unwrap().text.as_deref(),
            Some(ROAST_FALLBACK)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_roast_timeout_uses_fallback() {
        let shared = answer_and_roast(RoastMode::Hang, Duration::from_secs(8)).await;
        assert_eq!(
            shared.lock().await.commentary().unwrap().text.as_deref(),
            Some(ROAST_FALLBACK)
        );
    }

    #[test]
    fn test_stale_commentary_is_dropped() {
        let mut live = quiz(1);
        live.answer(0, 2).unwrap();
        live.answer(0, 3).unwrap();
        assert!(!live.resolve_commentary(0, 2, "old".to_string()));
        assert!(live.commentary().unwrap().is_pending());
        assert!(live.resolve_commentary(0, 3, "new".to_string()));

        live.answer(1, 0).unwrap();
        assert!(live.commentary().is_none());

        live.answer(2, 1).unwrap();
        live.clear_commentary();
        assert!(!live.resolve_commentary(2, 1, "late".to_string()));
    }

    #[tokio::test]
    async fn test_registry_keeps_one_session_per_owner_and_kind() {
        let registry = SessionRegistry::new();
        let (first, _) = registry.insert(quiz(1));
        let (second, _) = registry.insert(quiz(1));
        let (other, _) = registry.insert(quiz(2));

        assert!(registry.get(first, 1).is_none());
        assert!(registry.get(second, 1).is_some());
        assert!(registry.get(second, 2).is_none());
        assert_eq!(registry.len(), 2);

        assert!(!registry.remove(other, 1));
        assert!(registry.remove(other, 2));
        registry.remove_owner(1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_does_not_wait_for_a_locked_session() {
        let registry = SessionRegistry::new();
        let (id, shared) = registry.insert(quiz(1));

        let _busy = shared.lock().await;
        assert!(registry.get(id, 1).is_some());
        assert!(registry.get(id, 2).is_none());
        assert!(registry.remove(id, 1));
    }

    #[test]
    fn test_view_hides_answer_key_until_finished() {
        let live = quiz(1);
        let view = serde_json::to_value(live.view()).unwrap();
        assert!(view["questions"][0].get("correct_option").is_none());
        assert_eq!(view["state"], "InProgress");
        assert_eq!(view["kind"], "quiz");
        assert_eq!(view["unanswered"], 3);
        assert_eq!(view["can_submit"], false);
    }
}
