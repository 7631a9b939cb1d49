// src/engine/session.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    engine::analytics::{self, DifficultyBreakdown, SessionResult, Tally},
    models::{question::Question, result::SessionRecord},
    store::{NewSessionRecord, ResultStore, StoreError},
};

/// Lifecycle of a session. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Finished,
}

/// Where the questions of a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Fixed-form computer-based test drawn from the bundled bank.
    Cbt,
    /// Quiz produced by the generative collaborator.
    Quiz,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Cbt => "cbt",
            SessionKind::Quiz => "quiz",
        }
    }
}

/// Errors raised by session transitions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no questions available for this session")]
    Empty,
    #[error("session has already been started")]
    AlreadyStarted,
    #[error("session has not been started")]
    NotStarted,
    #[error("session is already finished")]
    Finished,
    #[error("{unanswered} question(s) still unanswered")]
    Incomplete { unanswered: usize },
    #[error("question {position} does not exist (session has {len})")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("option {option} does not exist (question has {options})")]
    OptionOutOfRange { option: usize, options: usize },
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl SessionError {
    /// Validation errors are rejected synchronously and leave state untouched.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SessionError::Persistence(_))
    }
}

/// Inputs for the commentary side-channel after a wrong answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoastRequest {
    pub question_text: String,
    pub correct_option_text: String,
    pub chosen_option_text: String,
    pub topic_label: String,
}

/// Outcome of `select_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub position: usize,
    pub option: usize,
    pub is_correct: bool,
    /// Set when the answer was wrong and commentary is enabled.
    pub roast: Option<RoastRequest>,
}

/// Caller-side metadata written alongside a submitted result.
#[derive(Debug, Clone)]
pub struct SubmissionMeta {
    pub user_id: i64,
    pub category_filter: String,
}

/// One quiz or test attempt.
#[derive(Debug, Clone)]
pub struct Session {
    kind: SessionKind,
    roast_enabled: bool,
    state: SessionState,
    questions: Vec<Question>,
    selected: Vec<Option<usize>>,
    current: usize,
    result: Option<SessionResult>,
}

impl Session {
    pub fn new(kind: SessionKind) -> Self {
        Self {
            kind,
            roast_enabled: false,
            state: SessionState::NotStarted,
            questions: Vec::new(),
            selected: Vec::new(),
            current: 0,
            result: None,
        }
    }

    /// Enables roast commentary on wrong answers. Only meaningful for quizzes.
    pub fn with_roast(mut self, enabled: bool) -> Self {
        self.roast_enabled = enabled && self.kind == SessionKind::Quiz;
        self
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn roast_enabled(&self) -> bool {
        self.roast_enabled
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn selected_answers(&self) -> &[Option<usize>] {
        &self.selected
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Loads the question list and moves to `InProgress`.
    ///
    /// Rejects an empty list; the session then stays `NotStarted`.
    pub fn start(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        self.selected = vec![None; questions.len()];
        self.questions = questions;
        self.current = 0;
        self.result = None;
        self.state = SessionState::InProgress;
        Ok(())
    }

    /// Records `option` as the answer for `position`, replacing any earlier pick.
    pub fn select_answer(
        &mut self,
        position: usize,
        option: usize,
    ) -> Result<AnswerOutcome, SessionError> {
        match self.state {
            SessionState::NotStarted => return Err(SessionError::NotStarted),
            SessionState::Finished => return Err(SessionError::Finished),
            SessionState::InProgress => {}
        }

        let question = self
            .questions
            .get(position)
            .ok_or(SessionError::PositionOutOfRange {
                position,
                len: self.questions.len(),
            })?;
        if option >= question.options.len() {
            return Err(SessionError::OptionOutOfRange {
                option,
                options: question.options.len(),
            });
        }

        let is_correct = option == question.correct_option;
        let roast = (self.roast_enabled && !is_correct).then(|| RoastRequest {
            question_text: question.prompt_text.clone(),
            correct_option_text: question.correct_option_text().to_string(),
            chosen_option_text: question.options[option].clone(),
            topic_label: question.topic.clone().unwrap_or_else(|| "Chemistry".to_string()),
        });

        self.selected[position] = Some(option);

        Ok(AnswerOutcome {
            position,
            option,
            is_correct,
            roast,
        })
    }

    /// Moves the cursor to `position`.
    pub fn go_to(&mut self, position: usize) -> Result<usize, SessionError> {
        if position >= self.questions.len() {
            return Err(SessionError::PositionOutOfRange {
                position,
                len: self.questions.len(),
            });
        }
        self.current = position;
        Ok(self.current)
    }

    /// Advances the cursor; a no-op on the last question.
    pub fn next(&mut self) -> usize {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        self.current
    }

    /// Moves the cursor back; a no-op on the first question.
    pub fn prev(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    pub fn unanswered(&self) -> usize {
        self.selected.iter().filter(|s| s.is_none()).count()
    }

    /// True iff every question has an answer.
    pub fn can_submit(&self) -> bool {
        !self.questions.is_empty() && self.unanswered() == 0
    }

    /// Validates the sheet and computes its result without changing state.
    pub fn evaluate(&self) -> Result<SessionResult, SessionError> {
        match self.state {
            SessionState::NotStarted => return Err(SessionError::NotStarted),
            SessionState::Finished => return Err(SessionError::Finished),
            SessionState::InProgress => {}
        }
        if !self.can_submit() {
            return Err(SessionError::Incomplete {
                unanswered: self.unanswered(),
            });
        }
        Ok(analytics::evaluate(&self.questions, &self.selected))
    }

    /// Scores the session, writes the record through `gateway` and finishes.
    ///
    /// The session only becomes `Finished` once the write succeeded; on any
    /// error it is left exactly as it was.
    pub async fn submit<G>(
        &mut self,
        gateway: &G,
        meta: SubmissionMeta,
    ) -> Result<SessionRecord, SessionError>
    where
        G: ResultStore + ?Sized,
    {
        let result = self.evaluate()?;

        let record = NewSessionRecord {
            user_id: meta.user_id,
            kind: self.kind,
            score: result.score as i32,
            total: result.total as i32,
            selected_answers: self
                .selected
                .iter()
                .map(|s| s.map_or(-1, |o| o as i64))
                .collect(),
            question_ids: self.questions.iter().map(|q| q.id.clone()).collect(),
            category_filter: meta.category_filter,
        };

        let stored = gateway.create_result(record).await?;

        self.result = Some(result);
        self.state = SessionState::Finished;
        Ok(stored)
    }

    /// Cached result; `None` until the session is finished.
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn score(&self) -> Option<u32> {
        self.result.as_ref().map(|r| r.score)
    }

    pub fn percentage(&self) -> Option<u32> {
        self.result.as_ref().map(|r| r.percentage)
    }

    /// Topic and difficulty tallies of the finished session.
    pub fn breakdown(&self) -> Option<(&BTreeMap<String, Tally>, &DifficultyBreakdown)> {
        self.result
            .as_ref()
            .map(|r| (&r.topic_breakdown, &r.difficulty_breakdown))
    }
}
