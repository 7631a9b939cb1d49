// src/engine/mod.rs

//! Quiz and test session engine: state machine, scoring and question selection.

pub mod analytics;
pub mod bank;
pub mod selection;
pub mod session;

pub use analytics::{DifficultyBreakdown, SessionResult, Tally};
pub use selection::{CategoryFilter, select_questions};
pub use session::{
    AnswerOutcome, RoastRequest, Session, SessionError, SessionKind, SessionState,
    SubmissionMeta,
};
