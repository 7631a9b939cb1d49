// src/models/result.rs

use serde::Serialize;
use sqlx::{FromRow, types::Json};

/// Represents the 'session_results' table in the database.
/// One row per submitted quiz or test; rows are never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: i64,

    /// 'cbt' or 'quiz'.
    pub kind: String,

    pub score: i32,
    pub total: i32,

    /// Selected option per position, in session order.
    pub selected_answers: Json<Vec<i64>>,

    /// Question ids in session order.
    pub question_ids: Json<Vec<String>>,

    /// Section filter ('All', 'Organic', ...) or the generation context.
    pub category_filter: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SessionRecord {
    pub fn ratio(&self) -> f64 {
        if self.total <= 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64
    }
}

/// Attempts and averages over a user's stored results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultSummary {
    pub attempts: usize,
    /// Mean of per-attempt percentages, rounded.
    pub average_percentage: u32,
    pub best_percentage: u32,
}

impl ResultSummary {
    pub fn from_records(records: &[SessionRecord]) -> Self {
        if records.is_empty() {
            return Self {
                attempts: 0,
                average_percentage: 0,
                best_percentage: 0,
            };
        }

        let sum: f64 = records.iter().map(SessionRecord::ratio).sum();
        let best = records
            .iter()
            .map(SessionRecord::ratio)
            .fold(0.0_f64, f64::max);

        Self {
            attempts: records.len(),
            average_percentage: (sum / records.len() as f64 * 100.0).round() as u32,
            best_percentage: (best * 100.0).round() as u32,
        }
    }
}
