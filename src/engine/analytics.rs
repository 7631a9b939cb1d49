// src/engine/analytics.rs

use std::collections::BTreeMap;

use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::models::question::{Difficulty, Question};

/// Attempted/correct counter for one analytics bucket.
///
/// Serializes as `{attempted, correct, ratio}` with `ratio: null` for an empty bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub attempted: u32,
    pub correct: u32,
}

impl Tally {
    pub fn new(attempted: u32, correct: u32) -> Self {
        Self { attempted, correct }
    }

    fn record(&mut self, is_correct: bool) {
        self.attempted += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    /// Share of correct answers in `[0, 1]`; `None` for an empty bucket.
    pub fn ratio(&self) -> Option<f64> {
        (self.attempted > 0).then(|| self.correct as f64 / self.attempted as f64)
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Tally", 3)?;
        state.serialize_field("attempted", &self.attempted)?;
        state.serialize_field("correct", &self.correct)?;
        state.serialize_field("ratio", &self.ratio())?;
        state.end()
    }
}

/// Fixed three-bucket difficulty breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DifficultyBreakdown {
    #[serde(rename = "Easy")]
    pub easy: Tally,
    #[serde(rename = "Medium")]
    pub medium: Tally,
    #[serde(rename = "Hard")]
    pub hard: Tally,
}

impl DifficultyBreakdown {
    pub fn get(&self, difficulty: Difficulty) -> Tally {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    fn bucket_mut(&mut self, difficulty: Difficulty) -> &mut Tally {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Score and breakdowns derived from a completed answer sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResult {
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub topic_breakdown: BTreeMap<String, Tally>,
    pub difficulty_breakdown: DifficultyBreakdown,
}

/// Rounded percentage for display; an empty sheet scores 0.
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (score as f64 / total as f64 * 100.0).round() as u32
}

/// Scores `answers` against `questions` in a single pass.
///
/// Positions are matched by index; a missing or unanswered entry counts as
/// attempted but wrong.
pub fn evaluate(questions: &[Question], answers: &[Option<usize>]) -> SessionResult {
    let mut score = 0;
    let mut topic_breakdown: BTreeMap<String, Tally> = BTreeMap::new();
    let mut difficulty_breakdown = DifficultyBreakdown::default();

    for (idx, question) in questions.iter().enumerate() {
        let is_correct = answers.get(idx).copied().flatten() == Some(question.correct_option);
        if is_correct {
            score += 1;
        }

        topic_breakdown
            .entry(question.topic_label().to_string())
            .or_default()
            .record(is_correct);
        difficulty_breakdown
            .bucket_mut(question.difficulty_bucket())
            .record(is_correct);
    }

    let total = questions.len() as u32;
    SessionResult {
        score,
        total,
        percentage: percentage(score, total),
        topic_breakdown,
        difficulty_breakdown,
    }
}
