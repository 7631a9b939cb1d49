// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Topic label used for analytics when a question carries none.
pub const DEFAULT_TOPIC: &str = "General";

/// Difficulty tag attached to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Lenient parse used on generator output ("easy", "HARD", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// Branch of chemistry a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Organic,
    Inorganic,
    Physical,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Organic, Section::Inorganic, Section::Physical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Organic => "Organic",
            Section::Inorganic => "Inorganic",
            Section::Physical => "Physical",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A multiple-choice question as it enters a session.
///
/// Both the bundled CBT bank and the generative quiz source are normalized
/// into this shape. Immutable once selected into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt_text: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub explanation: String,
    pub hint: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub section: Option<Section>,
}

impl Question {
    /// Topic used for analytics grouping.
    pub fn topic_label(&self) -> &str {
        self.topic
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TOPIC)
    }

    /// Difficulty bucket used for analytics; untagged questions count as Medium.
    pub fn difficulty_bucket(&self) -> Difficulty {
        self.difficulty.unwrap_or(Difficulty::Medium)
    }

    pub fn correct_option_text(&self) -> &str {
        self.options
            .get(self.correct_option)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Question as returned by the generative collaborator.
///
/// Field names follow the JSON schema sent with the request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    #[serde(default)]
    pub id: Option<String>,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: i64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

/// Why a generated question could not be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    EmptyPrompt { position: usize },
    NoOptions { position: usize },
    CorrectIndexOutOfRange { position: usize, index: i64, options: usize },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::EmptyPrompt { position } => {
                write!(f, "question {} has no text", position)
            }
            ShapeError::NoOptions { position } => {
                write!(f, "question {} has no options", position)
            }
            ShapeError::CorrectIndexOutOfRange {
                position,
                index,
                options,
            } => write!(
                f,
                "question {} marks option {} correct but has {} options",
                position, index, options
            ),
        }
    }
}

impl std::error::Error for ShapeError {}

impl GeneratedQuestion {
    /// Converts generator output into a session question.
    ///
    /// `position` is used for error reporting and to derive an id when the
    /// generator omitted one.
    pub fn into_question(self, position: usize) -> Result<Question, ShapeError> {
        if self.question_text.trim().is_empty() {
            return Err(ShapeError::EmptyPrompt { position });
        }
        if self.options.is_empty() {
            return Err(ShapeError::NoOptions { position });
        }
        let correct_option = usize::try_from(self.correct_answer_index)
            .ok()
            .filter(|idx| *idx < self.options.len())
            .ok_or(ShapeError::CorrectIndexOutOfRange {
                position,
                index: self.correct_answer_index,
                options: self.options.len(),
            })?;

        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("gen-{}", position + 1));

        Ok(Question {
            id,
            prompt_text: self.question_text,
            options: self.options,
            correct_option,
            explanation: self.explanation,
            hint: self.hint.filter(|h| !h.trim().is_empty()),
            topic: self.topic.filter(|t| !t.trim().is_empty()),
            difficulty: self.difficulty.as_deref().and_then(Difficulty::parse),
            section: None,
        })
    }
}

/// Normalizes a whole generated batch; any malformed entry fails the batch.
pub fn normalize_generated(batch: Vec<GeneratedQuestion>) -> Result<Vec<Question>, ShapeError> {
    batch
        .into_iter()
        .enumerate()
        .map(|(position, q)| q.into_question(position))
        .collect()
}

/// DTO for sending a question to the client while a session is running.
/// The answer key and explanation stay hidden until the session is finished.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt_text: String,
    pub options: Vec<String>,
    pub hint: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub section: Option<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl PublicQuestion {
    pub fn from_question(q: &Question, reveal: bool) -> Self {
        Self {
            id: q.id.clone(),
            prompt_text: q.prompt_text.clone(),
            options: q.options.clone(),
            hint: q.hint.clone(),
            topic: q.topic.clone(),
            difficulty: q.difficulty,
            section: q.section,
            correct_option: reveal.then_some(q.correct_option),
            explanation: reveal.then(|| q.explanation.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(correct: i64) -> GeneratedQuestion {
        GeneratedQuestion {
            id: None,
            question_text: "Which gas is evolved when zinc reacts with HCl?".to_string(),
            options: vec!["H2".into(), "O2".into(), "Cl2".into(), "N2".into()],
            correct_answer_index: correct,
            explanation: "Zn + 2HCl -> ZnCl2 + H2".to_string(),
            hint: Some("  ".to_string()),
            difficulty: Some("easy".to_string()),
            topic: Some("Redox Reactions".to_string()),
        }
    }

    #[test]
    fn test_generated_question_is_normalized() {
        let q = generated(0).into_question(2).unwrap();
        assert_eq!(q.id, "gen-3");
        assert_eq!(q.correct_option, 0);
        assert_eq!(q.difficulty, Some(Difficulty::Easy));
        assert_eq!(q.hint, None);
        assert_eq!(q.correct_option_text(), "H2");
    }

    #[test]
    fn test_out_of_range_correct_index_fails_batch() {
        let err = normalize_generated(vec![generated(1), generated(4)]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::CorrectIndexOutOfRange {
                position: 1,
                index: 4,
                options: 4
            }
        );
        assert!(generated(-1).into_question(0).is_err());
    }

    #[test]
    fn test_analytics_defaults() {
        let mut q = generated(0).into_question(0).unwrap();
        q.topic = None;
        q.difficulty = None;
        assert_eq!(q.topic_label(), DEFAULT_TOPIC);
        assert_eq!(q.difficulty_bucket(), Difficulty::Medium);
        assert_eq!(q.difficulty, None);
    }

    #[test]
    fn test_public_question_hides_answer_until_revealed() {
        let q = generated(2).into_question(0).unwrap();
        let hidden = serde_json::to_value(PublicQuestion::from_question(&q, false)).unwrap();
        assert!(hidden.get("correct_option").is_none());
        assert!(hidden.get("explanation").is_none());

        let shown = serde_json::to_value(PublicQuestion::from_question(&q, true)).unwrap();
        assert_eq!(shown["correct_option"], 2);
    }
}
