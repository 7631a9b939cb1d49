// src/models/topic.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::question::Difficulty;

/// A raw question placed in the hierarchy by the organiser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizedQuestion {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTopic {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<OrganizedQuestion>,
}

/// Top-level node of the organised hierarchy (e.g. "Organic Chemistry").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    #[serde(default)]
    pub subtopics: Vec<SubTopic>,
}

/// DTO for the organiser: either raw text or a base64 JPEG.
#[derive(Debug, Deserialize, Validate)]
pub struct CategorizeRequest {
    #[validate(length(min = 1, max = 50000))]
    pub text: Option<String>,
    /// Base64-encoded JPEG; roughly 10 MB decoded at most.
    #[validate(length(min = 1, max = 14000000))]
    pub image_base64: Option<String>,
}

/// Request body cap for the organiser: the largest image plus the text and JSON framing.
pub const ORGANIZER_BODY_LIMIT: usize = 14_000_000 + 50_000 + 64 * 1024;

/// Maximum characters of organised questions sent as quiz context.
pub const QUIZ_CONTEXT_LIMIT: usize = 15000;

/// Flattens the hierarchy into the prompt context used for review quizzes.
///
/// Questions within a subtopic and subtopics within a topic are joined with
/// "; ", topics with newlines. The output is cut at `QUIZ_CONTEXT_LIMIT` chars.
pub fn flatten_for_quiz(topics: &[Topic]) -> String {
    let joined = topics
        .iter()
        .map(|t| {
            t.subtopics
                .iter()
                .map(|s| {
                    s.questions
                        .iter()
                        .map(|q| q.text.as_str())
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .collect::<Vec<_>>()
                .join("; ")
        })
        .collect::<Vec<_>>()
        .join("\n");

    joined.chars().take(QUIZ_CONTEXT_LIMIT).collect()
}

pub fn question_count(topics: &[Topic]) -> usize {
    topics
        .iter()
        .flat_map(|t| t.subtopics.iter())
        .map(|s| s.questions.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str) -> OrganizedQuestion {
        OrganizedQuestion {
            id: None,
            text: text.to_string(),
            difficulty: Some(Difficulty::Easy),
        }
    }

    #[test]
    fn test_flatten_joins_levels() {
        let topics = vec![
            Topic {
                name: "Organic".to_string(),
                subtopics: vec![
                    SubTopic {
                        name: "Alkanes".to_string(),
                        questions: vec![q("Name CH4"), q("Name C2H6")],
                    },
                    SubTopic {
                        name: "Alkenes".to_string(),
                        questions: vec![q("Hydrate propene")],
                    },
                ],
            },
            Topic {
                name: "Physical".to_string(),
                subtopics: vec![SubTopic {
                    name: "Gases".to_string(),
                    questions: vec![q("State PV = nRT")],
                }],
            },
        ];

        assert_eq!(
            flatten_for_quiz(&topics),
            "Name CH4; Name C2H6; Hydrate propene\nState PV = nRT"
        );
        assert_eq!(question_count(&topics), 4);
    }

    #[test]
    fn test_flatten_is_capped() {
        let long = "x".repeat(QUIZ_CONTEXT_LIMIT + 500);
        let topics = vec![Topic {
            name: "T".to_string(),
            subtopics: vec![SubTopic {
                name: "S".to_string(),
                questions: vec![q(&long)],
            }],
        }];
        assert_eq!(flatten_for_quiz(&topics).chars().count(), QUIZ_CONTEXT_LIMIT);
    }
}
