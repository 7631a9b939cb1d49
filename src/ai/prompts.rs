// src/ai/prompts.rs

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use super::{AiError, ExamQuizRequest};
use crate::{
    engine::RoastRequest,
    models::{
        chat::ChatMessage,
        topic::{Topic, flatten_for_quiz},
    },
};

/// Number of earlier chat messages sent as context.
pub const CHAT_CONTEXT_MESSAGES: usize = 10;

pub const CHAT_FALLBACK: &str = "Sorry, I couldn't generate a reply.";

pub const ORGANIZER_SYSTEM: &str = "You are an expert Chemistry professor. Organize the questions hierarchically. Assign a difficulty level to each.";

pub const ORGANIZER_IMAGE_TEXT: &str =
    "Extract questions from this image and categorize them into Chemistry topics and subtopics.";

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").expect("static regex is valid"));

pub fn organizer_text(raw: &str) -> String {
    format!(
        "Analyze the following raw text containing chemistry questions. Categorize them logically into topics and subtopics.\n\nRaw Text:\n{}",
        raw
    )
}

pub fn review_quiz(topics: &[Topic]) -> String {
    format!(
        r#"Based on the following chemistry questions/topics provided by the user, generate a 5-question multiple-choice quiz.

Format Requirements:
1. 4 options per question.
2. 1 correct answer.
3. A helpful hint.
4. A detailed explanation.
5. Tag each question with its specific Topic and Difficulty (Easy/Medium/Hard).

Context Questions:
{}"#,
        flatten_for_quiz(topics)
    )
}

pub fn exam_quiz(request: &ExamQuizRequest) -> String {
    let sections = request
        .sections
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let topics = if request.topics.is_empty() {
        String::new()
    } else {
        format!(
            "\nPrioritize questions from these specific topics: {}.",
            request.topics.join(", ")
        )
    };

    format!(
        r#"Generate a {level} level Chemistry quiz containing exactly {count} questions.

Focus ONLY on these branches of chemistry: {sections}.{topics}

Difficulty Context:
- If JEE Main: Questions should be conceptual, formula-based, and moderate difficulty.
- If JEE Advanced: Questions should be multi-concept, deep, and high difficulty requiring critical thinking.

Format Requirements:
1. 4 options per question.
2. 1 correct answer.
3. A strategic hint.
4. A rigorous, scientific explanation.
5. Tag each question with its specific sub-topic and difficulty (Easy/Medium/Hard)."#,
        level = request.level.label(),
        count = request.count,
        sections = sections,
        topics = topics,
    )
}

pub fn diagram(concept: &str) -> String {
    format!(
        r#"Create an educational, simplified SVG diagram for the chemistry concept: '{}'.

Requirements:
1. Use internal CSS animations (<style>) or SMIL (<animate>) to make the diagram dynamic (e.g., electrons orbiting, molecules vibrating, reaction bubbling).
2. Use a transparent background.
3. Ensure colors are scientific and high contrast (whites, cyans, blues, oranges).
4. Return ONLY the raw SVG code. Do not wrap in markdown code blocks."#,
        concept
    )
}

pub fn roast(request: &RoastRequest) -> String {
    format!(
        r#"You are a sassy chemistry teacher with a great sense of humor. A student just got a question wrong.

Question: {}
Correct Answer: {}
Student's Wrong Answer: {}
Topic: {}

Generate a SHORT, FUNNY, SASSY roast (1-2 sentences max) that:
1. Is playful and humorous, not mean-spirited
2. References chemistry concepts, elements, or reactions
3. Makes the student laugh while learning
4. Is Gen-Z friendly with a bit of attitude

Examples of the style:
- "You just violated the Octet rule. Carbon is crying right now. 😭"
- "That answer had less stability than a free radical in a thunderstorm. ⚡"
- "Even noble gases are more reactive than your answer was correct. 💀"
- "That's not how equilibrium works, bestie. Le Chatelier is rolling in his grave. 🪦"

Generate ONE roast now (keep it short and punchy):"#,
        request.question_text,
        request.correct_option_text,
        request.chosen_option_text,
        request.topic_label
    )
}

/// Tutor prompt with the last `CHAT_CONTEXT_MESSAGES` messages as transcript.
pub fn chat(history: &[ChatMessage], message: &str) -> String {
    let start = history.len().saturating_sub(CHAT_CONTEXT_MESSAGES);
    let transcript = history[start..]
        .iter()
        .map(|m| {
            let speaker = if m.is_user() { "Student" } else { "Tutor" };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a helpful chemistry tutor assisting a student. Keep responses concise, step-by-step, and encouraging.\n\nConversation so far:\n{}\n\nStudent: {}\nTutor:",
        transcript, message
    )
}

/// Strips markdown fences from model output and checks an `<svg` element is present.
pub fn extract_svg(raw: &str) -> Result<String, AiError> {
    let cleaned = CODE_FENCE.replace_all(raw, "").trim().to_string();
    if !cleaned.contains("<svg") {
        return Err(AiError::Malformed(
            "diagram output contains no <svg> element".to_string(),
        ));
    }
    Ok(cleaned)
}

pub fn organizer_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "topics": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Major Chemistry Topic (e.g., Organic Chemistry)" },
                        "subtopics": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "name": { "type": "STRING", "description": "Specific Subtopic (e.g., Alkanes)" },
                                    "questions": {
                                        "type": "ARRAY",
                                        "items": {
                                            "type": "OBJECT",
                                            "properties": {
                                                "id": { "type": "STRING" },
                                                "text": { "type": "STRING" },
                                                "difficulty": { "type": "STRING", "enum": ["Easy", "Medium", "Hard"] }
                                            },
                                            "required": ["text", "difficulty"]
                                        }
                                    }
                                },
                                "required": ["name", "questions"]
                            }
                        }
                    },
                    "required": ["name", "subtopics"]
                }
            }
        }
    })
}

pub fn quiz_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "questionText": { "type": "STRING" },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "An array of exactly 4 possible answers."
                },
                "correctAnswerIndex": {
                    "type": "INTEGER",
                    "description": "The zero-based index of the correct answer in the options array."
                },
                "explanation": { "type": "STRING", "description": "Detailed explanation of why the answer is correct." },
                "hint": { "type": "STRING", "description": "A helpful hint that doesn't give away the answer directly." },
                "difficulty": { "type": "STRING", "enum": ["Easy", "Medium", "Hard"], "description": "The difficulty level of this specific question." },
                "topic": { "type": "STRING", "description": "The specific chemistry sub-topic this question tests (e.g. 'Stoichiometry' or 'Alkenes')." }
            },
            "required": ["questionText", "options", "correctAnswerIndex", "explanation", "hint", "difficulty", "topic"]
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        ai::ExamLevel,
        models::{
            chat::{ROLE_ASSISTANT, ROLE_USER},
            question::Section,
        },
    };

    fn message(id: i64, role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            id,
            user_id: 1,
            role: role.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_extract_svg_strips_fences() {
        let raw = "```svg\n<svg viewBox=\"0 0 10 10\"><circle r=\"1\"/></svg>\n```";
        assert_eq!(
            extract_svg(raw).unwrap(),
            "<svg viewBox=\"0 0 10 10\"><circle r=\"1\"/></svg>"
        );
    }

    #[test]
    fn test_extract_svg_rejects_prose() {
        assert!(matches!(
            extract_svg("I cannot draw that."),
            Err(AiError::Malformed(_))
        ));
    }

    #[test]
    fn test_chat_prompt_keeps_last_ten_messages() {
        let history: Vec<_> = (0..14)
            .map(|i| {
                let role = if i % 2 == 0 { ROLE_USER } else { ROLE_ASSISTANT };
                message(i, role, &format!("m{}", i))
            })
            .collect();

        let prompt = chat(&history, "What is a mole?");
        assert!(!prompt.contains(": m3\n"));
        assert!(prompt.contains("Student: m4\n"));
        assert!(prompt.contains("Tutor: m13\n"));
        assert!(prompt.ends_with("Student: What is a mole?\nTutor:"));
    }

    #[test]
    fn test_exam_prompt_mentions_sections_and_topics() {
        let request = ExamQuizRequest {
            sections: vec![Section::Organic, Section::Physical],
            level: ExamLevel::Advanced,
            count: 12,
            topics: vec!["Aldol Condensation".to_string()],
        };
        let prompt = exam_quiz(&request);
        assert!(prompt.starts_with("Generate a JEE Advanced level Chemistry quiz containing exactly 12 questions."));
        assert!(prompt.contains("Organic, Physical."));
        assert!(prompt.contains("specific topics: Aldol Condensation."));

        let plain = exam_quiz(&ExamQuizRequest {
            topics: Vec::new(),
            ..request
        });
        assert!(!plain.contains("Prioritize"));
    }
}
