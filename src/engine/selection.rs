// src/engine/selection.rs

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::models::question::{Question, Section};

/// Category predicate applied to a fixed bank before shuffling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    #[serde(untagged)]
    Section(Section),
}

impl CategoryFilter {
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Section(section) => question.section == Some(*section),
        }
    }

    /// Label persisted with a submitted result.
    pub fn label(&self) -> String {
        match self {
            CategoryFilter::All => "All".to_string(),
            CategoryFilter::Section(section) => section.to_string(),
        }
    }
}

/// Draws up to `count` questions from `bank`.
///
/// The bank is filtered by `filter`, shuffled uniformly (Fisher-Yates via
/// `SliceRandom::shuffle`) and truncated to `min(count, filtered.len())`.
/// An empty return value means nothing matched.
pub fn select_questions<R>(
    bank: &[Question],
    filter: CategoryFilter,
    count: usize,
    rng: &mut R,
) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    let mut picked: Vec<Question> = bank.iter().filter(|q| filter.matches(q)).cloned().collect();
    picked.shuffle(rng);
    picked.truncate(count);
    picked
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn bank(size: usize) -> Vec<Question> {
        (0..size)
            .map(|i| Question {
                id: format!("b{}", i),
                prompt_text: format!("Question {}", i),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_option: 0,
                explanation: String::new(),
                hint: None,
                topic: None,
                difficulty: None,
                section: Some(if i % 2 == 0 {
                    Section::Organic
                } else {
                    Section::Physical
                }),
            })
            .collect()
    }

    #[test]
    fn test_count_is_clamped_to_filtered_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_questions(
            &bank(10),
            CategoryFilter::Section(Section::Organic),
            50,
            &mut rng,
        );
        assert_eq!(picked.len(), 5);
        assert!(picked.iter().all(|q| q.section == Some(Section::Organic)));
    }

    #[test]
    fn test_empty_category_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_questions(
            &bank(10),
            CategoryFilter::Section(Section::Inorganic),
            5,
            &mut rng,
        );
        assert!(picked.is_empty());
    }

    #[test]
    fn test_selection_has_no_duplicates() {
        let mut rng = StdRng::seed_from_u64(11);
        let picked = select_questions(&bank(10), CategoryFilter::All, 6, &mut rng);
        let mut ids: Vec<_> = picked.iter().map(|q| q.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_every_question_is_drawn_about_k_over_m_of_the_time() {
        const M: usize = 10;
        const K: usize = 4;
        const TRIALS: usize = 20_000;

        let source = bank(M);
        let mut rng = StdRng::seed_from_u64(2024);
        let mut seen: HashMap<String, usize> = HashMap::new();
        for _ in 0..TRIALS {
            for q in select_questions(&source, CategoryFilter::All, K, &mut rng) {
                *seen.entry(q.id).or_default() += 1;
            }
        }

        let expected = K as f64 / M as f64;
        for q in &source {
            let freq = seen.get(&q.id).copied().unwrap_or(0) as f64 / TRIALS as f64;
            assert!(
                (freq - expected).abs() < 0.03,
                "{} drawn with frequency {}",
                q.id,
                freq
            );
        }
    }

    #[test]
    fn test_filter_serde_shape() {
        let all: CategoryFilter = serde_json::from_str("\"All\"").unwrap();
        assert_eq!(all, CategoryFilter::All);
        let organic: CategoryFilter = serde_json::from_str("\"Organic\"").unwrap();
        assert_eq!(organic, CategoryFilter::Section(Section::Organic));
        assert_eq!(organic.label(), "Organic");
    }
}
