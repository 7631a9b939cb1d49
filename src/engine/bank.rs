// src/engine/bank.rs

use crate::models::question::{Difficulty, Question, Section};

struct BankEntry {
    id: &'static str,
    section: Section,
    prompt: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
    difficulty: Difficulty,
}

const ENTRIES: &[BankEntry] = &[
    BankEntry {
        id: "q1",
        section: Section::Physical,
        prompt: "What is the SI unit of entropy?",
        options: ["J/mol·K", "J/mol", "K/mol", "J/K"],
        correct: 0,
        explanation: "Entropy is measured in J/mol·K in SI units.",
        difficulty: Difficulty::Easy,
    },
    BankEntry {
        id: "q2",
        section: Section::Physical,
        prompt: "For an ideal gas, PV = ? at constant temperature.",
        options: ["nRT", "nR", "RT", "nT"],
        correct: 0,
        explanation: "Ideal gas law: PV = nRT.",
        difficulty: Difficulty::Easy,
    },
    BankEntry {
        id: "q3",
        section: Section::Inorganic,
        prompt: "Which element has the highest electronegativity?",
        options: ["Oxygen", "Fluorine", "Chlorine", "Nitrogen"],
        correct: 1,
        explanation: "Fluorine is the most electronegative element.",
        difficulty: Difficulty::Easy,
    },
    BankEntry {
        id: "q4",
        section: Section::Inorganic,
        prompt: "Coordination number of Fe in [Fe(CN)6]4- is:",
        options: ["2", "4", "6", "8"],
        correct: 2,
        explanation: "There are 6 ligands around Fe.",
        difficulty: Difficulty::Medium,
    },
    BankEntry {
        id: "q5",
        section: Section::Organic,
        prompt: "Which reagent converts alcohol to alkyl chloride?",
        options: ["KMnO4", "PCl5", "NaOH", "NaBH4"],
        correct: 1,
        explanation: "PCl5 converts alcohols to alkyl chlorides.",
        difficulty: Difficulty::Easy,
    },
    BankEntry {
        id: "q6",
        section: Section::Organic,
        prompt: "The major product of hydration of propene is:",
        options: ["1-propanol", "2-propanol", "propanal", "propanoic acid"],
        correct: 1,
        explanation: "Markovnikov addition gives 2-propanol.",
        difficulty: Difficulty::Medium,
    },
    BankEntry {
        id: "q7",
        section: Section::Physical,
        prompt: "pH of a 0.001 M HCl solution is approximately:",
        options: ["1", "2", "3", "4"],
        correct: 2,
        explanation: "pH = -log(10^-3) = 3.",
        difficulty: Difficulty::Easy,
    },
    BankEntry {
        id: "q8",
        section: Section::Organic,
        prompt: "Which of the following is aromatic?",
        options: ["Cyclobutadiene", "Cyclohexane", "Benzene", "Cyclooctatetraene"],
        correct: 2,
        explanation: "Benzene is aromatic (6 π electrons).",
        difficulty: Difficulty::Easy,
    },
    BankEntry {
        id: "q9",
        section: Section::Inorganic,
        prompt: "The oxidation state of Mn in KMnO4 is:",
        options: ["+2", "+4", "+6", "+7"],
        correct: 3,
        explanation: "Mn is +7 in permanganate.",
        difficulty: Difficulty::Medium,
    },
    BankEntry {
        id: "q10",
        section: Section::Physical,
        prompt: "Rate constant unit for a first-order reaction is:",
        options: ["mol L^-1 s^-1", "s^-1", "L mol^-1 s^-1", "mol L^-1"],
        correct: 1,
        explanation: "First-order rate constant has units of s^-1.",
        difficulty: Difficulty::Medium,
    },
];

/// The bundled fixed-form test bank.
pub fn cbt_bank() -> Vec<Question> {
    ENTRIES
        .iter()
        .map(|e| Question {
            id: e.id.to_string(),
            prompt_text: e.prompt.to_string(),
            options: e.options.iter().map(|o| o.to_string()).collect(),
            correct_option: e.correct,
            explanation: e.explanation.to_string(),
            hint: None,
            topic: Some(format!("{} Chemistry", e.section)),
            difficulty: Some(e.difficulty),
            section: Some(e.section),
        })
        .collect()
}

/// Per-section syllabus offered as topic-priority hints for generated exams.
pub fn syllabus(section: Section) -> &'static [&'static str] {
    match section {
        Section::Physical => &[
            "Mole Concept",
            "Atomic Structure",
            "Gaseous State",
            "Thermodynamics",
            "Chemical Equilibrium",
            "Ionic Equilibrium",
            "Redox Reactions",
            "Solid State",
            "Solutions",
            "Electrochemistry",
            "Chemical Kinetics",
            "Surface Chemistry",
        ],
        Section::Inorganic => &[
            "Periodic Classification",
            "Chemical Bonding",
            "Hydrogen",
            "s-Block Elements",
            "p-Block Elements",
            "d- and f-Block Elements",
            "Coordination Compounds",
            "General Principles of Metallurgy",
            "Qualitative Analysis",
        ],
        Section::Organic => &[
            "General Organic Chemistry",
            "Isomerism",
            "Hydrocarbons",
            "Haloalkanes & Haloarenes",
            "Alcohols, Phenols & Ethers",
            "Aldehydes, Ketones & Carboxylic Acids",
            "Amines",
            "Biomolecules",
            "Polymers",
            "Chemistry in Everyday Life",
        ],
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_bank_is_well_formed() {
        let bank = cbt_bank();
        assert_eq!(bank.len(), 10);

        let ids: HashSet<_> = bank.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), bank.len());

        for q in &bank {
            assert_eq!(q.options.len(), 4);
            assert!(q.correct_option < q.options.len());
            assert!(q.section.is_some());
        }
    }

    #[test]
    fn test_every_section_is_covered() {
        let bank = cbt_bank();
        for section in Section::ALL {
            assert!(bank.iter().any(|q| q.section == Some(section)));
            assert!(!syllabus(section).is_empty());
        }
    }
}
