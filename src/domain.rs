//! Domain models: normalized questions, the in-memory pool, and the
//! per-question review records consumed by the report collaborator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::progression::Tier;

/// Number of questions served per quiz batch.
pub const BATCH_SIZE: usize = 10;

/// Session time budget in seconds. Submissions after this are rejected.
pub const TIME_LIMIT_SECS: u64 = 3600;

/// One normalized question row. Ids are unique and stable for the lifetime
/// of the uploaded pool; every question belongs to exactly one
/// (topic, subtopic, difficulty) triple.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// Canonical correct option key, compared trimmed and case-insensitively.
    pub answer: String,
    pub topic: String,
    pub subtopic: String,
    /// Free-form difficulty label matched case-insensitively against tiers.
    pub difficulty: String,
}

/// Immutable collection of normalized questions owned by one session.
/// Replaced wholesale on each upload.
#[derive(Clone, Debug, Default)]
pub struct QuestionPool {
    questions: Vec<Question>,
    by_id: HashMap<u32, usize>,
}

impl QuestionPool {
    pub fn new(questions: Vec<Question>) -> Self {
        let by_id = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| (q.id, idx))
            .collect();
        Self { questions, by_id }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.by_id.get(&id).map(|idx| &self.questions[*idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Number of questions whose difficulty matches the tier.
    pub fn tier_count(&self, tier: Tier) -> usize {
        self.questions
            .iter()
            .filter(|q| tier.matches(&q.difficulty))
            .count()
    }
}

/// Per-question grading outcome. Field names are the wire format shared by
/// the submit response and the report endpoint input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub time_taken: f64,
    pub topic: String,
    pub subtopic: String,
    /// Difficulty label of the graded question. Optional on the wire so
    /// older clients can still request reports.
    #[serde(default)]
    pub difficulty: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: u32, difficulty: &str) -> Question {
        Question {
            id,
            question_text: format!("q{id}"),
            option_a: "1".into(),
            option_b: "2".into(),
            option_c: "3".into(),
            option_d: "4".into(),
            answer: "a".into(),
            topic: "T".into(),
            subtopic: "S".into(),
            difficulty: difficulty.into(),
        }
    }

    #[test]
    fn pool_lookup_by_id() {
        let pool = QuestionPool::new(vec![q(7, "Easy"), q(3, "Moderate")]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(3).unwrap().difficulty, "Moderate");
        assert!(pool.get(99).is_none());
    }

    #[test]
    fn tier_count_is_case_insensitive() {
        let pool = QuestionPool::new(vec![q(1, "easy"), q(2, "EASY"), q(3, "Difficult")]);
        assert_eq!(pool.tier_count(Tier::Easy), 2);
        assert_eq!(pool.tier_count(Tier::Difficult), 1);
        assert_eq!(pool.tier_count(Tier::VeryEasy), 0);
    }
}
