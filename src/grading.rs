//! Grading: compare submitted options against canonical answers and compute
//! aggregate statistics for the batch.
//!
//! Malformed entries (unparseable or unknown question ids) are dropped from
//! scoring rather than reported; this lenient contract is deliberate.
//! Entries are processed in ascending question-id order so grading is
//! deterministic and the slowest-question tie rule is well defined.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::{QuestionPool, ReviewRecord};
use crate::util::{coerce_id, round2};

/// Aggregate result of grading one submitted batch.
#[derive(Clone, Debug, Default)]
pub struct GradeOutcome {
    pub correct_count: usize,
    pub solutions: Vec<ReviewRecord>,
    /// Total time divided by the number of submitted answers (0 if none).
    pub average_time: f64,
    pub max_time_question: Option<String>,
    pub max_time_value: f64,
}

/// Grade `answers` (question id → submitted option) against the pool.
/// `time_logs` maps the same ids to elapsed seconds; missing entries count
/// as zero.
#[instrument(level = "info", skip(pool, answers, time_logs), fields(submitted = answers.len()))]
pub fn grade(
    pool: &QuestionPool,
    answers: &HashMap<String, String>,
    time_logs: &HashMap<String, f64>,
) -> GradeOutcome {
    // Coerce ids up front and grade in ascending-id order; entries that do
    // not coerce or do not resolve in the pool are skipped.
    let mut entries: Vec<(u32, &String, &String)> = answers
        .iter()
        .filter_map(|(raw_id, submitted)| coerce_id(raw_id).map(|id| (id, raw_id, submitted)))
        .collect();
    entries.sort_by_key(|(id, _, _)| *id);

    let mut outcome = GradeOutcome::default();
    let mut total_time = 0.0;
    let mut max_time = -1.0_f64;

    for (id, raw_id, submitted) in entries {
        let Some(question) = pool.get(id) else {
            debug!(target: "quiz", id, "Skipping answer for unknown question");
            continue;
        };

        let is_correct = question
            .answer
            .trim()
            .eq_ignore_ascii_case(submitted.trim());
        if is_correct {
            outcome.correct_count += 1;
        }

        let seconds = time_logs.get(raw_id).copied().unwrap_or(0.0);
        total_time += seconds;
        if seconds > max_time {
            max_time = seconds;
            outcome.max_time_question = Some(question.question_text.clone());
        }

        outcome.solutions.push(ReviewRecord {
            question: question.question_text.clone(),
            user_answer: submitted.clone(),
            correct_answer: question.answer.clone(),
            is_correct,
            time_taken: round2(seconds),
            topic: question.topic.clone(),
            subtopic: question.subtopic.clone(),
            difficulty: question.difficulty.clone(),
        });
    }

    outcome.average_time = if answers.is_empty() {
        0.0
    } else {
        round2(total_time / answers.len() as f64)
    };
    outcome.max_time_value = round2(max_time.max(0.0));

    debug!(
        target: "quiz",
        correct = outcome.correct_count,
        graded = outcome.solutions.len(),
        "Batch graded"
    );
    outcome
}
