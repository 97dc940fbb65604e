//! Public request/response structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Question, ReviewRecord};
use crate::session::{SubmitOutcome, SubmitResult};

/// Question DTO served to clients. The canonical answer never leaves the
/// server; grading happens here.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub id: u32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub topic: String,
    pub subtopic: String,
    pub difficulty: String,
}

/// Convert the internal `Question` to the public DTO.
pub fn to_out(q: &Question) -> QuestionOut {
    QuestionOut {
        id: q.id,
        question_text: q.question_text.clone(),
        option_a: q.option_a.clone(),
        option_b: q.option_b.clone(),
        option_c: q.option_c.clone(),
        option_d: q.option_d.clone(),
        topic: q.topic.clone(),
        subtopic: q.subtopic.clone(),
        difficulty: q.difficulty.clone(),
    }
}

pub fn to_out_batch(questions: &[Question]) -> Vec<QuestionOut> {
    questions.iter().map(to_out).collect()
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct UploadOut {
    pub message: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub time_limit: u64,
    pub questions: Vec<QuestionOut>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub answers: HashMap<String, String>,
    #[serde(default)]
    pub time_logs: HashMap<String, f64>,
}

#[derive(Serialize)]
pub struct SubmitOut {
    pub result: &'static str,
    pub message: String,
    pub score: usize,
    pub solutions: Vec<ReviewRecord>,
    pub average_time: f64,
    pub max_time_question: Option<String>,
    pub max_time_value: f64,
    pub elapsed_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionOut>>,
}

impl SubmitOut {
    pub fn from_outcome(outcome: SubmitOutcome) -> Self {
        let score = outcome.score;
        let base = |result, message, next_level, questions| SubmitOut {
            result,
            message,
            score,
            solutions: outcome.solutions.clone(),
            average_time: outcome.average_time,
            max_time_question: outcome.max_time_question.clone(),
            max_time_value: outcome.max_time_value,
            elapsed_time: outcome.elapsed_time,
            next_level,
            questions,
        };
        match &outcome.result {
            SubmitResult::Completed => base(
                "completed",
                "Congratulations! You mastered all levels!".into(),
                None,
                None,
            ),
            SubmitResult::Success {
                next_level,
                questions,
            } => base(
                "success",
                format!("Perfect score! Advancing to {next_level} level."),
                Some(next_level.to_string()),
                Some(to_out_batch(questions)),
            ),
            SubmitResult::Fail { questions } => base(
                "fail",
                format!("You got {score}/10 correct. Try again!"),
                None,
                Some(to_out_batch(questions)),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportIn {
    pub solutions: Vec<ReviewRecord>,
    #[serde(default = "default_student_name")]
    pub student_name: String,
}

fn default_student_name() -> String {
    "Student".into()
}

#[derive(Serialize)]
pub struct ReportOut {
    pub message: String,
    pub report_path: String,
    pub report_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatIn {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatOut {
    pub reply: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Uniform error body for every failure response.
#[derive(Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}
