//! Upload ingestion: delimiter probing for tabular text and the schema
//! normalizer that maps arbitrary column-name variants onto the canonical
//! question schema.
//!
//! The normalizer never mutates the caller's table: it consumes the raw rows
//! and builds a fresh pool. Unknown columns are ignored, missing canonical
//! columns get fixed defaults, and rows always come out fully populated.

use tracing::{info, instrument, warn};

use crate::domain::{Question, QuestionPool};
use crate::errors::IngestError;
use crate::util::coerce_id;

/// Delimiters probed in order; the first that yields more than one header
/// column wins.
const DELIMITER_CANDIDATES: [char; 4] = [';', ',', '\t', '|'];

/// Ordered alias table: for each canonical field, the accepted column-name
/// variants, compared lowercased and trimmed. First match wins.
const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    (
        "question_text",
        &["question_text", "questiontext", "question text", "question", "ques", "q"],
    ),
    (
        "option_a",
        &["optiona", "option a", "a", "a)", "ans_a", "answer_a", "opt1", "option_a"],
    ),
    (
        "option_b",
        &["optionb", "option b", "b", "b)", "ans_b", "answer_b", "opt2", "option_b"],
    ),
    (
        "option_c",
        &["optionc", "option c", "c", "c)", "ans_c", "answer_c", "opt3", "option_c"],
    ),
    (
        "option_d",
        &["optiond", "option d", "d", "d)", "ans_d", "answer_d", "opt4", "option_d"],
    ),
    (
        "answer",
        &["answer", "ans", "solution", "correct answer", "correct", "answer key"],
    ),
    ("topic", &["topic", "subject", "category", "chapter"]),
    (
        "subtopic",
        &["subtopic", "sub-topic", "section", "sub_section", "subchapter", "tag", "tags"],
    ),
    ("difficulty", &["difficulty", "level", "hardness"]),
];

const DEFAULT_QUESTION_TEXT: &str = "No question text";
const DEFAULT_ANSWER: &str = "a";
const DEFAULT_TOPIC: &str = "N/A";
const DEFAULT_SUBTOPIC: &str = "N/A";
const DEFAULT_DIFFICULTY: &str = "Very easy";

/// Raw rows-by-named-columns structure handed over by the upload boundary.
#[derive(Clone, Debug)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Decode an uploaded file body as UTF-8 text.
pub fn decode_upload(bytes: &[u8]) -> Result<String, IngestError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| IngestError::Unreadable(e.to_string()))
}

/// Split delimited text into a header + rows, probing delimiter candidates
/// in order. Rows are padded or truncated to the header width; empty lines
/// are skipped. This is a thin parser: quoted fields are out of scope.
#[instrument(level = "debug", skip(text), fields(text_len = text.len()))]
pub fn parse_delimited(text: &str) -> Result<RawTable, IngestError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| IngestError::Unreadable("empty file".into()))?;

    let delimiter = DELIMITER_CANDIDATES
        .iter()
        .copied()
        .find(|d| header.split(*d).count() > 1)
        .ok_or(IngestError::UndeterminedDelimiter)?;

    let columns: Vec<String> = header
        .split(delimiter)
        .map(|c| c.trim().to_string())
        .collect();
    let width = columns.len();

    let rows: Vec<Vec<String>> = lines
        .map(|line| {
            let mut cells: Vec<String> = line
                .split(delimiter)
                .map(|c| c.trim().to_string())
                .collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();

    Ok(RawTable { columns, rows })
}

/// Map the raw table onto the canonical question schema and build the pool.
#[instrument(level = "info", skip(raw), fields(rows = raw.rows.len(), cols = raw.columns.len()))]
pub fn normalize(raw: RawTable) -> QuestionPool {
    let headers: Vec<String> = raw
        .columns
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();

    let find_column = |canonical: &str| -> Option<usize> {
        let (_, aliases) = COLUMN_ALIASES
            .iter()
            .find(|(name, _)| *name == canonical)?;
        aliases
            .iter()
            .find_map(|alias| headers.iter().position(|h| h == alias))
    };

    let col_question = find_column("question_text");
    let col_a = find_column("option_a");
    let col_b = find_column("option_b");
    let col_c = find_column("option_c");
    let col_d = find_column("option_d");
    let col_answer = find_column("answer");
    let col_topic = find_column("topic");
    let col_subtopic = find_column("subtopic");
    let col_difficulty = find_column("difficulty");
    let col_id = headers.iter().position(|h| h == "id");

    let cell = |row: &[String], col: Option<usize>, default: &str| -> String {
        match col.and_then(|idx| row.get(idx)) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => default.to_string(),
        }
    };

    // Ids come from an explicit column when every cell coerces cleanly,
    // otherwise they are synthesized sequentially in row order.
    let ids: Vec<u32> = match col_id {
        Some(idx) => {
            let parsed: Option<Vec<u32>> = raw
                .rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).and_then(coerce_id))
                .collect();
            match parsed {
                Some(ids) => ids,
                None => {
                    warn!(target: "quiz", "Unparseable id column; synthesizing sequential ids");
                    (1..=raw.rows.len() as u32).collect()
                }
            }
        }
        None => (1..=raw.rows.len() as u32).collect(),
    };

    let questions: Vec<Question> = raw
        .rows
        .iter()
        .zip(ids)
        .map(|(row, id)| Question {
            id,
            question_text: cell(row, col_question, DEFAULT_QUESTION_TEXT),
            option_a: cell(row, col_a, ""),
            option_b: cell(row, col_b, ""),
            option_c: cell(row, col_c, ""),
            option_d: cell(row, col_d, ""),
            answer: cell(row, col_answer, DEFAULT_ANSWER),
            topic: cell(row, col_topic, DEFAULT_TOPIC),
            subtopic: cell(row, col_subtopic, DEFAULT_SUBTOPIC),
            difficulty: cell(row, col_difficulty, DEFAULT_DIFFICULTY),
        })
        .collect();

    info!(target: "quiz", questions = questions.len(), "Question bank normalized");
    QuestionPool::new(questions)
}
