//! HTTP endpoint handlers. These are thin wrappers that forward to the
//! session/logic layer. Each handler is instrumented and logs parameters and
//! basic result info; failures map through `ApiError`.

use std::sync::Arc;

use axum::{extract::{Multipart, State}, response::IntoResponse, Json};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, instrument};

use crate::domain::TIME_LIMIT_SECS;
use crate::errors::ApiError;
use crate::ingest::{decode_upload, normalize, parse_delimited};
use crate::protocol::*;
use crate::report::generate_report;
use crate::session::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

/// Ingest a question bank upload (multipart field "file") and open a new
/// quiz session with its first batch.
#[instrument(level = "info", skip(state, multipart))]
pub async fn http_post_upload(
  State(state): State<Arc<AppState>>,
  mut multipart: Multipart,
) -> Result<Json<UploadOut>, ApiError> {
  let mut file_bytes = None;
  let mut file_name = String::new();
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::Validation(format!("Malformed upload: {e}")))?
  {
    if field.name() == Some("file") {
      file_name = field.file_name().unwrap_or("upload").to_string();
      let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::Ingest(format!("Failed to read file: {e}")))?;
      file_bytes = Some(bytes);
    }
  }
  let bytes = file_bytes.ok_or_else(|| ApiError::Validation("No file uploaded".into()))?;

  let text = decode_upload(&bytes)?;
  let table = parse_delimited(&text)?;
  let pool = normalize(table);

  let mut rng = StdRng::from_entropy();
  let (session_id, batch) = state.create_session(pool, &mut rng).await;
  info!(target: "quiz", %session_id, %file_name, batch = batch.len(), "Upload ingested");

  Ok(Json(UploadOut {
    message: "Dataset uploaded successfully!".into(),
    session_id,
    time_limit: TIME_LIMIT_SECS,
    questions: to_out_batch(&batch),
  }))
}

/// Grade a submitted batch, advance the ladder on a perfect score, and hand
/// back the next batch (unless the ladder completed).
#[instrument(level = "info", skip(state, body), fields(session_id = %body.session_id, submitted = body.answers.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SubmitIn>,
) -> Result<Json<SubmitOut>, ApiError> {
  let mut rng = StdRng::from_entropy();
  let outcome = state
    .submit(&body.session_id, &body.answers, &body.time_logs, &mut rng)
    .await?;
  info!(target: "quiz", session_id = %body.session_id, score = outcome.score, "Submission evaluated");
  Ok(Json(SubmitOut::from_outcome(outcome)))
}

/// Render the performance report from the caller's review records.
#[instrument(level = "info", skip(state, body), fields(solutions = body.solutions.len(), student = %body.student_name))]
pub async fn http_post_report(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ReportIn>,
) -> Result<Json<ReportOut>, ApiError> {
  if body.solutions.is_empty() {
    return Err(ApiError::Validation("No solutions provided for report".into()));
  }

  let path = generate_report(&state.reports_dir, &body.solutions, &body.student_name, &state.prompts)
    .map_err(|e| {
      tracing::error!(target: "quiz", error = %e, "Report generation failed");
      ApiError::Internal("Failed to generate report".into())
    })?;

  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  Ok(Json(ReportOut {
    message: "Report generated".into(),
    report_path: path.display().to_string(),
    report_url: format!("/reports/{file_name}"),
  }))
}

/// Free-text assistant chat, decoupled from quiz state.
#[instrument(level = "info", skip(state, body), fields(message_len = body.message.len()))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatIn>,
) -> Result<Json<ChatOut>, ApiError> {
  if body.message.trim().is_empty() {
    return Err(ApiError::Validation("Message required".into()));
  }
  let assistant = state
    .assistant
    .as_ref()
    .ok_or_else(|| ApiError::Assistant("Assistant not configured".into()))?;
  let reply = assistant
    .reply(&state.prompts, &body.message)
    .await
    .map_err(ApiError::Assistant)?;
  Ok(Json(ChatOut { reply }))
}
