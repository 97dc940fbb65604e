//! Application state and quiz sessions.
//!
//! Each upload creates a `QuizSession` that exclusively owns its question
//! pool, usage tracker, ladder stage, and timing log. Sessions live in an
//! in-memory store keyed by id, so independent clients can run quizzes
//! concurrently; a session dies when it expires or the store is dropped.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use rand::Rng;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::assistant::Assistant;
use crate::config::{load_app_config_from_env, AppConfig, Prompts};
use crate::domain::{Question, QuestionPool, ReviewRecord, BATCH_SIZE, TIME_LIMIT_SECS};
use crate::errors::ApiError;
use crate::grading::grade;
use crate::progression::Stage;
use crate::selector::select_batch;
use crate::usage::UsageTracker;
use crate::util::coerce_id;

/// One client's quiz run over one uploaded pool.
#[derive(Debug)]
pub struct QuizSession {
    pub pool: QuestionPool,
    pub usage: UsageTracker,
    pub stage: Stage,
    pub started: SystemTime,
    /// Per-question elapsed seconds, merged in from each submission.
    pub time_logs: HashMap<u32, f64>,
}

impl QuizSession {
    pub fn new(pool: QuestionPool) -> Self {
        Self {
            pool,
            usage: UsageTracker::new(),
            stage: Stage::start(),
            started: SystemTime::now(),
            time_logs: HashMap::new(),
        }
    }

    /// Seconds since the session started. Clock skew reads as zero.
    pub fn elapsed_secs(&self) -> f64 {
        self.started
            .elapsed()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn expired(&self) -> bool {
        self.elapsed_secs() > TIME_LIMIT_SECS as f64
    }

    /// Next batch at the current tier, recycling the tier's used-set when
    /// fewer unused questions remain than one batch needs.
    pub fn next_batch<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Question> {
        let Stage::Tier(tier) = self.stage else {
            return Vec::new();
        };
        let tier_total = self.pool.tier_count(tier);
        if self.usage.exhausted(tier, tier_total, BATCH_SIZE) {
            self.usage.reset(tier);
        }
        select_batch(&self.pool, tier, self.usage.used_mut(tier), BATCH_SIZE, rng)
    }

    fn record_times(&mut self, time_logs: &HashMap<String, f64>) {
        for (raw_id, seconds) in time_logs {
            if let Some(id) = coerce_id(raw_id) {
                self.time_logs.insert(id, *seconds);
            }
        }
    }
}

/// How one submission resolved the ladder.
#[derive(Clone, Debug)]
pub enum SubmitResult {
    /// Perfect score below the top tier: the ladder moved.
    Success {
        next_level: &'static str,
        questions: Vec<Question>,
    },
    /// Anything short of perfect: same tier, fresh batch.
    Fail { questions: Vec<Question> },
    /// Perfect score on the top tier: the ladder is done.
    Completed,
}

/// Everything the submit endpoint reports back.
#[derive(Clone, Debug)]
pub struct SubmitOutcome {
    pub result: SubmitResult,
    pub score: usize,
    pub solutions: Vec<ReviewRecord>,
    pub average_time: f64,
    pub max_time_question: Option<String>,
    pub max_time_value: f64,
    pub elapsed_time: f64,
}

/// Shared application state: the session store, assistant client, prompts,
/// and the report output directory.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, QuizSession>>>,
    pub assistant: Option<Assistant>,
    pub prompts: Prompts,
    pub reports_dir: PathBuf,
}

impl AppState {
    /// Build state from env: load config, init the optional assistant.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();
        Self::with_config(cfg, Assistant::from_env())
    }

    pub fn with_config(cfg: AppConfig, assistant: Option<Assistant>) -> Self {
        match &assistant {
            Some(a) => {
                info!(target: "adaptiq_backend", base_url = %a.base_url, model = %a.model, "Assistant enabled.")
            }
            None => {
                info!(target: "adaptiq_backend", "Assistant disabled (no OPENAI_API_KEY). Chat endpoint will refuse.")
            }
        }
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            assistant,
            prompts: cfg.prompts,
            reports_dir: PathBuf::from(cfg.reports.output_dir),
        }
    }

    /// Register a freshly ingested pool: new session at the bottom tier with
    /// its first batch already selected. Expired sessions are swept here so
    /// the store does not grow without bound.
    #[instrument(level = "info", skip(self, pool, rng), fields(pool_size = pool.len()))]
    pub async fn create_session<R: Rng + ?Sized>(
        &self,
        pool: QuestionPool,
        rng: &mut R,
    ) -> (String, Vec<Question>) {
        let mut sessions = self.sessions.write().await;
        let stale_before = sessions.len();
        sessions.retain(|_, s| !s.expired());
        let swept = stale_before - sessions.len();
        if swept > 0 {
            info!(target: "quiz", swept, "Swept expired sessions");
        }

        let mut session = QuizSession::new(pool);
        let batch = session.next_batch(rng);
        let session_id = Uuid::new_v4().to_string();
        info!(
            target: "quiz",
            %session_id,
            pool_size = session.pool.len(),
            first_batch = batch.len(),
            "Session created"
        );
        sessions.insert(session_id.clone(), session);
        (session_id, batch)
    }

    /// Grade a submitted batch and drive the ladder.
    #[instrument(level = "info", skip(self, answers, time_logs, rng), fields(%session_id, submitted = answers.len()))]
    pub async fn submit<R: Rng + ?Sized>(
        &self,
        session_id: &str,
        answers: &HashMap<String, String>,
        time_logs: &HashMap<String, f64>,
        rng: &mut R,
    ) -> Result<SubmitOutcome, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ApiError::NotFound(format!("Unknown session: {session_id}")))?;

        if session.expired() {
            warn!(target: "quiz", %session_id, elapsed = session.elapsed_secs(), "Submission after time budget");
            return Err(ApiError::Timeout(
                "Test time exceeded 1 hour. Auto-submitted.".into(),
            ));
        }
        if session.stage == Stage::Completed {
            return Err(ApiError::Validation(
                "All levels already completed. Upload a new question bank to start again.".into(),
            ));
        }
        if answers.is_empty() {
            return Err(ApiError::Validation("No answers submitted".into()));
        }

        let graded = grade(&session.pool, answers, time_logs);
        session.record_times(time_logs);
        let elapsed_time = crate::util::round2(session.elapsed_secs());

        let result = if session.stage.advance(graded.correct_count, BATCH_SIZE) {
            match session.stage {
                Stage::Completed => {
                    info!(target: "quiz", %session_id, "Ladder completed");
                    SubmitResult::Completed
                }
                Stage::Tier(tier) => {
                    let questions = session.next_batch(rng);
                    info!(target: "quiz", %session_id, next_level = tier.label(), batch = questions.len(), "Tier advanced");
                    SubmitResult::Success {
                        next_level: tier.label(),
                        questions,
                    }
                }
            }
        } else {
            let questions = session.next_batch(rng);
            info!(target: "quiz", %session_id, score = graded.correct_count, batch = questions.len(), "Tier retry");
            SubmitResult::Fail { questions }
        };

        Ok(SubmitOutcome {
            result,
            score: graded.correct_count,
            solutions: graded.solutions,
            average_time: graded.average_time,
            max_time_question: graded.max_time_question,
            max_time_value: graded.max_time_value,
            elapsed_time,
        })
    }

    /// Current tier of a session, mainly for flow tests and diagnostics.
    pub async fn session_stage(&self, session_id: &str) -> Option<Stage> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| s.stage)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(AppConfig::default(), None)
    }
}
