pub mod assistant;
pub mod config;
pub mod domain;
pub mod errors;
pub mod grading;
pub mod ingest;
pub mod progression;
pub mod protocol;
pub mod report;
pub mod routes;
pub mod selector;
pub mod session;
pub mod telemetry;
pub mod usage;
pub mod util;

#[cfg(test)]
mod tests {
    mod quiz_flow_test;
}

pub use domain::{Question, QuestionPool, ReviewRecord, BATCH_SIZE, TIME_LIMIT_SECS};
pub use errors::{ApiError, IngestError};
pub use progression::{Stage, Tier};
pub use routes::build_router;
pub use session::AppState;
