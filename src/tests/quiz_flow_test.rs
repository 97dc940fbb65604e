//! End-to-end quiz flows at the logic level: upload a pool, take batches,
//! submit, and walk the difficulty ladder. Deterministic via seeded RNG.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::{Question, QuestionPool, BATCH_SIZE, TIME_LIMIT_SECS};
use crate::errors::ApiError;
use crate::ingest::{normalize, parse_delimited};
use crate::progression::{Stage, Tier};
use crate::session::{AppState, SubmitResult};

fn question(id: u32, topic: &str, difficulty: &str) -> Question {
    Question {
        id,
        question_text: format!("q{id}"),
        option_a: "1".into(),
        option_b: "2".into(),
        option_c: "3".into(),
        option_d: "4".into(),
        answer: "a".into(),
        topic: topic.into(),
        subtopic: "core".into(),
        difficulty: difficulty.into(),
    }
}

/// Pool with `per_tier` questions for every ladder tier, all answering "a".
fn ladder_pool(per_tier: u32) -> QuestionPool {
    let mut questions = Vec::new();
    let mut id = 0;
    for tier in Tier::ORDER {
        for _ in 0..per_tier {
            id += 1;
            questions.push(question(id, "General", tier.label()));
        }
    }
    QuestionPool::new(questions)
}

fn perfect_answers(batch: &[Question]) -> HashMap<String, String> {
    batch
        .iter()
        .map(|q| (q.id.to_string(), " A ".to_string()))
        .collect()
}

#[tokio::test]
async fn perfect_scores_climb_to_completion() {
    let state = AppState::default();
    let mut rng = StdRng::seed_from_u64(9);

    let (session_id, first_batch) = state.create_session(ladder_pool(10), &mut rng).await;
    assert_eq!(first_batch.len(), BATCH_SIZE);
    assert!(first_batch.iter().all(|q| q.difficulty == "Very easy"));

    // Three perfect rounds move Very easy -> Easy -> Moderate -> Difficult.
    let mut batch = first_batch;
    for expected_next in ["Easy", "Moderate", "Difficult"] {
        let outcome = state
            .submit(&session_id, &perfect_answers(&batch), &HashMap::new(), &mut rng)
            .await
            .unwrap();
        assert_eq!(outcome.score, BATCH_SIZE);
        match outcome.result {
            SubmitResult::Success {
                next_level,
                questions,
            } => {
                assert_eq!(next_level, expected_next);
                assert_eq!(questions.len(), BATCH_SIZE);
                assert!(questions.iter().all(|q| q.difficulty == expected_next));
                batch = questions;
            }
            other => panic!("expected advancement, got {other:?}"),
        }
    }

    // Perfect on Difficult finishes the ladder.
    let outcome = state
        .submit(&session_id, &perfect_answers(&batch), &HashMap::new(), &mut rng)
        .await
        .unwrap();
    assert!(matches!(outcome.result, SubmitResult::Completed));
    assert_eq!(state.session_stage(&session_id).await, Some(Stage::Completed));

    // The ladder is terminal: another submission is rejected.
    let err = state
        .submit(&session_id, &perfect_answers(&batch), &HashMap::new(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn near_perfect_stays_on_tier_with_fresh_questions() {
    let state = AppState::default();
    let mut rng = StdRng::seed_from_u64(3);

    let pool = QuestionPool::new((1..=30).map(|id| question(id, "General", "Very easy")).collect());
    let (session_id, batch) = state.create_session(pool, &mut rng).await;

    // 9 of 10 correct: strict gate holds the tier.
    let mut answers = perfect_answers(&batch);
    answers.insert(batch[0].id.to_string(), "wrong".into());

    let outcome = state
        .submit(&session_id, &answers, &HashMap::new(), &mut rng)
        .await
        .unwrap();
    assert_eq!(outcome.score, 9);
    assert_eq!(
        state.session_stage(&session_id).await,
        Some(Stage::Tier(Tier::VeryEasy))
    );

    let SubmitResult::Fail { questions } = outcome.result else {
        panic!("expected fail result");
    };
    assert_eq!(questions.len(), BATCH_SIZE);

    // The retry batch never repeats the ids just served.
    let served: Vec<u32> = batch.iter().map(|q| q.id).collect();
    assert!(questions.iter().all(|q| !served.contains(&q.id)));
}

#[tokio::test]
async fn failed_rounds_recycle_an_exhausted_tier() {
    let state = AppState::default();
    let mut rng = StdRng::seed_from_u64(5);

    let pool = QuestionPool::new((1..=12).map(|id| question(id, "General", "Very easy")).collect());
    let (session_id, mut batch) = state.create_session(pool, &mut rng).await;

    // Keep failing; every round must still produce a full batch even though
    // only 12 questions exist, because the used-set resets on exhaustion.
    for _ in 0..4 {
        let mut answers = perfect_answers(&batch);
        answers.insert(batch[0].id.to_string(), "wrong".into());
        let outcome = state
            .submit(&session_id, &answers, &HashMap::new(), &mut rng)
            .await
            .unwrap();
        let SubmitResult::Fail { questions } = outcome.result else {
            panic!("expected fail result");
        };
        assert_eq!(questions.len(), BATCH_SIZE);
        batch = questions;
    }
}

#[tokio::test]
async fn expired_session_rejects_submission_without_grading() {
    let state = AppState::default();
    let mut rng = StdRng::seed_from_u64(11);

    let (session_id, batch) = state.create_session(ladder_pool(10), &mut rng).await;
    {
        let mut sessions = state.sessions.write().await;
        sessions.get_mut(&session_id).unwrap().started =
            SystemTime::now() - Duration::from_secs(TIME_LIMIT_SECS + 1);
    }

    let err = state
        .submit(&session_id, &perfect_answers(&batch), &HashMap::new(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout(_)));

    // Session state is preserved, not torn down.
    assert_eq!(
        state.session_stage(&session_id).await,
        Some(Stage::Tier(Tier::VeryEasy))
    );
}

#[tokio::test]
async fn empty_submission_is_a_validation_error() {
    let state = AppState::default();
    let mut rng = StdRng::seed_from_u64(13);

    let (session_id, _) = state.create_session(ladder_pool(10), &mut rng).await;
    let err = state
        .submit(&session_id, &HashMap::new(), &HashMap::new(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn ingested_csv_drives_a_full_round() {
    let state = AppState::default();
    let mut rng = StdRng::seed_from_u64(17);

    // 10 "Very easy" rows across three topics sized 5/3/2; answers all "c".
    let mut csv = String::from("question;option_a;option_b;option_c;option_d;answer;topic;subtopic;difficulty\n");
    for i in 0..10 {
        let topic = if i < 5 {
            "Algebra"
        } else if i < 8 {
            "Geometry"
        } else {
            "Numbers"
        };
        csv.push_str(&format!("Q{i};w;x;y;z;c;{topic};basics;Very easy\n"));
    }
    let pool = normalize(parse_delimited(&csv).unwrap());
    assert_eq!(pool.len(), 10);

    let (session_id, batch) = state.create_session(pool, &mut rng).await;
    assert_eq!(batch.len(), BATCH_SIZE);

    // Proportional shares with no remainder: 5/3/2 across the topics.
    let count = |topic: &str| batch.iter().filter(|q| q.topic == topic).count();
    assert_eq!(count("Algebra"), 5);
    assert_eq!(count("Geometry"), 3);
    assert_eq!(count("Numbers"), 2);

    let answers: HashMap<String, String> = batch
        .iter()
        .map(|q| (q.id.to_string(), "C".to_string()))
        .collect();
    let time_logs: HashMap<String, f64> = batch
        .iter()
        .enumerate()
        .map(|(i, q)| (q.id.to_string(), (i + 1) as f64))
        .collect();

    let outcome = state
        .submit(&session_id, &answers, &time_logs, &mut rng)
        .await
        .unwrap();
    assert_eq!(outcome.score, BATCH_SIZE);
    assert_eq!(outcome.average_time, 5.5);
    assert_eq!(outcome.max_time_value, 10.0);
    assert_eq!(outcome.solutions.len(), BATCH_SIZE);
    assert!(outcome.solutions.iter().all(|s| s.is_correct));

    // Only a single tier exists, so a perfect round advances to Easy and the
    // next batch is empty.
    match outcome.result {
        SubmitResult::Success {
            next_level,
            questions,
        } => {
            assert_eq!(next_level, "Easy");
            assert!(questions.is_empty());
        }
        other => panic!("expected advancement, got {other:?}"),
    }
}
