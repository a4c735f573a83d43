// SPDX-License-Identifier: MIT

//! Input validation, member resolution and PR bookkeeping on the log path.

mod common;

use common::{days_ago, test_state};
use lift_carousel::db::RecordStore;
use lift_carousel::error::AppError;
use lift_carousel::models::{CycleState, LogSetInput, Member};

fn set(exercise: &str, estimated_1rm: f64) -> LogSetInput {
    LogSetInput {
        exercise: exercise.to_string(),
        weight: estimated_1rm,
        reps: 5,
        estimated_1rm,
        source: None,
    }
}

#[tokio::test]
async fn test_empty_exercise_is_rejected() {
    let (state, store) = test_state();

    let err = state.log_set("u1", set("", 100.0)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.code(), "bad_request");
    // Nothing was stored.
    assert!(store.lift_records("u1", None, None).unwrap().is_empty());
}

#[tokio::test]
async fn test_zero_reps_is_rejected() {
    let (state, _store) = test_state();
    let mut input = set("bench press", 100.0);
    input.reps = 0;
    assert!(state.log_set("u1", input).await.is_err());
}

#[tokio::test]
async fn test_source_defaults_to_dashboard() {
    let (state, store) = test_state();
    state.log_set("u1", set("bench press", 100.0)).await.unwrap();

    let records = store.lift_records("u1", None, None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "dashboard");
}

#[tokio::test]
async fn test_new_best_bumps_the_cycle_pr_counter() {
    let (state, store) = test_state();
    store
        .put_cycle_state(CycleState::new("u1", days_ago(3)))
        .unwrap();

    state.log_set("u1", set("bench press", 100.0)).await.unwrap();
    assert_eq!(
        store.cycle_state("u1").unwrap().unwrap().total_prs_this_cycle,
        1
    );

    // Not a best; the counter holds.
    state.log_set("u1", set("bench press", 90.0)).await.unwrap();
    assert_eq!(
        store.cycle_state("u1").unwrap().unwrap().total_prs_this_cycle,
        1
    );
}

#[tokio::test]
async fn test_member_resolution() {
    let (state, store) = test_state();
    store.upsert_member(Member {
        user_id: "u1".to_string(),
        unique_code: "ABC123".to_string(),
        display_name: "Test Member".to_string(),
    });

    let member = state.resolve_member("ABC123").unwrap();
    assert_eq!(member.user_id, "u1");

    let err = state.resolve_member("NOPE").unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.code(), "not_found");
}
