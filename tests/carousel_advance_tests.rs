// SPDX-License-Identifier: MIT

//! Advance path: completion counting, deload entry and the cycle reset.

mod common;

use common::{seed_plan, test_state};
use lift_carousel::error::AppError;

#[tokio::test]
async fn test_advance_without_plan_is_rejected() {
    let (state, _store) = test_state();

    let err = state.advance("u1", "manual").await.unwrap_err();
    assert!(matches!(err, AppError::NoWorkoutsConfigured));
}

#[tokio::test]
async fn test_single_advance_completes_current_letter() {
    let (state, store) = test_state();
    seed_plan(&store, "u1", &[("A", &["bench press"]), ("B", &["squat"])]);

    let outcome = state.advance("u1", "manual").await.unwrap();

    assert_eq!(outcome.completed_letter, "A");
    assert!(!outcome.entered_deload);
    assert!(!outcome.cycle_reset);
    assert_eq!(outcome.carousel.current_position, 1);
    assert_eq!(outcome.carousel.current_letter, "B");
    assert_eq!(outcome.carousel.completions["A"], 1);
    assert_eq!(outcome.carousel.completions["B"], 0);
    assert_eq!(outcome.carousel.cycle_number, 1);
}

#[tokio::test]
async fn test_deload_entered_when_every_letter_hits_target() {
    let (state, store) = test_state();
    seed_plan(&store, "u1", &[("A", &["bench press"]), ("B", &["squat"])]);

    // 6 passes of each of the 2 letters.
    for i in 0..11 {
        let outcome = state.advance("u1", "auto").await.unwrap();
        assert!(!outcome.entered_deload, "premature deload at advance {}", i + 1);
    }
    let outcome = state.advance("u1", "auto").await.unwrap();

    assert!(outcome.entered_deload);
    assert!(!outcome.cycle_reset);
    assert!(outcome.carousel.deload_mode);
    assert_eq!(outcome.carousel.current_position, 12);
    assert_eq!(outcome.carousel.current_letter, "A");
    // Counters now track deload passes and start over.
    assert_eq!(outcome.carousel.completions["A"], 0);
    assert_eq!(outcome.carousel.completions["B"], 0);
    assert_eq!(outcome.carousel.cycle_number, 1);
}

#[tokio::test]
async fn test_cycle_resets_after_full_deload_pass() {
    let (state, store) = test_state();
    seed_plan(&store, "u1", &[("A", &["bench press"]), ("B", &["squat"])]);

    for _ in 0..12 {
        state.advance("u1", "auto").await.unwrap();
    }

    // One lighter pass of each letter.
    let outcome = state.advance("u1", "auto").await.unwrap();
    assert!(!outcome.cycle_reset);
    assert!(outcome.carousel.deload_mode);
    assert_eq!(outcome.carousel.completions["A"], 1);

    let outcome = state.advance("u1", "auto").await.unwrap();
    assert!(outcome.cycle_reset);
    assert!(!outcome.entered_deload);
    assert!(!outcome.carousel.deload_mode);
    assert_eq!(outcome.carousel.cycle_number, 2);
    // The rotation restarts at the first letter.
    assert_eq!(outcome.carousel.current_position, 0);
    assert_eq!(outcome.carousel.current_letter, "A");
    assert_eq!(outcome.carousel.completions["A"], 0);
    assert_eq!(outcome.carousel.completions["B"], 0);
}

#[tokio::test]
async fn test_visible_window_grows_with_position() {
    let (state, store) = test_state();
    seed_plan(
        &store,
        "u1",
        &[("A", &["bench press"]), ("B", &["squat"]), ("C", &["row"])],
    );

    let view = state.carousel_state("u1").await.unwrap().unwrap();
    assert_eq!(view.visible_workouts.len(), 1);
    assert_eq!(view.visible_workouts[0].role, "current");

    state.advance("u1", "auto").await.unwrap();
    let view = state.carousel_state("u1").await.unwrap().unwrap();
    assert_eq!(view.visible_workouts.len(), 2);

    state.advance("u1", "auto").await.unwrap();
    let view = state.carousel_state("u1").await.unwrap().unwrap();
    let roles: Vec<&str> = view.visible_workouts.iter().map(|v| v.role).collect();
    assert_eq!(roles, vec!["current", "prev1", "prev2"]);
    assert_eq!(view.visible_workouts[0].letter, "C");
    assert_eq!(view.visible_workouts[1].letter, "B");
    assert_eq!(view.visible_workouts[2].letter, "A");
}

#[tokio::test]
async fn test_carousel_state_without_plan_is_none() {
    let (state, _store) = test_state();
    assert!(state.carousel_state("u1").await.unwrap().is_none());
}
