// SPDX-License-Identifier: MIT

//! Wire shape of the serialized view types the embedding layer returns.

mod common;

use common::{seed_plan, test_state};
use lift_carousel::models::{CycleMode, LetterProgress, LogSetInput};

#[tokio::test]
async fn test_carousel_view_wire_shape() {
    let (state, store) = test_state();
    seed_plan(&store, "u1", &[("A", &["bench press"]), ("B", &["squat"])]);
    state.advance("u1", "manual").await.unwrap();

    let view = state.carousel_state("u1").await.unwrap().unwrap();
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["current_position"], 1);
    assert_eq!(json["current_letter"], "B");
    assert_eq!(json["deload_mode"], false);
    assert_eq!(json["cycle_number"], 1);
    assert_eq!(json["completions"]["A"], 1);
    assert_eq!(json["visible_workouts"][0]["role"], "current");
    // Timestamps render as RFC3339 with a Z suffix.
    let started = json["position_started_at"].as_str().unwrap();
    assert!(started.ends_with('Z'), "unexpected timestamp format: {started}");
}

#[tokio::test]
async fn test_reframe_kind_serializes_as_snake_case_tag() {
    let (state, _store) = test_state();

    // Build charge and release it so the update carries a reframe.
    state
        .log_set(
            "u1",
            LogSetInput {
                exercise: "bench press".to_string(),
                weight: 100.0,
                reps: 1,
                estimated_1rm: 100.0,
                source: None,
            },
        )
        .await
        .unwrap();
    for _ in 0..7 {
        state
            .log_set(
                "u1",
                LogSetInput {
                    exercise: "bench press".to_string(),
                    weight: 90.0,
                    reps: 1,
                    estimated_1rm: 90.0,
                    source: None,
                },
            )
            .await
            .unwrap();
    }
    let update = state
        .log_set(
            "u1",
            LogSetInput {
                exercise: "bench press".to_string(),
                weight: 120.0,
                reps: 1,
                estimated_1rm: 120.0,
                source: None,
            },
        )
        .await
        .unwrap();

    let json = serde_json::to_value(&update).unwrap();
    assert_eq!(json["charge_up_released"], true);
    assert_eq!(json["reframe"]["kind"], "pressure_released");
    assert_eq!(json["reframe"]["exercise"], "bench press");
}

#[test]
fn test_letter_progress_is_a_tagged_union_on_the_wire() {
    let counted = LetterProgress::Normal { count: 3 };
    let json = serde_json::to_value(counted).unwrap();
    assert_eq!(json["phase"], "normal");
    assert_eq!(json["count"], 3);

    let done = LetterProgress::Deload { done: true };
    let json = serde_json::to_value(done).unwrap();
    assert_eq!(json["phase"], "deload");
    assert_eq!(json["done"], true);

    let mode = serde_json::to_value(CycleMode::Deload).unwrap();
    assert_eq!(mode, "deload");
}
