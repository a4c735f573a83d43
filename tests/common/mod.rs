// SPDX-License-Identifier: MIT

//! Shared helpers for integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use lift_carousel::config::Config;
use lift_carousel::db::{MemoryStore, RecordStore};
use lift_carousel::models::LiftRecord;
use lift_carousel::AppState;

/// App state wired to a fresh in-memory store. The returned store clone
/// shares the same maps, so tests can seed and inspect directly.
#[allow(dead_code)]
pub fn test_state() -> (AppState, MemoryStore) {
    let store = MemoryStore::default();
    let state = AppState::new(Config::default(), Arc::new(store.clone()));
    (state, store)
}

/// Seed a workout plan: one entry per rotation letter with its exercises.
#[allow(dead_code)]
pub fn seed_plan(store: &MemoryStore, user_id: &str, plan: &[(&str, &[&str])]) {
    for (letter, exercises) in plan {
        for exercise in *exercises {
            store.add_plan_exercise(user_id, letter, exercise);
        }
    }
}

/// Insert one historical lift record directly, bypassing the game engine.
#[allow(dead_code)]
pub fn log_at(
    store: &MemoryStore,
    user_id: &str,
    exercise: &str,
    estimated_1rm: f64,
    timestamp: DateTime<Utc>,
) {
    store
        .append_lift_record(LiftRecord {
            user_id: user_id.to_string(),
            exercise: exercise.to_string(),
            weight: estimated_1rm,
            reps: 1,
            estimated_1rm,
            timestamp,
            source: "test".to_string(),
        })
        .unwrap();
}

#[allow(dead_code)]
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}
