// SPDX-License-Identifier: MIT

//! Per-(user, exercise) derived game metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Reframe;

/// Persistent per-exercise game state. Created lazily on the first log of
/// an exercise, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub user_id: String,
    pub exercise: String,
    /// Pressure segments accumulated while grinding near the best without
    /// setting a new one. 0..=charge_up_max.
    pub charge_up_count: u8,
    /// Compared against `cycle_started_at` for the lazy decay check.
    pub charge_up_last_updated: Option<DateTime<Utc>>,
    /// Historic minimum e1RM ("worst logged set ever"), the resilience
    /// baseline for higher-low detection. Set once, only lowered.
    pub floor_e1rm: Option<f64>,
    /// First-ever e1RM, anchoring the long-term progress ratio.
    pub first_e1rm: Option<f64>,
    pub first_log_date: Option<DateTime<Utc>>,
    /// Total logs ever; gates feature activation thresholds.
    pub work_set_count: u32,
}

impl GameState {
    pub fn new(user_id: &str, exercise: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            exercise: exercise.to_string(),
            charge_up_count: 0,
            charge_up_last_updated: None,
            floor_e1rm: None,
            first_e1rm: None,
            first_log_date: None,
            work_set_count: 0,
        }
    }
}

/// Derived update returned for a single logged set.
#[derive(Debug, Clone, Serialize)]
pub struct GameUpdate {
    /// Pressure level after this log.
    pub charge_up: u8,
    /// Improvement over the previous best, percent. Only present on a new
    /// best once magnitude scaling has activated.
    pub pr_magnitude_pct: Option<f64>,
    /// Suspiciously large jump over the previous best — tagged for display
    /// dampening, never rejected.
    pub is_anomaly: bool,
    pub charge_up_released: bool,
    pub charge_up_released_count: u8,
    /// Below-best set that still beat the historic floor on a bad day.
    pub higher_low: bool,
    /// Message attached to the log response (release or higher-low).
    pub reframe: Option<Reframe>,
}

/// Per-exercise slice of the full game-state response.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseGame {
    /// Masked to 0 below stage 3; pressure is a late-stage reveal.
    pub charge_up: u8,
    pub floor_e1rm: Option<f64>,
    pub first_e1rm: Option<f64>,
    pub first_log_date: Option<String>,
    pub best_e1rm: Option<f64>,
    pub work_set_count: u32,
    pub higher_low: bool,
}
