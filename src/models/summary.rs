// SPDX-License-Identifier: MIT

//! Read-only view types: carousel snapshots, strength-gain summaries,
//! cycle/journey aggregates and reframe messages.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::ExerciseGame;

/// One qualifying exercise in a strength-gain window.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseChange {
    pub name: String,
    pub first_1rm: f64,
    pub latest_1rm: f64,
    pub change_pct: f64,
}

/// Per-exercise changes sorted biggest-gain-first, plus the unweighted
/// average across qualifying exercises. Every exercise counts equally
/// regardless of set volume; that simplicity is deliberate and load-bearing
/// for reproducibility.
#[derive(Debug, Clone, Serialize)]
pub struct StrengthGains {
    pub exercises: Vec<ExerciseChange>,
    pub avg_change_pct: f64,
}

/// Rough previous-cycle comparison: counts every record strictly before
/// the current cycle start, since historical cycle boundaries are not
/// persisted. An approximation, not a true boundary.
#[derive(Debug, Clone, Serialize)]
pub struct PreviousCycle {
    pub total_prs: u32,
    pub cycle_number: u32,
}

/// Summary shown during an active deload.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub total_prs: u32,
    pub avg_strength_change_pct: f64,
    pub cycle_number: u32,
    pub previous_cycle: Option<PreviousCycle>,
    /// Since-day-one compounding percentage, `(Σ best / Σ first) − 1`.
    pub compounding_total_pct: Option<f64>,
    /// Highest milestone percentage crossed (25/50/100).
    pub milestone: Option<u32>,
}

/// Journey arc summary, available from stage 2.
#[derive(Debug, Clone, Serialize)]
pub struct JourneySummary {
    pub total_first_e1rm: f64,
    pub total_best_e1rm: f64,
    pub total_change_pct: f64,
    /// Highest crossed milestone, rendered as e.g. "50%".
    pub milestone_crossed: Option<String>,
    pub cycles_completed: u32,
}

/// Reframe message categories. The tag is the stable wire identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReframeKind {
    /// Grinding near a best without a new one.
    PressureBuilding,
    /// Pressure released by a new best.
    PressureReleased,
    /// Bad day, but the floor held.
    HigherLow,
    /// Returning after a disruption gap.
    FreshCycle,
    /// Checked in daily through the gap without training.
    HeldThroughGap,
    /// Deload earned after a full cycle.
    DeloadEarned,
    /// Fewer but bigger PRs per cycle.
    CompoundingGains,
    /// One lift stalls while the rotation keeps proving itself.
    RotatingStall,
    /// Slow progress after the fast newcomer phase.
    SlowCompounding,
    /// Swapped equipment still counts.
    SwapCounts,
}

impl ReframeKind {
    /// Stable tag used as the hash key for variant selection.
    pub fn tag(self) -> &'static str {
        match self {
            ReframeKind::PressureBuilding => "pressure_building",
            ReframeKind::PressureReleased => "pressure_released",
            ReframeKind::HigherLow => "higher_low",
            ReframeKind::FreshCycle => "fresh_cycle",
            ReframeKind::HeldThroughGap => "held_through_gap",
            ReframeKind::DeloadEarned => "deload_earned",
            ReframeKind::CompoundingGains => "compounding_gains",
            ReframeKind::RotatingStall => "rotating_stall",
            ReframeKind::SlowCompounding => "slow_compounding",
            ReframeKind::SwapCounts => "swap_counts",
        }
    }
}

/// One reframe message selected for the current response.
#[derive(Debug, Clone, Serialize)]
pub struct Reframe {
    pub kind: ReframeKind,
    /// Where the dashboard renders it (e.g. "workout_header", "deload_card").
    pub location: &'static str,
    pub exercise: Option<String>,
    pub variant: usize,
    pub text: &'static str,
}

/// One entry of the visible carousel window.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleWorkout {
    pub letter: String,
    /// "current", "prev1" or "prev2".
    pub role: &'static str,
    pub position: i64,
}

/// Full carousel snapshot returned by state reads and advances.
#[derive(Debug, Clone, Serialize)]
pub struct CarouselView {
    pub current_position: i64,
    pub current_letter: String,
    pub position_started_at: String,
    pub deload_mode: bool,
    pub cycle_number: u32,
    pub cycle_started_at: String,
    /// Pass counts by letter (0/1 during a deload pass).
    pub completions: BTreeMap<String, u32>,
    pub workout_letters: Vec<String>,
    /// Current entry plus up to two previous ones.
    pub visible_workouts: Vec<VisibleWorkout>,
}

/// Complete derived game state for the dashboard response.
#[derive(Debug, Clone, Serialize)]
pub struct GameStateView {
    pub stage: u8,
    pub exercises: BTreeMap<String, ExerciseGame>,
    pub reframes: Vec<Reframe>,
    pub journey: Option<JourneySummary>,
    /// Populated only while a deload is active.
    pub cycle_summary: Option<CycleSummary>,
    pub return_from_disruption: bool,
    pub checked_in_during_gap: bool,
    pub bad_day_detected: bool,
}
