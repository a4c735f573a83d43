// SPDX-License-Identifier: MIT

//! Per-user cycle state and per-letter completion progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which phase of the program the user is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleMode {
    Normal,
    Deload,
}

/// One row per user tracking rotation position and cycle bookkeeping.
///
/// `current_position` is unbounded; the effective rotation letter is
/// `letters[position mod letter_count]` at read time. If the letter set
/// changes, the position is re-resolved via modulo, never assumed stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleState {
    pub user_id: String,
    pub current_position: i64,
    /// When the currently active letter became current. Serves as the
    /// session window anchor for completion detection.
    pub position_started_at: DateTime<Utc>,
    pub mode: CycleMode,
    /// Monotonically increasing, starts at 1.
    pub cycle_number: u32,
    /// Anchors the current cycle's window for strength-gain and PR-count
    /// aggregation.
    pub cycle_started_at: DateTime<Utc>,
    /// Bumped by the logging path on each new best; reset when a new cycle
    /// starts. Consumed by the cycle summary, never recomputed.
    pub total_prs_this_cycle: u32,
}

impl CycleState {
    /// Fresh state for a user seen for the first time.
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            current_position: 0,
            position_started_at: now,
            mode: CycleMode::Normal,
            cycle_number: 1,
            cycle_started_at: now,
            total_prs_this_cycle: 0,
        }
    }

    pub fn deload_mode(&self) -> bool {
        self.mode == CycleMode::Deload
    }
}

/// Progress of one rotation letter within the current phase.
///
/// In normal mode the counter means "times completed this cycle"; in deload
/// mode each letter only needs one lighter pass, so progress is a done
/// flag. Making the two phases distinct variants keeps the overloaded
/// integer of older schemas out of the transition logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum LetterProgress {
    Normal { count: u32 },
    Deload { done: bool },
}

impl LetterProgress {
    /// Zero progress for the given phase.
    pub fn fresh(mode: CycleMode) -> Self {
        match mode {
            CycleMode::Normal => LetterProgress::Normal { count: 0 },
            CycleMode::Deload => LetterProgress::Deload { done: false },
        }
    }

    /// Record one completed pass of the letter.
    pub fn bump(&mut self) {
        match self {
            LetterProgress::Normal { count } => *count += 1,
            LetterProgress::Deload { done } => *done = true,
        }
    }

    /// Progress expressed as a plain counter: pass count in normal mode,
    /// 0/1 in deload mode. This is what the dashboard renders.
    pub fn units(&self) -> u32 {
        match self {
            LetterProgress::Normal { count } => *count,
            LetterProgress::Deload { done } => u32::from(*done),
        }
    }

    /// Reinterpret progress under another phase, preserving the counter
    /// value the way the legacy single-integer schema did.
    pub fn for_mode(self, mode: CycleMode) -> Self {
        match (self, mode) {
            (progress @ LetterProgress::Normal { .. }, CycleMode::Normal) => progress,
            (progress @ LetterProgress::Deload { .. }, CycleMode::Deload) => progress,
            (LetterProgress::Normal { count }, CycleMode::Deload) => {
                LetterProgress::Deload { done: count >= 1 }
            }
            (LetterProgress::Deload { done }, CycleMode::Normal) => {
                LetterProgress::Normal { count: u32::from(done) }
            }
        }
    }
}

/// One row per (user, rotation letter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutCompletion {
    pub user_id: String,
    pub workout_letter: String,
    pub progress: LetterProgress,
    pub last_workout_date: Option<DateTime<Utc>>,
}

impl WorkoutCompletion {
    pub fn new(user_id: &str, letter: &str, mode: CycleMode) -> Self {
        Self {
            user_id: user_id.to_string(),
            workout_letter: letter.to_string(),
            progress: LetterProgress::fresh(mode),
            last_workout_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_counts_in_normal_mode() {
        let mut progress = LetterProgress::fresh(CycleMode::Normal);
        progress.bump();
        progress.bump();
        assert_eq!(progress.units(), 2);
    }

    #[test]
    fn test_bump_is_boolean_in_deload_mode() {
        let mut progress = LetterProgress::fresh(CycleMode::Deload);
        progress.bump();
        progress.bump();
        assert_eq!(progress.units(), 1);
    }

    #[test]
    fn test_for_mode_preserves_legacy_counter_semantics() {
        let counted = LetterProgress::Normal { count: 4 };
        assert_eq!(
            counted.for_mode(CycleMode::Deload),
            LetterProgress::Deload { done: true }
        );

        let done = LetterProgress::Deload { done: true };
        assert_eq!(
            done.for_mode(CycleMode::Normal),
            LetterProgress::Normal { count: 1 }
        );

        let untouched = LetterProgress::Deload { done: false };
        assert_eq!(
            untouched.for_mode(CycleMode::Normal),
            LetterProgress::Normal { count: 0 }
        );
    }

    #[test]
    fn test_fresh_state_starts_cycle_one() {
        let now = Utc::now();
        let state = CycleState::new("user-1", now);
        assert_eq!(state.current_position, 0);
        assert_eq!(state.cycle_number, 1);
        assert_eq!(state.mode, CycleMode::Normal);
        assert!(!state.deload_mode());
    }
}
