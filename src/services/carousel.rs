// SPDX-License-Identifier: MIT

//! Cycle state machine: rotation position, deload passes, inactivity resets.
//!
//! The core workflow on an advance:
//! 1. Bump the completion of the letter being left
//! 2. Check for a phase transition (into deload, or deload pass complete)
//! 3. Unconditionally move the position forward
//!
//! The caller decides on notifications from the returned flags: a
//! "workout complete" message only on a pure normal advance, a "deload
//! entered" message (with strength gains) only on the transition into
//! deload, and nothing during deload-pass advances or the cycle-reset
//! advance itself. Notification failures must never roll back a
//! transition.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{
    CarouselView, CycleMode, CycleState, LetterProgress, VisibleWorkout, WorkoutCompletion,
};
use crate::services::{user_lock, UserLocks};
use crate::time_utils::format_utc_rfc3339;

/// Result of one advance, with the flags the notification layer keys on.
#[derive(Debug, Clone, Serialize)]
pub struct AdvanceOutcome {
    pub carousel: CarouselView,
    pub entered_deload: bool,
    pub cycle_reset: bool,
    /// The letter that was just completed (pre-advance current letter).
    pub completed_letter: String,
}

/// Owns per-user rotation position, deload flag, cycle counter and
/// per-letter completion progress.
#[derive(Clone)]
pub struct CarouselService {
    store: Arc<dyn RecordStore>,
    config: Config,
    locks: UserLocks,
}

impl CarouselService {
    pub fn new(store: Arc<dyn RecordStore>, config: Config, locks: UserLocks) -> Self {
        Self {
            store,
            config,
            locks,
        }
    }

    /// Advance the carousel one position.
    ///
    /// In normal mode the current letter's counter is bumped first; once
    /// every letter reaches the per-letter target the user enters deload
    /// and the counters reset to track deload passes. In deload mode the
    /// bump marks the letter's lighter pass done; once every letter is
    /// done the cycle number increments and the rotation restarts at the
    /// first letter.
    pub async fn advance(&self, user_id: &str, reason: &str) -> Result<AdvanceOutcome> {
        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;
        self.advance_locked(user_id, reason)
    }

    fn advance_locked(&self, user_id: &str, reason: &str) -> Result<AdvanceOutcome> {
        let letters = self.store.rotation_letters(user_id)?;
        if letters.is_empty() {
            return Err(AppError::NoWorkoutsConfigured);
        }
        let num = letters.len() as i64;
        let mut state = self.get_or_create_state(user_id)?;
        let current_letter =
            letters[state.current_position.rem_euclid(num) as usize].clone();
        let now = Utc::now();

        let completed_letter = current_letter.clone();
        let mut entered_deload = false;
        let mut cycle_reset = false;

        match state.mode {
            CycleMode::Normal => {
                self.bump_completion(user_id, &current_letter, CycleMode::Normal)?;

                let completions = self.completion_counts(user_id, &letters)?;
                let all_complete = letters
                    .iter()
                    .all(|l| completions[l] >= self.config.completions_per_letter);
                if all_complete {
                    state.mode = CycleMode::Deload;
                    entered_deload = true;
                    // Counters are reused to track deload passes.
                    self.reset_completions(user_id, CycleMode::Deload)?;
                    tracing::info!(
                        user_id,
                        cycle = state.cycle_number,
                        "All letters at target, entering deload"
                    );
                }
            }
            CycleMode::Deload => {
                self.bump_completion(user_id, &current_letter, CycleMode::Deload)?;

                let completions = self.completion_counts(user_id, &letters)?;
                let all_done = letters.iter().all(|l| completions[l] >= 1);
                if all_done {
                    state.mode = CycleMode::Normal;
                    state.cycle_number += 1;
                    state.cycle_started_at = now;
                    state.total_prs_this_cycle = 0;
                    cycle_reset = true;
                    self.reset_completions(user_id, CycleMode::Normal)?;
                    // The unconditional advance below must land on index 0.
                    state.current_position = -1;
                    tracing::info!(
                        user_id,
                        cycle = state.cycle_number,
                        "Deload pass complete, starting new cycle"
                    );
                }
            }
        }

        state.current_position += 1;
        state.position_started_at = now;
        self.store.put_cycle_state(state)?;

        let carousel = self.build_view(user_id, &letters)?;
        tracing::debug!(
            user_id,
            reason,
            position = carousel.current_position,
            "Carousel advanced"
        );

        Ok(AdvanceOutcome {
            carousel,
            entered_deload,
            cycle_reset,
            completed_letter,
        })
    }

    /// Move the carousel back one position.
    ///
    /// Decrements the completion of the letter being returned to, undoing
    /// the bump recorded when advancing away from it, and exits deload if
    /// active. Best-effort: there is no persisted transition log, so
    /// interleaved go-back/advance sequences across cycle transitions can
    /// leave the counters approximate.
    pub async fn go_back(&self, user_id: &str) -> Result<CarouselView> {
        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;
        self.go_back_locked(user_id)
    }

    fn go_back_locked(&self, user_id: &str) -> Result<CarouselView> {
        let letters = self.store.rotation_letters(user_id)?;
        if letters.is_empty() {
            return Err(AppError::NoWorkoutsConfigured);
        }
        let mut state = self.get_or_create_state(user_id)?;
        if state.current_position <= 0 {
            return Err(AppError::AlreadyAtStart);
        }

        let num = letters.len() as i64;
        let prev_position = state.current_position - 1;
        let prev_letter = letters[prev_position.rem_euclid(num) as usize].clone();

        if state.mode == CycleMode::Deload {
            // Leaving deload without completing it; cycle_number untouched.
            state.mode = CycleMode::Normal;
            self.normalize_completions(user_id)?;
            tracing::info!(user_id, "Left deload mode via go-back");
        }

        if let Some(mut record) = self.store.completion(user_id, &prev_letter)? {
            record.progress = record.progress.for_mode(CycleMode::Normal);
            if let LetterProgress::Normal { count } = &mut record.progress {
                *count = count.saturating_sub(1);
            }
            self.store.put_completion(record)?;
        }

        state.current_position = prev_position;
        state.position_started_at = Utc::now();
        self.store.put_cycle_state(state)?;

        self.build_view(user_id, &letters)
    }

    /// Full carousel view, or `None` when no workouts are configured.
    ///
    /// Runs the opportunistic inactivity check first, so a stale cycle is
    /// silently reset before the view is built.
    pub async fn carousel_state(&self, user_id: &str) -> Result<Option<CarouselView>> {
        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;

        let letters = self.store.rotation_letters(user_id)?;
        if letters.is_empty() {
            return Ok(None);
        }
        self.check_inactivity_locked(user_id, &letters)?;
        self.build_view(user_id, &letters).map(Some)
    }

    /// 7-day inactivity check. Returns whether a reset was performed.
    ///
    /// If the user has logged at least one lift ever but nothing within
    /// the inactivity window, the gap is treated as a de-facto deload: the
    /// cycle resets silently and the rotation resumes at the letter after
    /// the last logged exercise.
    pub async fn check_inactivity_reset(&self, user_id: &str) -> Result<bool> {
        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;

        let letters = self.store.rotation_letters(user_id)?;
        if letters.is_empty() {
            return Ok(false);
        }
        self.check_inactivity_locked(user_id, &letters)
    }

    fn check_inactivity_locked(&self, user_id: &str, letters: &[String]) -> Result<bool> {
        let records = self.store.lift_records(user_id, None, None)?;
        let latest = match records.last() {
            Some(latest) => latest,
            // Brand new user, never logged anything.
            None => return Ok(false),
        };

        let now = Utc::now();
        let days_since = (now - latest.timestamp).num_seconds() as f64 / 86_400.0;
        if days_since < self.config.inactivity_days as f64 {
            return Ok(false);
        }

        let num = letters.len() as i64;
        let mut state = self.get_or_create_state(user_id)?;

        // Resume at the letter after the one holding the last logged
        // exercise (first match in letter order), or at the start if the
        // exercise no longer belongs to any letter.
        let mut next_idx: i64 = 0;
        for (idx, letter) in letters.iter().enumerate() {
            if self
                .store
                .exercises_for_letter(user_id, letter)?
                .contains(&latest.exercise)
            {
                next_idx = (idx as i64 + 1).rem_euclid(num);
                break;
            }
        }

        state.current_position = next_idx;
        state.position_started_at = now;
        state.mode = CycleMode::Normal;
        state.cycle_number += 1;
        state.cycle_started_at = now;
        state.total_prs_this_cycle = 0;
        self.store.put_cycle_state(state)?;
        self.reset_completions(user_id, CycleMode::Normal)?;

        tracing::info!(
            user_id,
            days_inactive = days_since as i64,
            "Inactivity reset: treating the gap as a deload"
        );
        Ok(true)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn get_or_create_state(&self, user_id: &str) -> Result<CycleState> {
        if let Some(state) = self.store.cycle_state(user_id)? {
            return Ok(state);
        }
        let state = CycleState::new(user_id, Utc::now());
        self.store.put_cycle_state(state.clone())?;
        Ok(state)
    }

    fn bump_completion(&self, user_id: &str, letter: &str, mode: CycleMode) -> Result<()> {
        let mut record = self
            .store
            .completion(user_id, letter)?
            .unwrap_or_else(|| WorkoutCompletion::new(user_id, letter, mode));
        record.progress = record.progress.for_mode(mode);
        record.progress.bump();
        record.last_workout_date = Some(Utc::now());
        self.store.put_completion(record)?;
        Ok(())
    }

    /// Pass counts by letter, defaulting to 0 for letters without a row.
    fn completion_counts(
        &self,
        user_id: &str,
        letters: &[String],
    ) -> Result<BTreeMap<String, u32>> {
        let rows = self.store.completions(user_id)?;
        let mut counts: BTreeMap<String, u32> =
            letters.iter().map(|l| (l.clone(), 0)).collect();
        for row in rows {
            if let Some(count) = counts.get_mut(&row.workout_letter) {
                *count = row.progress.units();
            }
        }
        Ok(counts)
    }

    fn reset_completions(&self, user_id: &str, mode: CycleMode) -> Result<()> {
        for mut row in self.store.completions(user_id)? {
            row.progress = LetterProgress::fresh(mode);
            row.last_workout_date = None;
            self.store.put_completion(row)?;
        }
        Ok(())
    }

    /// Reinterpret all completion rows under normal mode, preserving the
    /// counter values (used when leaving deload without completing it).
    fn normalize_completions(&self, user_id: &str) -> Result<()> {
        for mut row in self.store.completions(user_id)? {
            row.progress = row.progress.for_mode(CycleMode::Normal);
            self.store.put_completion(row)?;
        }
        Ok(())
    }

    fn build_view(&self, user_id: &str, letters: &[String]) -> Result<CarouselView> {
        let state = self.get_or_create_state(user_id)?;
        let num = letters.len() as i64;
        let completions = self.completion_counts(user_id, letters)?;
        let current_letter =
            letters[state.current_position.rem_euclid(num) as usize].clone();

        // Visible window: current always, previous two only once the
        // position has moved far enough for them to exist.
        let mut visible = vec![VisibleWorkout {
            letter: current_letter.clone(),
            role: "current",
            position: state.current_position,
        }];
        if state.current_position >= 1 {
            let position = state.current_position - 1;
            visible.push(VisibleWorkout {
                letter: letters[position.rem_euclid(num) as usize].clone(),
                role: "prev1",
                position,
            });
        }
        if state.current_position >= 2 {
            let position = state.current_position - 2;
            visible.push(VisibleWorkout {
                letter: letters[position.rem_euclid(num) as usize].clone(),
                role: "prev2",
                position,
            });
        }

        Ok(CarouselView {
            current_position: state.current_position,
            current_letter,
            position_started_at: format_utc_rfc3339(state.position_started_at),
            deload_mode: state.deload_mode(),
            cycle_number: state.cycle_number,
            cycle_started_at: format_utc_rfc3339(state.cycle_started_at),
            completions,
            workout_letters: letters.to_vec(),
            visible_workouts: visible,
        })
    }
}
