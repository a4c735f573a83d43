// SPDX-License-Identifier: MIT

//! Game-state engine: per-exercise pressure and resilience metrics.
//!
//! Two entry points:
//! - [`GameService::apply_log`] runs on every logged set and mutates the
//!   per-exercise [`GameState`]
//! - [`GameService::compute_game_state`] derives the full read-only view
//!   (stage, reframes, bad-day/disruption flags, summaries)
//!
//! Charge-up decay and the inactivity reset are both lazy: checked on
//! read, never on a timer.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use validator::Validate;

use crate::config::Config;
use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{
    round1, ExerciseGame, GameState, GameStateView, GameUpdate, LiftRecord, LogSetInput,
    ReframeKind,
};
use crate::services::{reframe, user_lock, JourneyService, UserLocks};
use crate::time_utils::format_opt_rfc3339;

#[derive(Clone)]
pub struct GameService {
    store: Arc<dyn RecordStore>,
    config: Config,
    locks: UserLocks,
    journey: JourneyService,
}

impl GameService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        config: Config,
        locks: UserLocks,
        journey: JourneyService,
    ) -> Self {
        Self {
            store,
            config,
            locks,
            journey,
        }
    }

    /// Append one lift record and update every derived per-exercise metric.
    pub async fn apply_log(&self, user_id: &str, input: LogSetInput) -> Result<GameUpdate> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;
        self.apply_log_locked(user_id, input)
    }

    fn apply_log_locked(&self, user_id: &str, input: LogSetInput) -> Result<GameUpdate> {
        let now = Utc::now();
        let exercise = input.exercise.clone();
        let estimated_1rm = input.estimated_1rm;

        // Best before this set; a strictly greater value is a new best.
        let prior_best = self.store.best_e1rm(user_id, &exercise)?;
        let is_pr = prior_best.is_none_or(|best| estimated_1rm > best);

        self.store.append_lift_record(LiftRecord {
            user_id: user_id.to_string(),
            exercise: exercise.clone(),
            weight: input.weight,
            reps: input.reps,
            estimated_1rm,
            timestamp: now,
            source: input.source.unwrap_or_else(|| "dashboard".to_string()),
        })?;

        if is_pr {
            if let Some(mut cycle) = self.store.cycle_state(user_id)? {
                cycle.total_prs_this_cycle += 1;
                self.store.put_cycle_state(cycle)?;
            }
        }

        let mut state = self
            .store
            .game_state(user_id, &exercise)?
            .unwrap_or_else(|| GameState::new(user_id, &exercise));

        state.work_set_count += 1;
        if state.first_e1rm.is_none() {
            state.first_e1rm = Some(estimated_1rm);
            state.first_log_date = Some(now);
        }
        if state.floor_e1rm.is_none_or(|floor| estimated_1rm < floor) {
            state.floor_e1rm = Some(estimated_1rm);
        }

        // PR magnitude and anomaly tagging, once enough history exists.
        let mut pr_magnitude_pct = None;
        let mut is_anomaly = false;
        if is_pr && state.work_set_count >= self.config.pr_magnitude_min_work_sets {
            pr_magnitude_pct = magnitude_pct(estimated_1rm, prior_best).map(round1);
            is_anomaly = is_anomalous(estimated_1rm, prior_best, self.config.anomaly_threshold);
        }

        // Charge-up, once the activation floor is reached.
        let mut charge_up_released = false;
        let mut charge_up_released_count = 0;
        if state.work_set_count >= self.config.charge_up_min_work_sets {
            if is_pr {
                let released = state.charge_up_count;
                state.charge_up_count = 0;
                state.charge_up_last_updated = Some(now);
                if released > 0 {
                    charge_up_released = true;
                    charge_up_released_count = released;
                    tracing::info!(
                        user_id,
                        exercise = %exercise,
                        released_count = released,
                        "Charge-up released"
                    );
                }
            } else if let Some(best) = prior_best.filter(|b| *b > 0.0) {
                if estimated_1rm > 0.0
                    && estimated_1rm / best >= self.config.charge_up_threshold
                {
                    state.charge_up_count =
                        (state.charge_up_count + 1).min(self.config.charge_up_max);
                    state.charge_up_last_updated = Some(now);
                }
                // Meaningfully below best: no state change.
            }
        }

        // Inline higher-low: a below-best set that still beat the floor,
        // on a session already shaping up as a bad day.
        let mut higher_low = false;
        if !is_pr && state.work_set_count >= self.config.higher_low_min_work_sets {
            if let Some(floor) = state.floor_e1rm {
                if self.session_is_bad_day(user_id)? {
                    higher_low = estimated_1rm > floor;
                }
            }
        }

        let log_reframe = if charge_up_released {
            Some(reframe::build_reframe(
                ReframeKind::PressureReleased,
                "log_response",
                Some(&exercise),
                now.date_naive(),
            ))
        } else if higher_low {
            Some(reframe::build_reframe(
                ReframeKind::HigherLow,
                "log_response",
                Some(&exercise),
                now.date_naive(),
            ))
        } else {
            None
        };

        let update = GameUpdate {
            charge_up: state.charge_up_count,
            pr_magnitude_pct,
            is_anomaly,
            charge_up_released,
            charge_up_released_count,
            higher_low,
            reframe: log_reframe,
        };
        self.store.put_game_state(state)?;
        Ok(update)
    }

    /// Derive the full game-state view for the dashboard response.
    pub async fn compute_game_state(
        &self,
        user_id: &str,
        swapped_exercises: &[String],
    ) -> Result<GameStateView> {
        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;
        self.compute_game_state_locked(user_id, swapped_exercises)
    }

    fn compute_game_state_locked(
        &self,
        user_id: &str,
        swapped_exercises: &[String],
    ) -> Result<GameStateView> {
        let stage = self.compute_stage(user_id)?;

        // Decay must run before any state is returned for the cycle.
        self.check_charge_up_decay(user_id)?;

        let cycle = self.store.cycle_state(user_id)?;
        let deload_mode = cycle.as_ref().is_some_and(|c| c.deload_mode());

        let game_states = self.store.game_states(user_id)?;
        let mut exercises: BTreeMap<String, ExerciseGame> = BTreeMap::new();
        let mut bests: HashMap<String, f64> = HashMap::new();
        for state in &game_states {
            let best = self.store.best_e1rm(user_id, &state.exercise)?;
            if let Some(best) = best {
                bests.insert(state.exercise.clone(), best);
            }
            exercises.insert(
                state.exercise.clone(),
                ExerciseGame {
                    // Pressure is a late-stage reveal.
                    charge_up: if stage >= 3 { state.charge_up_count } else { 0 },
                    floor_e1rm: state.floor_e1rm.map(round1),
                    first_e1rm: state.first_e1rm.map(round1),
                    first_log_date: format_opt_rfc3339(state.first_log_date),
                    best_e1rm: best.map(round1),
                    work_set_count: state.work_set_count,
                    higher_low: false,
                },
            );
        }

        let (return_from_disruption, checked_in_during_gap) =
            self.detect_return_from_disruption(user_id)?;

        // Bad day + higher-lows from the current open session window.
        let mut bad_day_detected = false;
        if let Some(session_logs) = self.open_session_logs(user_id)? {
            bad_day_detected = detect_bad_day(
                &session_logs,
                &bests,
                self.config.bad_day_threshold,
                self.config.bad_day_min_exercises,
            );

            if bad_day_detected && stage >= 3 {
                let states_by_exercise: HashMap<&str, &GameState> = game_states
                    .iter()
                    .map(|s| (s.exercise.as_str(), s))
                    .collect();
                for (exercise, e1rm) in &session_logs {
                    let Some(state) = states_by_exercise.get(exercise.as_str()) else {
                        continue;
                    };
                    if state.work_set_count < self.config.higher_low_min_work_sets {
                        continue;
                    }
                    if beats_floor(*e1rm, state.floor_e1rm) {
                        if let Some(view) = exercises.get_mut(exercise) {
                            view.higher_low = true;
                        }
                    }
                }
            }
        }

        // Computed before reframes; the frequency-drop and slow-progress
        // reframes read it.
        let cycle_summary = if deload_mode {
            self.journey.cycle_summary(user_id)?
        } else {
            None
        };

        let reframes = reframe::compute_reframes(
            &self.config,
            stage,
            &game_states,
            return_from_disruption,
            checked_in_during_gap,
            bad_day_detected,
            deload_mode,
            if stage >= 3 { swapped_exercises } else { &[] },
            cycle_summary.as_ref(),
            Utc::now().date_naive(),
        );

        let journey = self.journey.journey_summary(user_id, stage)?;

        Ok(GameStateView {
            stage,
            exercises,
            reframes,
            journey,
            cycle_summary,
            return_from_disruption,
            checked_in_during_gap,
            bad_day_detected,
        })
    }

    /// Which progressive-disclosure stage the user is in (1, 2 or 3).
    pub fn compute_stage(&self, user_id: &str) -> Result<u8> {
        let cycle = self.store.cycle_state(user_id)?;

        if cycle
            .as_ref()
            .is_some_and(|c| c.cycle_number >= self.config.stage3_min_cycles)
        {
            return Ok(3);
        }

        let checkin_count = self.store.checkin_dates(user_id, None, None)?.len();
        if cycle.is_some_and(|c| c.cycle_number >= self.config.stage2_min_cycles)
            || checkin_count >= self.config.stage2_min_checkin_days
        {
            return Ok(2);
        }

        Ok(1)
    }

    /// Reset pressure counters left over from before a cycle reset.
    ///
    /// Silent correction: a charge built in a previous cycle is stale once
    /// `cycle_started_at` passes the last charge event.
    pub fn check_charge_up_decay(&self, user_id: &str) -> Result<()> {
        let Some(cycle) = self.store.cycle_state(user_id)? else {
            return Ok(());
        };

        for mut state in self.store.game_states(user_id)? {
            if state.charge_up_count == 0 {
                continue;
            }
            if state
                .charge_up_last_updated
                .is_some_and(|last| cycle.cycle_started_at > last)
            {
                tracing::debug!(
                    user_id,
                    exercise = %state.exercise,
                    "Charge-up decayed across cycle reset"
                );
                state.charge_up_count = 0;
                self.store.put_game_state(state)?;
            }
        }
        Ok(())
    }

    /// Whether the user is returning from a 7+ day gap, and whether daily
    /// check-ins continued through it.
    pub fn detect_return_from_disruption(&self, user_id: &str) -> Result<(bool, bool)> {
        let Some(session) = self.store.latest_session(user_id)? else {
            return Ok((false, false));
        };

        let now = Utc::now();
        let gap_days = (now - session.opened_at).num_days();
        if gap_days < self.config.disruption_gap_days {
            return Ok((false, false));
        }

        let checked_in = !self
            .store
            .checkin_dates(
                user_id,
                Some(session.opened_at.date_naive()),
                Some(now.date_naive()),
            )?
            .is_empty();

        Ok((true, checked_in))
    }

    /// Logs within the current open session window, or `None` when no
    /// session is open (or the latest one aged out of the 96-hour window).
    fn open_session_logs(&self, user_id: &str) -> Result<Option<Vec<(String, f64)>>> {
        let Some(session) = self.store.latest_session(user_id)? else {
            return Ok(None);
        };
        let age = Utc::now() - session.opened_at;
        if age >= Duration::hours(self.config.session_window_hours) {
            return Ok(None);
        }

        let records = self
            .store
            .lift_records(user_id, None, Some(session.opened_at))?;
        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            records
                .into_iter()
                .map(|r| (r.exercise, r.estimated_1rm))
                .collect(),
        ))
    }

    /// Bad-day check against the current open session, used by the inline
    /// higher-low path on a log.
    fn session_is_bad_day(&self, user_id: &str) -> Result<bool> {
        let Some(session_logs) = self.open_session_logs(user_id)? else {
            return Ok(false);
        };
        if session_logs.len() < 2 {
            return Ok(false);
        }

        let mut bests = HashMap::new();
        for (exercise, _) in &session_logs {
            if !bests.contains_key(exercise) {
                if let Some(best) = self.store.best_e1rm(user_id, exercise)? {
                    bests.insert(exercise.clone(), best);
                }
            }
        }

        Ok(detect_bad_day(
            &session_logs,
            &bests,
            self.config.bad_day_threshold,
            self.config.bad_day_min_exercises,
        ))
    }
}

/// Whether enough distinct exercises in the session fell significantly
/// below their all-time bests. Exercises without a positive best are
/// skipped.
fn detect_bad_day(
    session_logs: &[(String, f64)],
    bests: &HashMap<String, f64>,
    threshold: f64,
    min_exercises: usize,
) -> bool {
    let mut below: HashSet<&str> = HashSet::new();
    for (exercise, e1rm) in session_logs {
        let Some(best) = bests.get(exercise).filter(|b| **b > 0.0) else {
            continue;
        };
        if e1rm / best < threshold {
            below.insert(exercise);
        }
    }
    below.len() >= min_exercises
}

/// A below-best set that still beat the worst-ever set.
fn beats_floor(estimated_1rm: f64, floor_e1rm: Option<f64>) -> bool {
    floor_e1rm.is_some_and(|floor| floor > 0.0 && estimated_1rm > floor)
}

/// e1RM improvement over the previous best, percent.
fn magnitude_pct(new_e1rm: f64, previous_best: Option<f64>) -> Option<f64> {
    previous_best
        .filter(|best| *best > 0.0)
        .map(|best| (new_e1rm - best) / best * 100.0)
}

/// Strictly more than `threshold` fractional improvement over the previous
/// best is suspicious.
fn is_anomalous(new_e1rm: f64, previous_best: Option<f64>, threshold: f64) -> bool {
    previous_best
        .filter(|best| *best > 0.0)
        .is_some_and(|best| (new_e1rm - best) / best > threshold)
}
