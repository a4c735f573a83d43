// SPDX-License-Identifier: MIT

//! In-process store backing tests and single-node deployments.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use crate::db::{RecordStore, StoreError};
use crate::models::{
    CycleState, GameState, LiftRecord, Member, SessionWindow, WorkoutCompletion,
};

/// Thread-safe in-memory implementation of [`RecordStore`].
///
/// Cloning is cheap; clones share the same underlying maps.
#[derive(Default, Clone)]
pub struct MemoryStore {
    /// user_id → lift records, kept sorted by timestamp ascending.
    records: Arc<DashMap<String, Vec<LiftRecord>>>,
    /// user_id → letter → exercise names.
    plans: Arc<DashMap<String, BTreeMap<String, HashSet<String>>>>,
    cycle_states: Arc<DashMap<String, CycleState>>,
    /// (user_id, letter) → completion row.
    completions: Arc<DashMap<(String, String), WorkoutCompletion>>,
    /// (user_id, exercise) → game state.
    game_states: Arc<DashMap<(String, String), GameState>>,
    checkins: Arc<DashMap<String, BTreeSet<NaiveDate>>>,
    sessions: Arc<DashMap<String, SessionWindow>>,
    /// unique_code → member.
    members: Arc<DashMap<String, Member>>,
}

impl MemoryStore {
    // ─── Seeding helpers (collaborator data owned outside the core) ──────

    /// Add one exercise to a rotation letter of a user's plan.
    pub fn add_plan_exercise(&self, user_id: &str, letter: &str, exercise: &str) {
        self.plans
            .entry(user_id.to_string())
            .or_default()
            .entry(letter.to_string())
            .or_default()
            .insert(exercise.to_string());
    }

    /// Record the most recently opened workout session for a user.
    pub fn open_session(&self, user_id: &str, letter: &str, opened_at: DateTime<Utc>) {
        self.sessions.insert(
            user_id.to_string(),
            SessionWindow {
                workout_letter: letter.to_string(),
                opened_at,
            },
        );
    }

    /// Record one daily check-in.
    pub fn add_checkin(&self, user_id: &str, date: NaiveDate) {
        self.checkins
            .entry(user_id.to_string())
            .or_default()
            .insert(date);
    }

    pub fn upsert_member(&self, member: Member) {
        self.members.insert(member.unique_code.clone(), member);
    }
}

impl RecordStore for MemoryStore {
    fn lift_records(
        &self,
        user_id: &str,
        exercise: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<LiftRecord>, StoreError> {
        let records = match self.records.get(user_id) {
            Some(records) => records,
            None => return Ok(Vec::new()),
        };
        Ok(records
            .iter()
            .filter(|r| exercise.is_none_or(|e| r.exercise == e))
            .filter(|r| since.is_none_or(|s| r.timestamp >= s))
            .cloned()
            .collect())
    }

    fn append_lift_record(&self, record: LiftRecord) -> Result<(), StoreError> {
        let mut records = self.records.entry(record.user_id.clone()).or_default();
        // Tests seed history out of order; keep the stream sorted.
        let idx = records.partition_point(|r| r.timestamp <= record.timestamp);
        records.insert(idx, record);
        Ok(())
    }

    fn best_e1rm(&self, user_id: &str, exercise: &str) -> Result<Option<f64>, StoreError> {
        Ok(self
            .lift_records(user_id, Some(exercise), None)?
            .iter()
            .map(|r| r.estimated_1rm)
            .fold(None, |best: Option<f64>, v| {
                Some(best.map_or(v, |b| b.max(v)))
            }))
    }

    fn rotation_letters(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .plans
            .get(user_id)
            .map(|plan| plan.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn exercises_for_letter(
        &self,
        user_id: &str,
        letter: &str,
    ) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .plans
            .get(user_id)
            .and_then(|plan| plan.get(letter).cloned())
            .unwrap_or_default())
    }

    fn cycle_state(&self, user_id: &str) -> Result<Option<CycleState>, StoreError> {
        Ok(self.cycle_states.get(user_id).map(|s| s.clone()))
    }

    fn put_cycle_state(&self, state: CycleState) -> Result<(), StoreError> {
        self.cycle_states.insert(state.user_id.clone(), state);
        Ok(())
    }

    fn completion(
        &self,
        user_id: &str,
        letter: &str,
    ) -> Result<Option<WorkoutCompletion>, StoreError> {
        Ok(self
            .completions
            .get(&(user_id.to_string(), letter.to_string()))
            .map(|c| c.clone()))
    }

    fn completions(&self, user_id: &str) -> Result<Vec<WorkoutCompletion>, StoreError> {
        Ok(self
            .completions
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn put_completion(&self, completion: WorkoutCompletion) -> Result<(), StoreError> {
        self.completions.insert(
            (completion.user_id.clone(), completion.workout_letter.clone()),
            completion,
        );
        Ok(())
    }

    fn game_state(
        &self,
        user_id: &str,
        exercise: &str,
    ) -> Result<Option<GameState>, StoreError> {
        Ok(self
            .game_states
            .get(&(user_id.to_string(), exercise.to_string()))
            .map(|g| g.clone()))
    }

    fn game_states(&self, user_id: &str) -> Result<Vec<GameState>, StoreError> {
        Ok(self
            .game_states
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn put_game_state(&self, state: GameState) -> Result<(), StoreError> {
        self.game_states
            .insert((state.user_id.clone(), state.exercise.clone()), state);
        Ok(())
    }

    fn checkin_dates(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<BTreeSet<NaiveDate>, StoreError> {
        let dates = match self.checkins.get(user_id) {
            Some(dates) => dates,
            None => return Ok(BTreeSet::new()),
        };
        Ok(dates
            .iter()
            .filter(|d| from.is_none_or(|f| **d >= f))
            .filter(|d| to.is_none_or(|t| **d <= t))
            .copied()
            .collect())
    }

    fn latest_session(&self, user_id: &str) -> Result<Option<SessionWindow>, StoreError> {
        Ok(self.sessions.get(user_id).map(|s| s.clone()))
    }

    fn member_by_code(&self, unique_code: &str) -> Result<Option<Member>, StoreError> {
        Ok(self.members.get(unique_code).map(|m| m.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(user: &str, exercise: &str, e1rm: f64, timestamp: DateTime<Utc>) -> LiftRecord {
        LiftRecord {
            user_id: user.to_string(),
            exercise: exercise.to_string(),
            weight: e1rm,
            reps: 1,
            estimated_1rm: e1rm,
            timestamp,
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_records_stay_sorted_despite_out_of_order_inserts() {
        let store = MemoryStore::default();
        let now = Utc::now();
        store
            .append_lift_record(record("u", "bench", 100.0, now))
            .unwrap();
        store
            .append_lift_record(record("u", "bench", 90.0, now - Duration::days(3)))
            .unwrap();

        let records = store.lift_records("u", None, None).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].timestamp < records[1].timestamp);
        assert_eq!(records[0].estimated_1rm, 90.0);
    }

    #[test]
    fn test_best_e1rm_is_all_time_max() {
        let store = MemoryStore::default();
        let now = Utc::now();
        store
            .append_lift_record(record("u", "bench", 90.0, now - Duration::days(2)))
            .unwrap();
        store
            .append_lift_record(record("u", "bench", 110.0, now - Duration::days(1)))
            .unwrap();
        store
            .append_lift_record(record("u", "squat", 200.0, now))
            .unwrap();

        assert_eq!(store.best_e1rm("u", "bench").unwrap(), Some(110.0));
        assert_eq!(store.best_e1rm("u", "deadlift").unwrap(), None);
    }

    #[test]
    fn test_rotation_letters_are_sorted() {
        let store = MemoryStore::default();
        store.add_plan_exercise("u", "B", "row");
        store.add_plan_exercise("u", "A", "bench");
        assert_eq!(store.rotation_letters("u").unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_checkin_range_bounds_are_inclusive() {
        let store = MemoryStore::default();
        let day = |d| NaiveDate::from_ymd_opt(2026, 8, d).unwrap();
        for d in [1, 5, 10] {
            store.add_checkin("u", day(d));
        }

        let dates = store.checkin_dates("u", Some(day(5)), Some(day(10))).unwrap();
        assert_eq!(dates.len(), 2);
        assert!(dates.contains(&day(5)));
    }
}
