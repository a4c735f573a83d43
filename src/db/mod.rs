//! Storage layer: the query contracts the core consumes.
//!
//! The core never owns persistence mechanics. Everything it reads or
//! writes goes through [`RecordStore`]; the in-process [`MemoryStore`]
//! implementation backs tests and single-node deployments, and remote
//! backends implement the same trait.

pub mod memory;

pub use memory::MemoryStore;

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    CycleState, GameState, LiftRecord, Member, SessionWindow, WorkoutCompletion,
};

/// Errors from the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Query contracts for the record store and its sibling collaborators
/// (workout-plan membership, daily check-ins, session windows, members).
///
/// All sequences of [`LiftRecord`] are ordered by timestamp ascending.
pub trait RecordStore: Send + Sync {
    // ─── Lift records (append-only event stream) ─────────────────────────
    fn lift_records(
        &self,
        user_id: &str,
        exercise: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<LiftRecord>, StoreError>;
    fn append_lift_record(&self, record: LiftRecord) -> Result<(), StoreError>;
    /// All-time best e1RM for one exercise.
    fn best_e1rm(&self, user_id: &str, exercise: &str) -> Result<Option<f64>, StoreError>;

    // ─── Workout-plan membership ─────────────────────────────────────────
    /// Sorted distinct rotation letters for this user.
    fn rotation_letters(&self, user_id: &str) -> Result<Vec<String>, StoreError>;
    fn exercises_for_letter(
        &self,
        user_id: &str,
        letter: &str,
    ) -> Result<HashSet<String>, StoreError>;

    // ─── Cycle state and completions ─────────────────────────────────────
    fn cycle_state(&self, user_id: &str) -> Result<Option<CycleState>, StoreError>;
    fn put_cycle_state(&self, state: CycleState) -> Result<(), StoreError>;
    fn completion(
        &self,
        user_id: &str,
        letter: &str,
    ) -> Result<Option<WorkoutCompletion>, StoreError>;
    fn completions(&self, user_id: &str) -> Result<Vec<WorkoutCompletion>, StoreError>;
    fn put_completion(&self, completion: WorkoutCompletion) -> Result<(), StoreError>;

    // ─── Per-exercise game state ─────────────────────────────────────────
    fn game_state(&self, user_id: &str, exercise: &str)
        -> Result<Option<GameState>, StoreError>;
    fn game_states(&self, user_id: &str) -> Result<Vec<GameState>, StoreError>;
    fn put_game_state(&self, state: GameState) -> Result<(), StoreError>;

    // ─── External collaborators ──────────────────────────────────────────
    /// Daily check-in dates within the (inclusive) range; `None` bounds are
    /// open-ended.
    fn checkin_dates(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<BTreeSet<NaiveDate>, StoreError>;
    /// Most recently opened workout session, regardless of age.
    fn latest_session(&self, user_id: &str) -> Result<Option<SessionWindow>, StoreError>;
    fn member_by_code(&self, unique_code: &str) -> Result<Option<Member>, StoreError>;
}
