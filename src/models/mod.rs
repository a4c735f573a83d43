// SPDX-License-Identifier: MIT

//! Data models for the carousel and game-engine core.

pub mod cycle;
pub mod game;
pub mod record;
pub mod summary;

pub use cycle::{CycleMode, CycleState, LetterProgress, WorkoutCompletion};
pub use game::{ExerciseGame, GameState, GameUpdate};
pub use record::{LiftRecord, LogSetInput, Member, SessionWindow};
pub use summary::{
    CarouselView, CycleSummary, ExerciseChange, GameStateView, JourneySummary, PreviousCycle,
    Reframe, ReframeKind, StrengthGains, VisibleWorkout,
};

/// Round to one decimal place, matching the precision the dashboard shows.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
