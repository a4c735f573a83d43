// SPDX-License-Identifier: MIT

//! Services module - state machine and derivation logic.

pub mod carousel;
pub mod gains;
pub mod game;
pub mod journey;
pub mod reframe;

pub use carousel::{AdvanceOutcome, CarouselService};
pub use gains::StrengthAnalyzer;
pub use game::GameService;
pub use journey::JourneyService;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Per-user mutex map. Every mutation of cycle state, completions and game
/// state for one user is a read-modify-write with no optimistic check, so
/// all mutating operations for that user serialize on this lock. State is
/// partitioned by user id; no cross-user locking exists.
pub type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

pub(crate) fn user_lock(locks: &UserLocks, user_id: &str) -> Arc<Mutex<()>> {
    locks
        .entry(user_id.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}
