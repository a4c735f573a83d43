// SPDX-License-Identifier: MIT

//! Lift-Carousel: workout-rotation and gamification core for a
//! fitness-coaching backend.
//!
//! This crate owns the carousel/cycle state machine (rotation position,
//! deload passes, inactivity resets), the per-exercise game-state engine
//! (charge-up pressure, floor tracking, bad-day and disruption detection,
//! reframe selection) and the read-only summary layers built on top of
//! them. Persistence, HTTP routing and notification delivery are external
//! collaborators reached through the query contracts in [`db`].

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::RecordStore;
use error::{AppError, Result};
use models::{CarouselView, GameStateView, GameUpdate, LogSetInput, Member, StrengthGains};
use services::{
    AdvanceOutcome, CarouselService, GameService, JourneyService, StrengthAnalyzer, UserLocks,
};

/// Shared application state wiring the core services to one store.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub carousel: CarouselService,
    pub game: GameService,
    pub journey: JourneyService,
    pub gains: StrengthAnalyzer,
}

impl AppState {
    /// Wire up all services against one store.
    ///
    /// The per-user lock map is shared between the carousel and game
    /// services so every mutating path for a given user serializes on the
    /// same mutex.
    pub fn new(config: Config, store: Arc<dyn RecordStore>) -> Self {
        let locks: UserLocks = Arc::new(dashmap::DashMap::new());
        let gains = StrengthAnalyzer::new(store.clone());
        let journey = JourneyService::new(store.clone(), config.clone(), gains.clone());
        let carousel = CarouselService::new(store.clone(), config.clone(), locks.clone());
        let game = GameService::new(store.clone(), config.clone(), locks, journey.clone());

        Self {
            config,
            store,
            carousel,
            game,
            journey,
            gains,
        }
    }

    /// Resolve a dashboard member from their unique code.
    pub fn resolve_member(&self, unique_code: &str) -> Result<Member> {
        self.store
            .member_by_code(unique_code)?
            .ok_or_else(|| AppError::NotFound(format!("member {unique_code}")))
    }

    /// Log one completed set and run the per-log game-state update.
    ///
    /// Validates the input, appends the lift record, determines whether the
    /// set is a new best and returns the derived game update (charge-up,
    /// anomaly tag, PR magnitude, higher-low flag).
    pub async fn log_set(&self, user_id: &str, input: LogSetInput) -> Result<GameUpdate> {
        self.game.apply_log(user_id, input).await
    }

    /// Advance the carousel one position.
    pub async fn advance(&self, user_id: &str, reason: &str) -> Result<AdvanceOutcome> {
        self.carousel.advance(user_id, reason).await
    }

    /// Move the carousel back one position (best-effort undo).
    pub async fn go_back(&self, user_id: &str) -> Result<CarouselView> {
        self.carousel.go_back(user_id).await
    }

    /// Full carousel view, or `None` when no workouts are configured.
    ///
    /// Runs the opportunistic inactivity check before building the view.
    pub async fn carousel_state(&self, user_id: &str) -> Result<Option<CarouselView>> {
        self.carousel.carousel_state(user_id).await
    }

    /// Complete derived game state for the dashboard response.
    ///
    /// `swapped_exercises` is supplied by the external swap collaborator.
    pub async fn game_state(
        &self,
        user_id: &str,
        swapped_exercises: &[String],
    ) -> Result<GameStateView> {
        self.game
            .compute_game_state(user_id, swapped_exercises)
            .await
    }

    /// Per-exercise and average strength change across the current cycle.
    pub fn strength_gains(&self, user_id: &str) -> Result<Option<StrengthGains>> {
        self.gains.cycle_gains(user_id)
    }
}
