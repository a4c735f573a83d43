// SPDX-License-Identifier: MIT

//! Lift records and the boundary types around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One completed set. Logically append-only: corrections are modeled as
/// deletion plus re-insertion by the storage layer, never in-place edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftRecord {
    pub user_id: String,
    /// Canonical exercise name. Normalization/fuzzy matching happens
    /// upstream; the core treats the string as opaque.
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    /// Derived one-rep-max estimate. Computed upstream from weight/reps.
    pub estimated_1rm: f64,
    pub timestamp: DateTime<Utc>,
    /// Provenance tag (source channel), e.g. "dashboard" or a bot channel id.
    pub source: String,
}

/// Validated input for logging one set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogSetInput {
    #[validate(length(min = 1, max = 120))]
    pub exercise: String,
    #[validate(range(min = 0.0))]
    pub weight: f64,
    #[validate(range(min = 1))]
    pub reps: u32,
    #[validate(range(min = 0.0))]
    pub estimated_1rm: f64,
    /// Provenance tag; defaults to "dashboard" when absent.
    pub source: Option<String>,
}

/// The most recently opened workout session, consumed from the external
/// session-tracking collaborator as a boundary timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWindow {
    pub workout_letter: String,
    pub opened_at: DateTime<Utc>,
}

/// A dashboard member. Member CRUD lives outside the core; only resolution
/// by unique code is consumed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub unique_code: String,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_set_input_rejects_empty_exercise() {
        let input = LogSetInput {
            exercise: String::new(),
            weight: 100.0,
            reps: 5,
            estimated_1rm: 116.7,
            source: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_log_set_input_rejects_zero_reps() {
        let input = LogSetInput {
            exercise: "bench press".to_string(),
            weight: 100.0,
            reps: 0,
            estimated_1rm: 100.0,
            source: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_log_set_input_accepts_valid_set() {
        let input = LogSetInput {
            exercise: "bench press".to_string(),
            weight: 100.0,
            reps: 5,
            estimated_1rm: 116.7,
            source: Some("dashboard".to_string()),
        };
        assert!(input.validate().is_ok());
    }
}
