//! Application configuration loaded from environment variables.
//!
//! Every gameplay threshold lives here so test setups and deployments can
//! tune them without touching the state machine. Defaults match the
//! production tuning.

use std::env;

/// Tunable thresholds for the carousel and game engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Passes of each rotation letter before a deload is earned.
    pub completions_per_letter: u32,
    /// Days without a logged lift before the cycle silently resets.
    pub inactivity_days: i64,

    // --- Charge-up ---
    /// Fraction of the best e1RM that counts as "grinding near best".
    pub charge_up_threshold: f64,
    /// Maximum pressure segments.
    pub charge_up_max: u8,
    /// Work sets logged before charge-up activates for an exercise.
    pub charge_up_min_work_sets: u32,

    // --- Bad day / higher-low ---
    /// Fraction of the best e1RM below which a set counts toward a bad day.
    pub bad_day_threshold: f64,
    /// Distinct exercises below threshold needed to flag a bad day.
    pub bad_day_min_exercises: usize,
    /// Work sets logged before higher-low detection activates.
    pub higher_low_min_work_sets: u32,

    // --- Anomaly / magnitude ---
    /// Fractional improvement over the previous best that gets tagged as a
    /// statistical anomaly (display dampening, never rejection).
    pub anomaly_threshold: f64,
    /// Work sets logged before PR magnitude scaling activates.
    pub pr_magnitude_min_work_sets: u32,

    // --- Stage gating ---
    /// Completed cycles to enter stage 2.
    pub stage2_min_cycles: u32,
    /// Lifetime daily check-ins to enter stage 2 (alternative path).
    pub stage2_min_checkin_days: usize,
    /// Completed cycles to enter stage 3.
    pub stage3_min_cycles: u32,

    // --- Sessions / disruption ---
    /// Days of no opened session before return-from-disruption fires.
    pub disruption_gap_days: i64,
    /// Hours an opened workout session stays "current".
    pub session_window_hours: i64,

    /// Aggregate strength-improvement milestones, as fractions of the
    /// first-ever totals (0.25 = +25%).
    pub milestone_thresholds: Vec<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completions_per_letter: 6,
            inactivity_days: 7,
            charge_up_threshold: 0.85,
            charge_up_max: 5,
            charge_up_min_work_sets: 8,
            bad_day_threshold: 0.80,
            bad_day_min_exercises: 2,
            higher_low_min_work_sets: 10,
            anomaly_threshold: 0.25,
            pr_magnitude_min_work_sets: 3,
            stage2_min_cycles: 2,
            stage2_min_checkin_days: 5,
            stage3_min_cycles: 3,
            disruption_gap_days: 7,
            session_window_hours: 96,
            milestone_thresholds: vec![0.25, 0.50, 1.00],
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only the headline knobs are overridable; unparseable values fall
    /// back to the defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        Self {
            completions_per_letter: env_parse(
                "COMPLETIONS_PER_LETTER",
                defaults.completions_per_letter,
            ),
            inactivity_days: env_parse("INACTIVITY_DAYS", defaults.inactivity_days),
            disruption_gap_days: env_parse("DISRUPTION_GAP_DAYS", defaults.disruption_gap_days),
            session_window_hours: env_parse("SESSION_WINDOW_HOURS", defaults.session_window_hours),
            ..defaults
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_tuning() {
        let config = Config::default();
        assert_eq!(config.completions_per_letter, 6);
        assert_eq!(config.inactivity_days, 7);
        assert_eq!(config.charge_up_max, 5);
        assert_eq!(config.session_window_hours, 96);
        assert_eq!(config.milestone_thresholds, vec![0.25, 0.50, 1.00]);
    }

    #[test]
    fn test_env_override() {
        env::set_var("COMPLETIONS_PER_LETTER", "4");
        let config = Config::from_env();
        assert_eq!(config.completions_per_letter, 4);
        env::remove_var("COMPLETIONS_PER_LETTER");
    }

    #[test]
    fn test_bad_env_value_falls_back() {
        env::set_var("INACTIVITY_DAYS", "not-a-number");
        let config = Config::from_env();
        assert_eq!(config.inactivity_days, 7);
        env::remove_var("INACTIVITY_DAYS");
    }
}
