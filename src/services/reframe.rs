// SPDX-License-Identifier: MIT

//! Reframe engine: motivational copy with deterministic variant selection.
//!
//! The variant shown for a given (kind, exercise, calendar day) tuple is a
//! pure function of those three fields, so repeated reads within one day
//! render identically without persisting which variant was shown. The hash
//! is SHA-256 (first 8 bytes, big-endian) rather than a language-default
//! hasher, so the selection is reproducible across processes and
//! implementations.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::models::{CycleSummary, GameState, Reframe, ReframeKind};

/// Copy variants per reframe kind. Every kind has at least one variant.
pub fn variants(kind: ReframeKind) -> &'static [&'static str] {
    match kind {
        ReframeKind::PressureBuilding => &[
            "Pressure building.",
            "Spring loading.",
            "Body adapting. PR incoming.",
        ],
        ReframeKind::PressureReleased => &[
            "Pressure released.",
            "That's what grinding builds.",
            "Spring unloaded.",
        ],
        ReframeKind::HigherLow => &[
            "Floor raised.",
            "Higher low. That counts.",
            "Net gain on a tough day.",
        ],
        ReframeKind::FreshCycle => &[
            "Fresh cycle. 6 ahead.",
            "Break was the deload. Reloaded.",
            "Picking up where you left off.",
        ],
        ReframeKind::HeldThroughGap => &[
            "Check-ins held through the gap. Still in the game.",
            "Didn't train. Still showed up daily. That's a win.",
        ],
        ReframeKind::DeloadEarned => &[
            "Maximum pressure built. Body catches up now.",
            "Strategic rest. Come back stronger.",
            "Cycle complete. Recovery earns the next round.",
        ],
        ReframeKind::CompoundingGains => &[
            "Fewer PRs per cycle is normal. Each one is bigger.",
            "5% per cycle. Doubles in a year.",
            "Compounding. Every cycle stacks.",
        ],
        ReframeKind::RotatingStall => &[
            "This rotates. Other lifts are proving it works.",
            "Stagnant now. Will break. Keep pushing.",
        ],
        ReframeKind::SlowCompounding => &[
            "Freebies are done. Building permanent changes now.",
            "Slower but compounding. This is the real game.",
        ],
        ReframeKind::SwapCounts => &[
            "Different equipment. Same work. Counts.",
            "Subbed in. Train to failure. It counts.",
        ],
    }
}

/// Deterministic variant index for (kind, exercise, day).
pub fn select_variant(kind: ReframeKind, exercise: Option<&str>, day: NaiveDate) -> usize {
    let key = format!("{}:{}:{}", kind.tag(), exercise.unwrap_or(""), day);
    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) as usize) % variants(kind).len()
}

/// Build one reframe with its selected variant text.
pub fn build_reframe(
    kind: ReframeKind,
    location: &'static str,
    exercise: Option<&str>,
    day: NaiveDate,
) -> Reframe {
    let variant = select_variant(kind, exercise, day);
    Reframe {
        kind,
        location,
        exercise: exercise.map(String::from),
        variant,
        text: variants(kind)[variant],
    }
}

/// All reframes active for the current state, in display order.
///
/// Return-from-disruption and deload reframes surface at every stage.
/// Cycle-summary reframes additionally require stage 3 and an active
/// deload. Everything else (per-exercise pressure, bad-day, swaps) is a
/// stage-3 reveal.
#[allow(clippy::too_many_arguments)]
pub fn compute_reframes(
    config: &Config,
    stage: u8,
    game_states: &[GameState],
    return_from_disruption: bool,
    checked_in_during_gap: bool,
    bad_day_detected: bool,
    deload_mode: bool,
    swapped_exercises: &[String],
    cycle_summary: Option<&CycleSummary>,
    day: NaiveDate,
) -> Vec<Reframe> {
    let mut reframes = Vec::new();

    if return_from_disruption {
        reframes.push(build_reframe(ReframeKind::FreshCycle, "workout_header", None, day));
        if checked_in_during_gap {
            reframes.push(build_reframe(
                ReframeKind::HeldThroughGap,
                "checkin_card",
                None,
                day,
            ));
        }
    }

    if deload_mode {
        reframes.push(build_reframe(ReframeKind::DeloadEarned, "deload_card", None, day));

        if stage >= 3 {
            if let Some(summary) = cycle_summary {
                // PR frequency dropping: fewer PRs than the previous cycle.
                if summary.cycle_number >= 3 {
                    if let Some(previous) = &summary.previous_cycle {
                        if summary.total_prs < previous.total_prs {
                            reframes.push(build_reframe(
                                ReframeKind::CompoundingGains,
                                "cycle_summary",
                                None,
                                day,
                            ));
                        }
                    }
                    // Slow progress after the fast newcomer phase.
                    let avg = summary.avg_strength_change_pct;
                    if avg > 0.0 && avg < 5.0 {
                        reframes.push(build_reframe(
                            ReframeKind::SlowCompounding,
                            "cycle_summary",
                            None,
                            day,
                        ));
                    }
                }
            }
        }
    }

    if stage < 3 {
        return reframes;
    }

    for state in game_states {
        if state.charge_up_count > 0 && state.work_set_count >= config.charge_up_min_work_sets {
            reframes.push(build_reframe(
                ReframeKind::PressureBuilding,
                "exercise",
                Some(&state.exercise),
                day,
            ));
        }
    }

    if bad_day_detected {
        reframes.push(build_reframe(ReframeKind::HigherLow, "workout_header", None, day));
    }

    for exercise in swapped_exercises {
        reframes.push(build_reframe(
            ReframeKind::SwapCounts,
            "exercise",
            Some(exercise),
            day,
        ));
    }

    reframes
}
