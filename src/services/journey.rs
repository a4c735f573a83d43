// SPDX-License-Identifier: MIT

//! Journey and cycle-summary derivations: lifetime progress totals and the
//! end-of-cycle recap shown during a deload.

use std::sync::Arc;

use crate::config::Config;
use crate::db::RecordStore;
use crate::error::Result;
use crate::models::{round1, CycleSummary, JourneySummary, PreviousCycle, StrengthGains};
use crate::services::StrengthAnalyzer;

#[derive(Clone)]
pub struct JourneyService {
    store: Arc<dyn RecordStore>,
    config: Config,
    gains: StrengthAnalyzer,
}

impl JourneyService {
    pub fn new(store: Arc<dyn RecordStore>, config: Config, gains: StrengthAnalyzer) -> Self {
        Self {
            store,
            config,
            gains,
        }
    }

    /// End-of-cycle recap: PR count, average strength change, previous
    /// cycle comparison and lifetime compounding. `None` for users with no
    /// cycle state.
    pub fn cycle_summary(&self, user_id: &str) -> Result<Option<CycleSummary>> {
        let Some(cycle) = self.store.cycle_state(user_id)? else {
            return Ok(None);
        };

        let avg_strength_change_pct = self
            .gains
            .gains_since(user_id, cycle.cycle_started_at)?
            .map(|g: StrengthGains| g.avg_change_pct)
            .unwrap_or(0.0);

        // Per-cycle PR counts are not stored historically, so the previous
        // cycle's figure is reconstructed: every record before this cycle
        // started that was a strict best at its time counts as one PR.
        let previous_cycle = if cycle.cycle_number >= 2 {
            let earlier = self.store.lift_records(user_id, None, None)?;
            let mut prior_prs: u32 = 0;
            let mut any_earlier = false;
            let mut bests: std::collections::HashMap<String, f64> =
                std::collections::HashMap::new();
            for record in earlier
                .iter()
                .filter(|r| r.timestamp < cycle.cycle_started_at)
            {
                any_earlier = true;
                let best = bests
                    .entry(record.exercise.clone())
                    .or_insert(f64::NEG_INFINITY);
                if record.estimated_1rm > *best {
                    prior_prs += 1;
                    *best = record.estimated_1rm;
                }
            }
            any_earlier.then_some(PreviousCycle {
                total_prs: prior_prs,
                cycle_number: cycle.cycle_number - 1,
            })
        } else {
            None
        };

        let (compounding_total_pct, milestone) = self.compounding(user_id)?;

        Ok(Some(CycleSummary {
            total_prs: cycle.total_prs_this_cycle,
            avg_strength_change_pct,
            cycle_number: cycle.cycle_number,
            previous_cycle,
            compounding_total_pct,
            milestone,
        }))
    }

    /// Lifetime compounding: summed first e1RM vs summed current best,
    /// with the largest crossed milestone (100, 50 or 25 percent).
    fn compounding(&self, user_id: &str) -> Result<(Option<f64>, Option<u32>)> {
        let mut total_first = 0.0;
        let mut total_best = 0.0;
        for state in self.store.game_states(user_id)? {
            let Some(first) = state.first_e1rm.filter(|f| *f > 0.0) else {
                continue;
            };
            let Some(best) = self.store.best_e1rm(user_id, &state.exercise)? else {
                continue;
            };
            total_first += first;
            total_best += best;
        }

        if total_first <= 0.0 || total_best <= total_first {
            return Ok((None, None));
        }

        let pct = round1((total_best - total_first) / total_first * 100.0);
        let milestone = [100u32, 50, 25]
            .into_iter()
            .find(|threshold| pct >= f64::from(*threshold));
        Ok((Some(pct), milestone))
    }

    /// Lifetime journey totals, revealed from stage 2 onwards.
    ///
    /// Sums first and best e1RM across exercises with a recorded first
    /// value; `None` below stage 2 or before any exercise has data.
    pub fn journey_summary(&self, user_id: &str, stage: u8) -> Result<Option<JourneySummary>> {
        if stage < 2 {
            return Ok(None);
        }

        let mut total_first = 0.0;
        let mut total_best = 0.0;
        for state in self.store.game_states(user_id)? {
            let Some(first) = state.first_e1rm.filter(|f| *f > 0.0) else {
                continue;
            };
            let Some(best) = self.store.best_e1rm(user_id, &state.exercise)? else {
                continue;
            };
            total_first += first;
            total_best += best;
        }

        if total_first <= 0.0 {
            return Ok(None);
        }

        let change = (total_best - total_first) / total_first;

        // Highest threshold crossed wins; thresholds are configured
        // ascending.
        let mut milestone_crossed = None;
        for threshold in &self.config.milestone_thresholds {
            if change >= *threshold {
                milestone_crossed = Some(format!("{}%", (threshold * 100.0).round() as u32));
            }
        }

        let cycles_completed = self
            .store
            .cycle_state(user_id)?
            .map(|c| c.cycle_number.saturating_sub(1))
            .unwrap_or(0);

        Ok(Some(JourneySummary {
            total_first_e1rm: round1(total_first),
            total_best_e1rm: round1(total_best),
            total_change_pct: round1(change * 100.0),
            milestone_crossed,
            cycles_completed,
        }))
    }
}
