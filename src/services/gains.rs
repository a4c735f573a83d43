// SPDX-License-Identifier: MIT

//! Strength-gain analyzer: per-exercise and average e1RM change across a
//! time window.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::RecordStore;
use crate::error::Result;
use crate::models::{round1, ExerciseChange, StrengthGains};

/// Computes first-vs-latest e1RM change for every exercise with enough
/// data in a window, typically "since the current cycle started".
#[derive(Clone)]
pub struct StrengthAnalyzer {
    store: Arc<dyn RecordStore>,
}

impl StrengthAnalyzer {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Gains since the current cycle started, or `None` for users with no
    /// cycle state yet.
    pub fn cycle_gains(&self, user_id: &str) -> Result<Option<StrengthGains>> {
        let state = match self.store.cycle_state(user_id)? {
            Some(state) => state,
            None => return Ok(None),
        };
        self.gains_since(user_id, state.cycle_started_at)
    }

    /// Gains across an explicit window.
    ///
    /// An exercise qualifies with at least 2 records in the window and a
    /// positive first value (zero-baseline entries are degenerate and
    /// skipped). Returns `None` when nothing qualifies — "no data" is not
    /// the same as zero change.
    pub fn gains_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<StrengthGains>> {
        let records = self.store.lift_records(user_id, None, Some(since))?;
        if records.is_empty() {
            return Ok(None);
        }

        // (first, latest, count) per exercise; records arrive time-ascending.
        let mut by_exercise: BTreeMap<String, (f64, f64, usize)> = BTreeMap::new();
        for record in &records {
            by_exercise
                .entry(record.exercise.clone())
                .and_modify(|(_, latest, count)| {
                    *latest = record.estimated_1rm;
                    *count += 1;
                })
                .or_insert((record.estimated_1rm, record.estimated_1rm, 1));
        }

        let mut exercises: Vec<ExerciseChange> = by_exercise
            .into_iter()
            .filter(|(_, (first, _, count))| *count >= 2 && *first > 0.0)
            .map(|(name, (first, latest, _))| ExerciseChange {
                name,
                first_1rm: round1(first),
                latest_1rm: round1(latest),
                change_pct: round1((latest - first) / first * 100.0),
            })
            .collect();

        if exercises.is_empty() {
            return Ok(None);
        }

        // Unweighted across exercises: every exercise counts equally, no
        // matter how many sets it has.
        let avg = exercises.iter().map(|e| e.change_pct).sum::<f64>() / exercises.len() as f64;

        exercises.sort_by(|a, b| {
            b.change_pct
                .partial_cmp(&a.change_pct)
                .unwrap_or(Ordering::Equal)
        });

        Ok(Some(StrengthGains {
            exercises,
            avg_change_pct: round1(avg),
        }))
    }
}
