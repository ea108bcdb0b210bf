//! Schedule optimization over a planning horizon.
//!
//! The optimizer owns all of its run-scoped mutable state (current
//! candidate, temperature, best-found assignment) inside one
//! [`ScheduleOptimizer::optimize`] call; nothing survives between calls
//! and independent runs may execute concurrently.

pub mod annealing;
pub(crate) mod cost;

pub use annealing::ScheduleOptimizer;

use crate::conflict::{ConflictRecord, ConflictSeverity};
use chrono::{NaiveDate, NaiveTime};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Final assignment for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
}

/// Cost-function weights.
///
/// Conflict weights follow the severity ladder; the deviation term is
/// `|scheduled − requested| in days × (max_priority − priority)`, so a
/// low score (most important on a rank-like scale) makes date deviation
/// expensive and a score at `max_priority` makes it free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    /// Top of the priority scale used by this run's requests. Must match
    /// the intake scorer's scale ([1, 10] by default; set 100.0 for
    /// percentile scorers).
    pub max_priority: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            critical: 1000.0,
            high: 250.0,
            medium: 50.0,
            low: 10.0,
            max_priority: 10.0,
        }
    }
}

impl CostWeights {
    /// Cost contribution of one conflict at the given severity.
    #[must_use]
    pub fn severity_weight(&self, severity: ConflictSeverity) -> f64 {
        match severity {
            ConflictSeverity::Critical => self.critical,
            ConflictSeverity::High => self.high,
            ConflictSeverity::Medium => self.medium,
            ConflictSeverity::Low => self.low,
        }
    }

    /// Cost of moving a request `days_moved` from its requested date.
    #[must_use]
    pub fn deviation_cost(&self, days_moved: f64, priority: f64) -> f64 {
        days_moved.abs() * (self.max_priority - priority).max(0.0)
    }
}

/// Simulated-annealing parameters.
///
/// Defaults are tuned so that moderately worse candidates (delta within
/// a couple of conflict-weight steps) are frequently accepted early and
/// all but never accepted over the last quarter of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Starting temperature of the geometric cooling schedule.
    pub initial_temperature: f64,

    /// Per-iteration decay factor; `T_n = T_0 · decay^n`.
    pub temperature_decay: f64,

    /// Iteration budget for one optimization run.
    pub max_iterations: u32,

    /// Temperature below which the run is considered converged.
    pub min_temperature: f64,

    /// Probability a neighbor is a single-request move; the remainder
    /// are pairwise slot swaps.
    pub move_probability: f64,

    /// RNG seed; identical inputs and seed reproduce the run exactly.
    pub seed: u64,

    /// Optional wall-clock budget. Expiry is a cancellation, not an
    /// error: the best-found schedule so far is returned.
    pub deadline: Option<Duration>,

    /// Emit a diagnostic trace checkpoint every this many iterations;
    /// `None` disables tracing.
    pub trace_interval: Option<u32>,

    /// First permitted burn start hour (inclusive).
    pub earliest_start_hour: u32,

    /// Last permitted burn start hour (inclusive).
    pub latest_start_hour: u32,

    pub weights: CostWeights,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 500.0,
            temperature_decay: 0.995,
            max_iterations: 1000,
            min_temperature: 1e-3,
            move_probability: 0.7,
            seed: 0,
            deadline: None,
            trace_interval: Some(100),
            earliest_start_hour: 8,
            latest_start_hour: 16,
            weights: CostWeights::default(),
        }
    }
}

/// Why the annealing loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Temperature fell below the negligible threshold.
    Converged,
    /// The iteration budget ran out.
    IterationCapReached,
    /// The wall-clock budget ran out.
    DeadlineExpired,
}

/// One diagnostic trace sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TraceCheckpoint {
    pub iteration: u32,
    pub temperature: f64,
    pub current_cost: f64,
    pub best_cost: f64,
}

/// Result of one optimization run: the best-found schedule plus the
/// summary statistics callers need to judge it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Best-found slot per request id.
    pub assignments: FxHashMap<String, ScheduledSlot>,
    /// Cost of the identity schedule the search started from.
    pub initial_cost: f64,
    /// Cost of the returned schedule (always <= `initial_cost`).
    pub total_cost: f64,
    /// Annealing iterations actually executed.
    pub iterations: u32,
    /// Conflicts present initially but absent from the final schedule.
    pub conflicts_resolved: usize,
    /// Conflicts still present in the final schedule.
    pub conflicts_remaining: usize,
    /// Audit records for the remaining conflicts.
    pub residual_conflicts: Vec<ConflictRecord>,
    pub termination: TerminationReason,
    /// Diagnostic trace (empty when tracing is disabled).
    pub trace: Vec<TraceCheckpoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_weights_are_ordered() {
        let weights = CostWeights::default();
        assert!(
            weights.severity_weight(ConflictSeverity::Critical)
                > weights.severity_weight(ConflictSeverity::High)
        );
        assert!(
            weights.severity_weight(ConflictSeverity::High)
                > weights.severity_weight(ConflictSeverity::Medium)
        );
        assert!(
            weights.severity_weight(ConflictSeverity::Medium)
                > weights.severity_weight(ConflictSeverity::Low)
        );
    }

    #[test]
    fn deviation_cost_scales_with_priority_headroom() {
        let weights = CostWeights::default();
        // Priority 1 (most protected on the rank scale) pays 9 per day.
        assert_eq!(weights.deviation_cost(2.0, 1.0), 18.0);
        // Priority at the top of the scale moves for free.
        assert_eq!(weights.deviation_cost(2.0, 10.0), 0.0);
        // Scores beyond the configured scale never go negative.
        assert_eq!(weights.deviation_cost(2.0, 15.0), 0.0);
    }
}
