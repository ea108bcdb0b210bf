//! Simulated-annealing search over burn-to-slot assignments.
//!
//! Classic Metropolis scheme with geometric cooling: start from the
//! identity schedule (everyone gets what they asked for), propose
//! single-request moves and pairwise swaps, always accept improvements,
//! accept regressions with probability `exp(-delta / T)`, and return the
//! best assignment ever seen — never the final annealed state, which may
//! have just accepted an uphill move.

use crate::conflict::history::HistoricalSmokeIndex;
use crate::conflict::ConflictThresholds;
use crate::core_types::{BurnRequest, PlanningHorizon, WeatherObservation};
use crate::error::CoreError;
use crate::physics::PlumeGeometryBuilder;
use crate::schedule::cost::PairEvaluator;
use crate::schedule::{
    AnnealingConfig, ScheduleOutcome, ScheduledSlot, TerminationReason, TraceCheckpoint,
};
use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;
use tracing::debug;

/// Conflict-aware schedule optimizer.
///
/// Stateless between calls: every `optimize` invocation owns its own
/// candidate buffers, RNG, and best-found assignment, so independent
/// runs may execute concurrently.
#[derive(Debug, Clone, Default)]
pub struct ScheduleOptimizer {
    builder: PlumeGeometryBuilder,
    thresholds: ConflictThresholds,
    config: AnnealingConfig,
}

impl ScheduleOptimizer {
    #[must_use]
    pub fn new(
        builder: PlumeGeometryBuilder,
        thresholds: ConflictThresholds,
        config: AnnealingConfig,
    ) -> Self {
        Self {
            builder,
            thresholds,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Optimize a planning run.
    ///
    /// # Errors
    /// Validation errors (`InvalidRequest`, `MissingWeather`,
    /// `InvalidGeometry`) surface before any annealing work begins.
    /// Non-convergence is never an error: the best-found schedule and
    /// its cost are always returned.
    pub fn optimize(
        &self,
        requests: &[BurnRequest],
        observations: &[WeatherObservation],
        horizon: &PlanningHorizon,
    ) -> Result<ScheduleOutcome, CoreError> {
        self.optimize_with_history(requests, observations, horizon, None)
    }

    /// [`optimize`](Self::optimize) with an optional historical-incident
    /// index used to annotate the residual conflict records.
    ///
    /// # Errors
    /// Same contract as [`optimize`](Self::optimize).
    pub fn optimize_with_history(
        &self,
        requests: &[BurnRequest],
        observations: &[WeatherObservation],
        horizon: &PlanningHorizon,
        history: Option<&dyn HistoricalSmokeIndex>,
    ) -> Result<ScheduleOutcome, CoreError> {
        for request in requests {
            request.validate(horizon)?;
        }

        let slots = candidate_slots(requests, horizon, &self.config);
        let identity: Vec<usize> = requests
            .iter()
            .map(|request| {
                let slot = ScheduledSlot {
                    date: request.requested_date,
                    start: request.requested_start,
                };
                slots
                    .iter()
                    .position(|candidate| *candidate == slot)
                    .unwrap_or(0)
            })
            .collect();

        let evaluator = PairEvaluator::new(
            requests,
            observations,
            &slots,
            &self.builder,
            self.thresholds.clone(),
            self.config.weights.clone(),
        )?;

        // Degenerate inputs have no feasible neighbor: hand back the
        // identity schedule rather than failing.
        if requests.len() < 2 || slots.len() < 2 {
            return Ok(identity_outcome(requests, &slots, &identity, &evaluator, history));
        }

        Ok(self.anneal(requests, &slots, identity, &evaluator, history))
    }

    fn anneal(
        &self,
        requests: &[BurnRequest],
        slots: &[ScheduledSlot],
        identity: Vec<usize>,
        evaluator: &PairEvaluator<'_>,
        history: Option<&dyn HistoricalSmokeIndex>,
    ) -> ScheduleOutcome {
        let config = &self.config;
        let n = requests.len();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let started = Instant::now();

        let assigned = |indices: &[usize]| -> Vec<ScheduledSlot> {
            indices.iter().map(|&s| slots[s]).collect()
        };

        let mut current = identity.clone();
        let mut current_slots = assigned(&current);
        let initial_cost = evaluator.total_cost(&current_slots);
        let initial_conflicts = evaluator.conflict_count(&current_slots);

        let mut best = identity;
        let mut best_cost = initial_cost;
        let mut current_cost = initial_cost;

        let mut temperature = config.initial_temperature;
        let mut iterations = 0_u32;
        let mut termination = TerminationReason::IterationCapReached;
        let mut trace = Vec::new();
        let move_probability = config.move_probability.clamp(0.0, 1.0);

        for iteration in 0..config.max_iterations {
            if temperature < config.min_temperature {
                termination = TerminationReason::Converged;
                break;
            }
            if let Some(deadline) = config.deadline {
                if started.elapsed() >= deadline {
                    termination = TerminationReason::DeadlineExpired;
                    break;
                }
            }
            iterations = iteration + 1;

            let delta = if rng.random_bool(move_probability) {
                Some(propose_move(
                    &mut rng,
                    evaluator,
                    slots,
                    &mut current,
                    &mut current_slots,
                ))
            } else {
                propose_swap(&mut rng, evaluator, &mut current, &mut current_slots)
            };

            debug_assert_eq!(current.len(), n, "every request keeps exactly one slot");
            debug_assert!(current.iter().all(|&s| s < slots.len()));

            if let Some((delta, revert)) = delta {
                let accept =
                    delta < 0.0 || rng.random::<f64>() < (-delta / temperature).exp();
                if accept {
                    current_cost += delta;
                    if current_cost < best_cost {
                        best_cost = current_cost;
                        best.copy_from_slice(&current);
                    }
                } else {
                    revert_neighbor(&mut current, &mut current_slots, slots, revert);
                }
            }

            if let Some(interval) = config.trace_interval {
                if interval > 0 && iteration % interval == 0 {
                    trace.push(TraceCheckpoint {
                        iteration,
                        temperature,
                        current_cost,
                        best_cost,
                    });
                    debug!(
                        iteration,
                        temperature, current_cost, best_cost, "annealing checkpoint"
                    );
                }
            }

            temperature *= config.temperature_decay;
        }

        // Re-evaluate the best assignment exactly; the incrementally
        // tracked cost accumulates float error over the run.
        let best_slots = assigned(&best);
        let total_cost = evaluator.total_cost(&best_slots);
        let residual_conflicts = evaluator.records(&best_slots, history);
        let conflicts_remaining = residual_conflicts.len();

        ScheduleOutcome {
            assignments: assignment_map(requests, &best_slots),
            initial_cost,
            total_cost,
            iterations,
            conflicts_resolved: initial_conflicts.saturating_sub(conflicts_remaining),
            conflicts_remaining,
            residual_conflicts,
            termination,
            trace,
        }
    }
}

/// Move one random request to a different candidate slot. Returns the
/// cost delta and the revert instruction.
fn propose_move(
    rng: &mut StdRng,
    evaluator: &PairEvaluator<'_>,
    slots: &[ScheduledSlot],
    current: &mut [usize],
    current_slots: &mut [ScheduledSlot],
) -> (f64, Neighbor) {
    let n = current.len();
    let idx = rng.random_range(0..n);
    let old_slot_idx = current[idx];
    let mut new_slot_idx = rng.random_range(0..slots.len() - 1);
    if new_slot_idx >= old_slot_idx {
        new_slot_idx += 1;
    }

    let before = evaluator.deviation_cost(idx, current_slots[idx])
        + evaluator.conflict_cost_involving(idx, current_slots);

    current[idx] = new_slot_idx;
    current_slots[idx] = slots[new_slot_idx];

    let after = evaluator.deviation_cost(idx, current_slots[idx])
        + evaluator.conflict_cost_involving(idx, current_slots);

    (after - before, Neighbor::Move { idx, old_slot_idx })
}

/// Exchange the slots of two random requests.
fn propose_swap(
    rng: &mut StdRng,
    evaluator: &PairEvaluator<'_>,
    current: &mut [usize],
    current_slots: &mut [ScheduledSlot],
) -> Option<(f64, Neighbor)> {
    let n = current.len();
    let first = rng.random_range(0..n);
    let mut second = rng.random_range(0..n - 1);
    if second >= first {
        second += 1;
    }
    if current[first] == current[second] {
        // Swapping identical slots is a no-op neighbor.
        return None;
    }

    let shared = evaluator.pair_cost(first, current_slots[first], second, current_slots[second]);
    let before = evaluator.deviation_cost(first, current_slots[first])
        + evaluator.deviation_cost(second, current_slots[second])
        + evaluator.conflict_cost_involving(first, current_slots)
        + evaluator.conflict_cost_involving(second, current_slots)
        - shared; // the (first, second) pair was counted twice

    current.swap(first, second);
    current_slots.swap(first, second);

    let shared = evaluator.pair_cost(first, current_slots[first], second, current_slots[second]);
    let after = evaluator.deviation_cost(first, current_slots[first])
        + evaluator.deviation_cost(second, current_slots[second])
        + evaluator.conflict_cost_involving(first, current_slots)
        + evaluator.conflict_cost_involving(second, current_slots)
        - shared;

    Some((after - before, Neighbor::Swap { first, second }))
}

fn identity_outcome(
    requests: &[BurnRequest],
    slots: &[ScheduledSlot],
    identity: &[usize],
    evaluator: &PairEvaluator<'_>,
    history: Option<&dyn HistoricalSmokeIndex>,
) -> ScheduleOutcome {
    let identity_slots: Vec<ScheduledSlot> = identity.iter().map(|&s| slots[s]).collect();
    let cost = evaluator.total_cost(&identity_slots);
    let residual_conflicts = evaluator.records(&identity_slots, history);
    let conflicts_remaining = residual_conflicts.len();
    ScheduleOutcome {
        assignments: assignment_map(requests, &identity_slots),
        initial_cost: cost,
        total_cost: cost,
        iterations: 0,
        conflicts_resolved: 0,
        conflicts_remaining,
        residual_conflicts,
        termination: TerminationReason::Converged,
        trace: Vec::new(),
    }
}

/// Revert instruction for a rejected neighbor.
enum Neighbor {
    Move { idx: usize, old_slot_idx: usize },
    Swap { first: usize, second: usize },
}

fn revert_neighbor(
    current: &mut [usize],
    current_slots: &mut [ScheduledSlot],
    slots: &[ScheduledSlot],
    neighbor: Neighbor,
) {
    match neighbor {
        Neighbor::Move { idx, old_slot_idx } => {
            current[idx] = old_slot_idx;
            current_slots[idx] = slots[old_slot_idx];
        }
        Neighbor::Swap { first, second } => {
            current.swap(first, second);
            current_slots.swap(first, second);
        }
    }
}

/// The shared candidate slot list: horizon dates × permitted start
/// hours, plus every request's own identity slot so the initial
/// schedule is always representable exactly.
fn candidate_slots(
    requests: &[BurnRequest],
    horizon: &PlanningHorizon,
    config: &AnnealingConfig,
) -> Vec<ScheduledSlot> {
    let earliest = config.earliest_start_hour.min(23);
    let latest = config.latest_start_hour.min(23).max(earliest);

    let mut seen: FxHashSet<ScheduledSlot> = FxHashSet::default();
    let mut slots = Vec::new();

    for request in requests {
        let slot = ScheduledSlot {
            date: request.requested_date,
            start: request.requested_start,
        };
        if seen.insert(slot) {
            slots.push(slot);
        }
    }
    for date in horizon.dates() {
        for hour in earliest..=latest {
            let start = NaiveTime::from_hms_opt(hour, 0, 0)
                .expect("start hour clamped below 24");
            let slot = ScheduledSlot { date, start };
            if seen.insert(slot) {
                slots.push(slot);
            }
        }
    }
    slots
}

fn assignment_map(
    requests: &[BurnRequest],
    slots: &[ScheduledSlot],
) -> FxHashMap<String, ScheduledSlot> {
    requests
        .iter()
        .zip(slots)
        .map(|(request, slot)| (request.id.clone(), *slot))
        .collect()
}
