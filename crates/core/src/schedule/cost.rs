//! Candidate-schedule cost evaluation.
//!
//! All physics is precomputed: one footprint per (request, resolved
//! weather observation) pair, built before the first annealing
//! iteration. The hot loop then only pays for window arithmetic, hash
//! lookups, and polygon intersection on the temporally overlapping
//! pairs, and evaluates candidate moves by the delta over the affected
//! request's pairs.

use crate::conflict::history::HistoricalSmokeIndex;
use crate::conflict::{assess_pair, ConflictAnalyzer, ConflictRecord, ConflictThresholds};
use crate::core_types::{BurnRequest, TimeWindow, WeatherObservation, WeatherTable};
use crate::error::CoreError;
use crate::physics::{MapProjection, PlumeFootprint, PlumeGeometryBuilder};
use crate::schedule::{CostWeights, ScheduledSlot};
use chrono::Timelike;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

pub(crate) struct PairEvaluator<'a> {
    requests: &'a [BurnRequest],
    weather: WeatherTable<'a>,
    thresholds: ConflictThresholds,
    weights: CostWeights,
    /// Per request: footprint keyed by resolved weather observation
    /// index. Footprint windows in here are placeholders; evaluation
    /// always passes the candidate slot's real window.
    shapes: Vec<FxHashMap<usize, PlumeFootprint>>,
}

impl<'a> PairEvaluator<'a> {
    /// Precompute footprints for every request under every weather
    /// observation reachable from the candidate slot list.
    ///
    /// # Errors
    /// `CoreError::MissingWeather` when a candidate date has no
    /// observation at all; footprint construction errors pass through.
    pub(crate) fn new(
        requests: &'a [BurnRequest],
        observations: &'a [WeatherObservation],
        slots: &[ScheduledSlot],
        builder: &PlumeGeometryBuilder,
        thresholds: ConflictThresholds,
        weights: CostWeights,
    ) -> Result<Self, CoreError> {
        let weather = WeatherTable::new(observations);
        let projection = MapProjection::for_requests(requests);

        let mut shapes: Vec<FxHashMap<usize, PlumeFootprint>> =
            Vec::with_capacity(requests.len());
        for request in requests {
            let mut per_request: FxHashMap<usize, PlumeFootprint> = FxHashMap::default();
            for slot in slots {
                let obs_idx = weather
                    .resolve(slot.date, slot.start.hour())
                    .ok_or(CoreError::MissingWeather { date: slot.date })?;
                if let Entry::Vacant(entry) = per_request.entry(obs_idx) {
                    let window = slot_window(request, *slot);
                    let footprint =
                        builder.build(request, weather.get(obs_idx), window, &projection)?;
                    entry.insert(footprint);
                }
            }
            shapes.push(per_request);
        }

        Ok(Self {
            requests,
            weather,
            thresholds,
            weights,
            shapes,
        })
    }

    /// Deviation cost of one request occupying `slot`.
    pub(crate) fn deviation_cost(&self, idx: usize, slot: ScheduledSlot) -> f64 {
        let request = &self.requests[idx];
        let days_moved = (slot.date - request.requested_date).num_days() as f64;
        self.weights.deviation_cost(days_moved, request.priority)
    }

    /// Conflict cost contributed by the pair (i, j) under the given slots.
    pub(crate) fn pair_cost(
        &self,
        i: usize,
        slot_i: ScheduledSlot,
        j: usize,
        slot_j: ScheduledSlot,
    ) -> f64 {
        self.assess(i, slot_i, j, slot_j)
            .map_or(0.0, |assessment| {
                self.weights.severity_weight(assessment.severity)
            })
    }

    /// Conflict cost of every pair involving `idx` under `slots`.
    ///
    /// This is the delta-evaluation workhorse: a move only changes the
    /// pairs touching the moved request.
    pub(crate) fn conflict_cost_involving(&self, idx: usize, slots: &[ScheduledSlot]) -> f64 {
        (0..self.requests.len())
            .filter(|&other| other != idx)
            .map(|other| self.pair_cost(idx, slots[idx], other, slots[other]))
            .sum()
    }

    /// Full cost of a candidate assignment: Σ deviation + Σ conflict.
    /// The pairwise scan fans out across worker threads.
    pub(crate) fn total_cost(&self, slots: &[ScheduledSlot]) -> f64 {
        let deviation: f64 = (0..self.requests.len())
            .map(|idx| self.deviation_cost(idx, slots[idx]))
            .sum();
        let conflict: f64 = self
            .pair_indices()
            .par_iter()
            .map(|&(i, j)| self.pair_cost(i, slots[i], j, slots[j]))
            .sum();
        deviation + conflict
    }

    /// Number of conflicting pairs under `slots`.
    pub(crate) fn conflict_count(&self, slots: &[ScheduledSlot]) -> usize {
        self.pair_indices()
            .par_iter()
            .filter(|&&(i, j)| self.assess(i, slots[i], j, slots[j]).is_some())
            .count()
    }

    /// Audit records for every conflicting pair under `slots`.
    pub(crate) fn records(
        &self,
        slots: &[ScheduledSlot],
        history: Option<&dyn HistoricalSmokeIndex>,
    ) -> Vec<ConflictRecord> {
        let analyzer = match history {
            Some(index) => ConflictAnalyzer::new(self.thresholds.clone()).with_history(index),
            None => ConflictAnalyzer::new(self.thresholds.clone()),
        };
        self.pair_indices()
            .par_iter()
            .filter_map(|&(i, j)| {
                let assessment = self.assess(i, slots[i], j, slots[j])?;
                let (fp_i, fp_j) = (self.shape(i, slots[i])?, self.shape(j, slots[j])?);
                Some(analyzer.record_from(fp_i, fp_j, &assessment))
            })
            .collect()
    }

    fn assess(
        &self,
        i: usize,
        slot_i: ScheduledSlot,
        j: usize,
        slot_j: ScheduledSlot,
    ) -> Option<crate::conflict::PairAssessment> {
        let window_i = slot_window(&self.requests[i], slot_i);
        let window_j = slot_window(&self.requests[j], slot_j);
        // Reject on time before touching any geometry.
        if window_i.overlap_hours(&window_j) <= 0.0 {
            return None;
        }
        let fp_i = self.shape(i, slot_i)?;
        let fp_j = self.shape(j, slot_j)?;
        assess_pair(fp_i, fp_j, &window_i, &window_j, &self.thresholds)
    }

    fn shape(&self, idx: usize, slot: ScheduledSlot) -> Option<&PlumeFootprint> {
        let obs_idx = self.weather.resolve(slot.date, slot.start.hour())?;
        let shape = self.shapes[idx].get(&obs_idx);
        debug_assert!(shape.is_some(), "footprint cache must cover every candidate slot");
        shape
    }

    fn pair_indices(&self) -> Vec<(usize, usize)> {
        let n = self.requests.len();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect()
    }
}

/// The window a request occupies when assigned `slot`.
pub(crate) fn slot_window(request: &BurnRequest, slot: ScheduledSlot) -> TimeWindow {
    TimeWindow::from_start(slot.date.and_time(slot.start), request.duration_hours)
}
