//! Conflict analysis between scheduled burns.
//!
//! Two burns conflict when their smoke footprints overlap in space AND
//! their burn windows overlap in time; either condition alone produces
//! no record. Combined exposure assumes independent, additive plumes
//! (linear superposition) — a stated modeling simplification, not
//! atmospheric chemistry. Groups larger than two are evaluated pairwise.

pub mod history;

use crate::core_types::TimeWindow;
use crate::physics::PlumeFootprint;
use geo::{Area, BooleanOps, BoundingRect, Centroid, Contains, Coord, Point, Rect};
use history::HistoricalSmokeIndex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Discrete danger classification of one conflicting pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    /// Footprints touch but exposure stays below every numeric rung.
    Low,
    /// Elevated combined exposure or non-trivial overlap.
    Medium,
    /// Unhealthy combined exposure, or large overlap between close burns.
    High,
    /// Hazardous exposure from large overlapping plumes with nearby sources.
    Critical,
}

/// Numeric rungs of the severity ladder.
///
/// Concentrations are µg/m³ PM2.5, overlap areas km², source distances
/// km. These are tunable policy, not physics; the defaults follow the
/// 35/55/150 short-term PM2.5 breakpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictThresholds {
    pub critical_concentration: f64,
    pub critical_overlap_km2: f64,
    pub critical_distance_km: f64,
    pub high_concentration: f64,
    pub high_overlap_km2: f64,
    pub high_distance_km: f64,
    pub medium_concentration: f64,
    pub medium_overlap_km2: f64,
}

impl Default for ConflictThresholds {
    fn default() -> Self {
        Self {
            critical_concentration: 150.0,
            critical_overlap_km2: 10.0,
            critical_distance_km: 5.0,
            high_concentration: 55.0,
            high_overlap_km2: 5.0,
            high_distance_km: 10.0,
            medium_concentration: 35.0,
            medium_overlap_km2: 1.0,
        }
    }
}

/// One conflicting pair, produced fresh per analysis and consumed
/// immediately by the optimizer's cost function or the caller's audit
/// trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Lexicographically smaller request id of the pair.
    pub first_id: String,
    /// Lexicographically larger request id of the pair.
    pub second_id: String,
    /// Footprint intersection area (km²).
    pub overlap_area_km2: f64,
    /// Burn window overlap (hours).
    pub overlap_hours: f64,
    /// Maximum summed ground-level concentration over the sampled
    /// representative points of the overlap region (µg/m³).
    pub combined_peak_concentration: f64,
    /// Great-circle distance between the two sources (km).
    pub source_distance_km: f64,
    pub severity: ConflictSeverity,
    /// Advisory similarity-weighted share of severe historical incidents
    /// near this pairing's feature vector; never affects `severity`.
    pub historical_risk: Option<f64>,
}

/// Severity ladder, evaluated top-down; first match wins.
#[must_use]
pub fn classify(
    thresholds: &ConflictThresholds,
    combined_concentration: f64,
    overlap_area_km2: f64,
    source_distance_km: f64,
) -> ConflictSeverity {
    if combined_concentration > thresholds.critical_concentration
        && overlap_area_km2 > thresholds.critical_overlap_km2
        && source_distance_km < thresholds.critical_distance_km
    {
        ConflictSeverity::Critical
    } else if combined_concentration > thresholds.high_concentration
        || (overlap_area_km2 > thresholds.high_overlap_km2
            && source_distance_km < thresholds.high_distance_km)
    {
        ConflictSeverity::High
    } else if combined_concentration > thresholds.medium_concentration
        || overlap_area_km2 > thresholds.medium_overlap_km2
    {
        ConflictSeverity::Medium
    } else {
        ConflictSeverity::Low
    }
}

/// Everything measured about one overlapping pair.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairAssessment {
    pub overlap_area_km2: f64,
    pub overlap_hours: f64,
    pub combined_peak_concentration: f64,
    pub source_distance_km: f64,
    pub severity: ConflictSeverity,
}

/// Assess two footprints against explicit windows.
///
/// The windows are passed separately so the optimizer can re-window a
/// cached footprint without rebuilding its geometry; the public analyzer
/// passes each footprint's own window.
pub(crate) fn assess_pair(
    a: &PlumeFootprint,
    b: &PlumeFootprint,
    window_a: &TimeWindow,
    window_b: &TimeWindow,
    thresholds: &ConflictThresholds,
) -> Option<PairAssessment> {
    let overlap_hours = window_a.overlap_hours(window_b);
    if overlap_hours <= 0.0 {
        return None;
    }

    // Cheap rejection before the polygon boolean op.
    let rect_a = a.polygon.bounding_rect()?;
    let rect_b = b.polygon.bounding_rect()?;
    if !rects_overlap(&rect_a, &rect_b) {
        return None;
    }

    let intersection = a.polygon.intersection(&b.polygon);
    let overlap_area_km2 = intersection.unsigned_area();
    if overlap_area_km2 <= 0.0 {
        return None;
    }

    // Representative points: the overlap centroid plus each plume's own
    // concentration maximum when it falls inside the overlap. Taking the
    // max over these keeps self-overlap maximal (a footprint fully
    // overlapping itself scores its true peak, not a diluted centroid).
    let mut combined_peak: f64 = 0.0;
    let mut sample = |point: Coord<f64>| {
        let summed = a.concentration_at(point) + b.concentration_at(point);
        combined_peak = combined_peak.max(summed);
    };
    if let Some(centroid) = intersection.centroid() {
        sample(centroid.0);
    }
    for candidate in [a.peak_xy, b.peak_xy] {
        if intersection.contains(&Point::from(candidate)) {
            sample(candidate);
        }
    }

    let source_distance_km = a.source.haversine_km(&b.source);
    let severity = classify(
        thresholds,
        combined_peak,
        overlap_area_km2,
        source_distance_km,
    );

    Some(PairAssessment {
        overlap_area_km2,
        overlap_hours,
        combined_peak_concentration: combined_peak,
        source_distance_km,
        severity,
    })
}

fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}

/// Stateless pairwise conflict analyzer for one working set of
/// footprints.
#[derive(Clone, Default)]
pub struct ConflictAnalyzer<'a> {
    thresholds: ConflictThresholds,
    history: Option<&'a dyn HistoricalSmokeIndex>,
}

impl std::fmt::Debug for ConflictAnalyzer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictAnalyzer")
            .field("thresholds", &self.thresholds)
            .field("history", &self.history.map(|_| "<index>"))
            .finish()
    }
}

impl<'a> ConflictAnalyzer<'a> {
    #[must_use]
    pub fn new(thresholds: ConflictThresholds) -> Self {
        Self {
            thresholds,
            history: None,
        }
    }

    /// Attach an optional nearest-neighbor index over past incidents.
    /// Matches annotate records with [`ConflictRecord::historical_risk`];
    /// they never change the severity classification.
    #[must_use]
    pub fn with_history(mut self, index: &'a dyn HistoricalSmokeIndex) -> Self {
        self.history = Some(index);
        self
    }

    #[must_use]
    pub fn thresholds(&self) -> &ConflictThresholds {
        &self.thresholds
    }

    /// Analyze one pair using each footprint's own window.
    #[must_use]
    pub fn analyze_pair(
        &self,
        a: &PlumeFootprint,
        b: &PlumeFootprint,
    ) -> Option<ConflictRecord> {
        let assessment = assess_pair(a, b, &a.window, &b.window, &self.thresholds)?;
        Some(self.record_from(a, b, &assessment))
    }

    /// Analyze every pair in a working set, fanning the O(n²) scan out
    /// across worker threads and fanning records back in.
    #[must_use]
    pub fn analyze_all(&self, footprints: &[PlumeFootprint]) -> Vec<ConflictRecord> {
        let n = footprints.len();
        if n < 2 {
            return Vec::new();
        }
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        pairs
            .par_iter()
            .filter_map(|&(i, j)| self.analyze_pair(&footprints[i], &footprints[j]))
            .collect()
    }

    pub(crate) fn record_from(
        &self,
        a: &PlumeFootprint,
        b: &PlumeFootprint,
        assessment: &PairAssessment,
    ) -> ConflictRecord {
        let (first_id, second_id) = if a.request_id <= b.request_id {
            (a.request_id.clone(), b.request_id.clone())
        } else {
            (b.request_id.clone(), a.request_id.clone())
        };
        let historical_risk = self.history.and_then(|index| {
            let feature = [
                assessment.source_distance_km,
                assessment.overlap_area_km2,
                assessment.combined_peak_concentration,
                assessment.overlap_hours,
            ];
            history::risk_score(index, &feature)
        });
        ConflictRecord {
            first_id,
            second_id,
            overlap_area_km2: assessment.overlap_area_km2,
            overlap_hours: assessment.overlap_hours,
            combined_peak_concentration: assessment.combined_peak_concentration,
            source_distance_km: assessment.source_distance_km,
            severity: assessment.severity,
            historical_risk,
        }
    }
}
