//! Burn requests and the planning-run envelope they are scheduled into.
//!
//! Requests arrive validated and persisted by the intake collaborator;
//! the core still re-checks the fields it depends on so one malformed
//! record fails loudly instead of corrupting a whole optimization run.

use crate::core_types::fuel::FuelKind;
use crate::core_types::units::{Hectares, KilogramsPerSquareMeter};
use crate::error::CoreError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another point in kilometers.
    #[must_use]
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Half-open interval [start, end) in naive local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Window starting at `start` and lasting `duration_hours`.
    #[must_use]
    pub fn from_start(start: NaiveDateTime, duration_hours: f64) -> Self {
        let seconds = (duration_hours * 3600.0).round() as i64;
        Self {
            start,
            end: start + Duration::seconds(seconds.max(0)),
        }
    }

    /// Hours the two windows overlap; 0 when disjoint or touching.
    #[must_use]
    pub fn overlap_hours(&self, other: &TimeWindow) -> f64 {
        let latest_start = self.start.max(other.start);
        let earliest_end = self.end.min(other.end);
        let overlap = (earliest_end - latest_start).num_seconds();
        if overlap <= 0 {
            0.0
        } else {
            overlap as f64 / 3600.0
        }
    }
}

/// The span of dates one optimization run schedules into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningHorizon {
    /// First schedulable date.
    pub start: NaiveDate,
    /// Number of schedulable days (>= 1).
    pub days: u32,
}

impl PlanningHorizon {
    #[must_use]
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self {
            start,
            days: days.max(1),
        }
    }

    /// Last schedulable date (inclusive).
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(self.days) - 1)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end()).contains(&date)
    }

    /// Every schedulable date in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let start = self.start;
        (0..i64::from(self.days)).map(move |offset| start + Duration::days(offset))
    }
}

/// One pending burn request, read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnRequest {
    /// Unique within a planning run.
    pub id: String,
    /// Field centroid.
    pub location: GeoPoint,
    /// Field area.
    pub area: Hectares,
    /// Fuel category, already parsed by intake.
    pub fuel: FuelKind,
    /// Fuel load on the ground.
    pub fuel_load: KilogramsPerSquareMeter,
    /// Date the requester asked for.
    pub requested_date: NaiveDate,
    /// Local start time the requester asked for.
    pub requested_start: NaiveTime,
    /// Burn duration in hours.
    pub duration_hours: f64,
    /// Externally computed priority score; the scale must be consistent
    /// across one run (see `CostWeights::max_priority`).
    pub priority: f64,
}

impl BurnRequest {
    /// The requester's preferred window.
    #[must_use]
    pub fn requested_window(&self) -> TimeWindow {
        TimeWindow::from_start(
            self.requested_date.and_time(self.requested_start),
            self.duration_hours,
        )
    }

    /// Check the invariants the core depends on: positive area and
    /// duration, sane coordinates, request date inside the horizon.
    ///
    /// # Errors
    /// `CoreError::InvalidRequest` naming the request and offending field.
    pub fn validate(&self, horizon: &PlanningHorizon) -> Result<(), CoreError> {
        if !(self.area.value() > 0.0) || !self.area.value().is_finite() {
            return Err(CoreError::InvalidRequest {
                id: self.id.clone(),
                field: "area",
                reason: format!("must be a positive finite number of hectares, got {}", self.area),
            });
        }
        if !(self.duration_hours > 0.0) || !self.duration_hours.is_finite() {
            return Err(CoreError::InvalidRequest {
                id: self.id.clone(),
                field: "duration_hours",
                reason: format!("must be positive and finite, got {}", self.duration_hours),
            });
        }
        if !(self.fuel_load.value() > 0.0) || !self.fuel_load.value().is_finite() {
            return Err(CoreError::InvalidRequest {
                id: self.id.clone(),
                field: "fuel_load",
                reason: format!("must be positive and finite, got {}", self.fuel_load),
            });
        }
        if self.location.lat.abs() > 90.0 || self.location.lon.abs() > 180.0 {
            return Err(CoreError::InvalidRequest {
                id: self.id.clone(),
                field: "location",
                reason: format!(
                    "({}, {}) is outside valid latitude/longitude bounds",
                    self.location.lat, self.location.lon
                ),
            });
        }
        if !horizon.contains(self.requested_date) {
            return Err(CoreError::InvalidRequest {
                id: self.id.clone(),
                field: "requested_date",
                reason: format!(
                    "{} is outside the planning horizon {}..={}",
                    self.requested_date,
                    horizon.start,
                    horizon.end()
                ),
            });
        }
        Ok(())
    }
}
