//! Plume footprint construction.
//!
//! Turns a dispersion profile into a closed 2-D polygon approximating the
//! region where ground-level concentration exceeds a safety floor. The
//! footprint lives in a planar local frame (kilometers east/north of a
//! shared reference point) so polygon intersection areas downstream are
//! meaningful; the source's original coordinates ride along for
//! great-circle distance checks.

use crate::core_types::{
    BurnRequest, Degrees, GeoPoint, TimeWindow, WeatherObservation,
};
use crate::error::CoreError;
use crate::physics::dispersion::{build_profile, DispersionConfig, DispersionProfile};
use geo::{Area, Contains, Coord, LineString, Point, Polygon};
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

const KM_PER_DEG_LAT: f64 = 111.32;

/// Tunable parameters of footprint construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintConfig {
    /// Concentration below which ground-level smoke no longer counts
    /// toward the footprint (µg/m³). Default is 10% of the critical
    /// short-term PM2.5 threshold.
    pub concentration_floor: f64,

    /// Wind speeds below this (m/s) produce a circular footprint instead
    /// of a zero-width wedge.
    pub calm_wind_threshold: f64,

    /// Footprint half-width in multiples of σy (2.0 ≈ 95% of the
    /// crosswind concentration envelope).
    pub lateral_spread_sigmas: f64,

    /// Centerline sampling step for the dispersal radius search (m).
    pub radius_step_m: f64,

    /// Hard cap on the dispersal radius search (m).
    pub max_range_m: f64,

    /// Downwind stations per wedge flank. The ring has
    /// `2 × stations + 1` vertices.
    pub stations: usize,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            concentration_floor: 15.0,
            calm_wind_threshold: 0.5,
            lateral_spread_sigmas: 2.0,
            radius_step_m: 250.0,
            max_range_m: 30_000.0,
            stations: 6,
        }
    }
}

/// Shared equirectangular tangent plane for one planning run.
///
/// Every footprint in a run is projected through the same instance, so
/// their coordinates are mutually comparable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapProjection {
    pub ref_lat: f64,
    pub ref_lon: f64,
}

impl MapProjection {
    /// Center the projection on the mean of the run's burn locations.
    #[must_use]
    pub fn for_requests(requests: &[BurnRequest]) -> Self {
        if requests.is_empty() {
            return Self {
                ref_lat: 0.0,
                ref_lon: 0.0,
            };
        }
        let n = requests.len() as f64;
        let (lat_sum, lon_sum) = requests.iter().fold((0.0, 0.0), |acc, r| {
            (acc.0 + r.location.lat, acc.1 + r.location.lon)
        });
        Self {
            ref_lat: lat_sum / n,
            ref_lon: lon_sum / n,
        }
    }

    /// Project a point into local kilometers east/north of the reference.
    #[must_use]
    pub fn project(&self, point: GeoPoint) -> Coord<f64> {
        let km_per_deg_lon = KM_PER_DEG_LAT * self.ref_lat.to_radians().cos().abs().max(0.01);
        Coord {
            x: (point.lon - self.ref_lon) * km_per_deg_lon,
            y: (point.lat - self.ref_lat) * KM_PER_DEG_LAT,
        }
    }
}

/// Downwind smoke footprint of one burn under one weather observation,
/// tagged with the originating request and its scheduled time interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlumeFootprint {
    /// Originating burn request.
    pub request_id: String,
    /// Source location as supplied by intake.
    pub source: GeoPoint,
    /// Source in the run's shared planar frame (km).
    pub source_xy: Coord<f64>,
    /// Direction the plume travels toward (wind direction + 180°).
    pub downwind_bearing: Degrees,
    /// Closed ring bounding the above-floor concentration region (km).
    pub polygon: Polygon<f64>,
    /// Scheduled interval `[start, start + duration)`.
    pub window: TimeWindow,
    /// The dispersion profile that generated this footprint.
    pub profile: DispersionProfile,
    /// Location of the centerline concentration maximum (km frame).
    pub peak_xy: Coord<f64>,
    /// Centerline concentration maximum (µg/m³).
    pub peak_concentration: f64,
    /// True when the calm-wind circular fallback was used.
    calm: bool,
}

impl PlumeFootprint {
    /// Footprint area in km².
    #[must_use]
    pub fn area_km2(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    /// This burn's ground-level concentration contribution (µg/m³) at a
    /// point in the run's planar frame.
    ///
    /// Points upwind of the source contribute nothing; under calm-wind
    /// fallback the plume is radially symmetric.
    #[must_use]
    pub fn concentration_at(&self, point: Coord<f64>) -> f64 {
        let delta_m = Vector2::new(
            (point.x - self.source_xy.x) * 1000.0,
            (point.y - self.source_xy.y) * 1000.0,
        );
        let (x_m, y_m) = if self.calm {
            (delta_m.norm(), 0.0)
        } else {
            let dir = bearing_vector(self.downwind_bearing);
            let perp = Vector2::new(dir.y, -dir.x);
            (delta_m.dot(&dir), delta_m.dot(&perp))
        };
        self.profile.concentration(x_m, y_m).value()
    }

    /// Whether a planar-frame point lies inside the footprint ring.
    #[must_use]
    pub fn covers(&self, point: Coord<f64>) -> bool {
        self.polygon.contains(&Point::from(point))
    }
}

/// Stateless footprint builder pairing the two physics configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlumeGeometryBuilder {
    pub dispersion: DispersionConfig,
    pub footprint: FootprintConfig,
}

impl PlumeGeometryBuilder {
    #[must_use]
    pub fn new(dispersion: DispersionConfig, footprint: FootprintConfig) -> Self {
        Self {
            dispersion,
            footprint,
        }
    }

    /// Build the footprint for one burn in one candidate window.
    ///
    /// # Errors
    /// `CoreError::InvalidGeometry` when the constructed ring is
    /// degenerate (zero area), which indicates an upstream bug rather
    /// than a schedulable condition.
    pub fn build(
        &self,
        request: &BurnRequest,
        weather: &WeatherObservation,
        window: TimeWindow,
        projection: &MapProjection,
    ) -> Result<PlumeFootprint, CoreError> {
        let profile = build_profile(request, weather, &self.dispersion);
        let source_xy = projection.project(request.location);
        let downwind_bearing = weather.wind_direction.reciprocal();
        let calm = *weather.wind_speed < self.footprint.calm_wind_threshold;

        let scan = scan_centerline(&profile, &self.footprint);
        // The footprint never collapses below the burning field itself.
        let field_radius_m = (request.area.to_square_meters() / std::f64::consts::PI).sqrt();
        let radius_m = scan.radius_m.max(field_radius_m);

        let dir = bearing_vector(downwind_bearing);
        let polygon = if calm {
            circle_ring(source_xy, radius_m / 1000.0)
        } else {
            wedge_ring(source_xy, dir, radius_m, &profile, &self.footprint)
        };

        if polygon.exterior().0.len() < 4 || polygon.unsigned_area() <= 0.0 {
            return Err(CoreError::InvalidGeometry {
                id: request.id.clone(),
                reason: format!(
                    "footprint ring degenerate (radius {radius_m} m, {} vertices)",
                    polygon.exterior().0.len()
                ),
            });
        }

        let peak_xy = Coord {
            x: source_xy.x + dir.x * scan.peak_x_m / 1000.0,
            y: source_xy.y + dir.y * scan.peak_x_m / 1000.0,
        };

        Ok(PlumeFootprint {
            request_id: request.id.clone(),
            source: request.location,
            source_xy,
            downwind_bearing,
            polygon,
            window,
            profile,
            peak_xy,
            peak_concentration: scan.peak_concentration,
            calm,
        })
    }
}

/// Unit vector for a compass bearing (clockwise from north) in the
/// east/north planar frame.
fn bearing_vector(bearing: Degrees) -> Vector2<f64> {
    // Rotation2 is counterclockwise-positive; compass bearings run
    // clockwise from the +y (north) axis.
    Rotation2::new(-bearing.to_radians()) * Vector2::new(0.0, 1.0)
}

struct CenterlineScan {
    radius_m: f64,
    peak_x_m: f64,
    peak_concentration: f64,
}

/// Walk the centerline outward, locate the concentration peak, then find
/// where the profile falls below the floor and refine by bisection.
///
/// Elevated releases start below the floor near the source (the plume
/// has not yet mixed down), so the search only begins looking for the
/// falling edge after the peak has been passed.
fn scan_centerline(profile: &DispersionProfile, config: &FootprintConfig) -> CenterlineScan {
    let floor = config.concentration_floor;
    let step = config.radius_step_m.max(1.0);

    let mut peak_x_m = step;
    let mut peak_concentration = 0.0;
    let mut above_floor_at: Option<f64> = None;
    let mut radius_m = 0.0;

    let mut x = step;
    while x <= config.max_range_m {
        let c = profile.centerline_concentration(x).value();
        if c > peak_concentration {
            peak_concentration = c;
            peak_x_m = x;
        }
        if c >= floor {
            above_floor_at = Some(x);
        } else if let Some(inside) = above_floor_at {
            // Falling edge bracketed between `inside` and `x`.
            radius_m = bisect_floor_crossing(profile, floor, inside, x);
            break;
        }
        x += step;
    }

    if radius_m == 0.0 {
        // Either the plume never reached the floor (tiny burn) or it was
        // still above the floor at max range.
        radius_m = above_floor_at.map_or(0.0, |_| config.max_range_m);
    }

    CenterlineScan {
        radius_m,
        peak_x_m,
        peak_concentration,
    }
}

/// Bisection between a point above the floor and one below it.
fn bisect_floor_crossing(profile: &DispersionProfile, floor: f64, lo: f64, hi: f64) -> f64 {
    let mut lo = lo;
    let mut hi = hi;
    for _ in 0..32 {
        let mid = f64::midpoint(lo, hi);
        if profile.centerline_concentration(mid).value() >= floor {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    f64::midpoint(lo, hi)
}

/// Wedge-shaped ring: apex at the source, flanks at ±`lateral_spread_sigmas`
/// × σy sampled at evenly spaced downwind stations.
fn wedge_ring(
    source_xy: Coord<f64>,
    dir: Vector2<f64>,
    radius_m: f64,
    profile: &DispersionProfile,
    config: &FootprintConfig,
) -> Polygon<f64> {
    let stations = config.stations.max(2);
    let perp = Vector2::new(dir.y, -dir.x);

    let mut ring: Vec<Coord<f64>> = Vec::with_capacity(2 * stations + 2);
    ring.push(source_xy);

    // Left flank outward.
    for k in 1..=stations {
        let x_m = radius_m * k as f64 / stations as f64;
        let half_km = config.lateral_spread_sigmas * profile.sigma_y(x_m) / 1000.0;
        let along = dir * (x_m / 1000.0);
        ring.push(Coord {
            x: source_xy.x + along.x - perp.x * half_km,
            y: source_xy.y + along.y - perp.y * half_km,
        });
    }
    // Right flank back toward the apex.
    for k in (1..=stations).rev() {
        let x_m = radius_m * k as f64 / stations as f64;
        let half_km = config.lateral_spread_sigmas * profile.sigma_y(x_m) / 1000.0;
        let along = dir * (x_m / 1000.0);
        ring.push(Coord {
            x: source_xy.x + along.x + perp.x * half_km,
            y: source_xy.y + along.y + perp.y * half_km,
        });
    }

    Polygon::new(LineString::new(ring), vec![])
}

/// Calm-air fallback: a 16-vertex circle centered on the source.
fn circle_ring(source_xy: Coord<f64>, radius_km: f64) -> Polygon<f64> {
    const VERTICES: usize = 16;
    let ring = (0..VERTICES)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / VERTICES as f64;
            Coord {
                x: source_xy.x + radius_km * angle.cos(),
                y: source_xy.y + radius_km * angle.sin(),
            }
        })
        .collect::<Vec<_>>();
    Polygon::new(LineString::new(ring), vec![])
}
