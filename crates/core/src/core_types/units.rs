//! Semantic unit types for the quantities passed across module seams.
//!
//! Newtype wrappers prevent accidental mixing of incompatible quantities
//! (a wind speed with a concentration, a bearing with a percentage).
//! All wrappers use f64: the Gaussian plume formulas are numerically
//! sensitive near their clamping floors and the cost of the extra
//! precision is irrelevant at this call volume.
//!
//! Constructors assert on physically impossible values; deserialized
//! input bypasses the constructors and is checked by
//! [`BurnRequest::validate`](crate::core_types::BurnRequest::validate)
//! before any physics runs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Compass direction in degrees, stored normalized to [0, 360).
///
/// Wind directions follow the meteorological "from" convention: a value
/// of 270 is a westerly (air moving toward the east).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f64);

impl Eq for Degrees {}

impl PartialOrd for Degrees {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Degrees {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Degrees {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Degrees {
    /// Create a bearing, wrapping any finite value into [0, 360).
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        Degrees(value.rem_euclid(360.0))
    }

    /// Raw value in degrees.
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// The reciprocal bearing (this direction plus 180°, wrapped).
    #[inline]
    #[must_use]
    pub fn reciprocal(self) -> Self {
        Degrees::new(self.0 + 180.0)
    }

    /// Convert to radians.
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

impl From<f64> for Degrees {
    fn from(v: f64) -> Self {
        Degrees::new(v)
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}°", self.0)
    }
}

/// Wind speed in meters per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

impl Eq for MetersPerSecond {}

impl PartialOrd for MetersPerSecond {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetersPerSecond {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for MetersPerSecond {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl MetersPerSecond {
    /// Create a wind speed. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= 0.0,
            "MetersPerSecond::new: negative wind speed is invalid"
        );
        MetersPerSecond(value)
    }

    /// Raw value in m/s.
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for MetersPerSecond {
    fn from(v: f64) -> Self {
        MetersPerSecond(v)
    }
}

impl fmt::Display for MetersPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} m/s", self.0)
    }
}

/// Field area in hectares.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hectares(f64);

impl Eq for Hectares {}

impl PartialOrd for Hectares {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hectares {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Hectares {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Hectares {
    /// Square meters per hectare.
    pub const SQUARE_METERS: f64 = 10_000.0;

    /// Create an area. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Hectares::new: negative area is invalid");
        Hectares(value)
    }

    /// Raw value in hectares.
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to square meters.
    #[inline]
    #[must_use]
    pub fn to_square_meters(self) -> f64 {
        self.0 * Self::SQUARE_METERS
    }
}

impl From<f64> for Hectares {
    fn from(v: f64) -> Self {
        Hectares(v)
    }
}

impl fmt::Display for Hectares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} ha", self.0)
    }
}

/// Fuel load per unit area in kg/m².
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilogramsPerSquareMeter(f64);

impl Eq for KilogramsPerSquareMeter {}

impl PartialOrd for KilogramsPerSquareMeter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KilogramsPerSquareMeter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for KilogramsPerSquareMeter {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl KilogramsPerSquareMeter {
    /// Typical cereal stubble load after harvest.
    pub const STUBBLE: KilogramsPerSquareMeter = KilogramsPerSquareMeter(0.45);

    /// Heavy windrowed residue.
    pub const WINDROWED: KilogramsPerSquareMeter = KilogramsPerSquareMeter(1.2);

    /// Create a fuel load. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= 0.0,
            "KilogramsPerSquareMeter::new: negative fuel load is invalid"
        );
        KilogramsPerSquareMeter(value)
    }

    /// Raw value in kg/m².
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for KilogramsPerSquareMeter {
    fn from(v: f64) -> Self {
        KilogramsPerSquareMeter(v)
    }
}

impl fmt::Display for KilogramsPerSquareMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} kg/m²", self.0)
    }
}

/// Ground-level pollutant concentration in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MicrogramsPerCubicMeter(f64);

impl Eq for MicrogramsPerCubicMeter {}

impl PartialOrd for MicrogramsPerCubicMeter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MicrogramsPerCubicMeter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for MicrogramsPerCubicMeter {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl MicrogramsPerCubicMeter {
    /// Create a concentration. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= 0.0,
            "MicrogramsPerCubicMeter::new: negative concentration is invalid"
        );
        MicrogramsPerCubicMeter(value)
    }

    /// Raw value in µg/m³.
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for MicrogramsPerCubicMeter {
    fn from(v: f64) -> Self {
        MicrogramsPerCubicMeter(v)
    }
}

impl fmt::Display for MicrogramsPerCubicMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} µg/m³", self.0)
    }
}

/// Relative value in percent, clamped to [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(f64);

impl Eq for Percent {}

impl PartialOrd for Percent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Percent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Percent {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Percent {
    /// Create a percentage, clamping into [0, 100].
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        Percent(value.clamp(0.0, 100.0))
    }

    /// Raw value in percent.
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// The value as a fraction in [0, 1].
    #[inline]
    #[must_use]
    pub fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl From<f64> for Percent {
    fn from(v: f64) -> Self {
        Percent::new(v)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}
