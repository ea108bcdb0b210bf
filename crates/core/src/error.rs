//! Error taxonomy for the burn schedule optimizer core (spec §7).
//!
//! Validation happens before any optimization work. Numerical degeneracy
//! in the physics clamps and warns rather than erroring; non-convergence
//! of the annealer is not an error; structural schedule corruption is a
//! debug-assert invariant violation, not a [`CoreError`].

use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned when intake is rejected before scheduling begins.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A fuel category string did not match the agricultural catalog.
    #[error("unknown fuel type: {0}")]
    InvalidFuelType(String),

    /// A stability-class letter was outside the Pasquill–Gifford A–F set.
    #[error("invalid stability class: {0}")]
    InvalidStabilityClass(String),

    /// A constructed plume footprint ring was degenerate.
    #[error("invalid geometry for request {id}: {reason}")]
    InvalidGeometry {
        /// Identifier of the request whose footprint was degenerate.
        id: String,
        /// Human-readable description of the degeneracy.
        reason: String,
    },

    /// A burn request failed per-field validation.
    #[error("invalid request {id}: field `{field}` {reason}")]
    InvalidRequest {
        /// Identifier of the offending request.
        id: String,
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of why the field is invalid.
        reason: String,
    },

    /// A candidate date carried no weather observation.
    #[error("missing weather observation for {date}")]
    MissingWeather {
        /// Date with no resolvable weather row.
        date: NaiveDate,
    },
}
