//! Burn Schedule Optimization Core
//!
//! Conflict-aware scheduling of agricultural field burns: a Gaussian
//! plume dispersion model predicts each burn's ground-level smoke
//! footprint, a pairwise conflict analyzer classifies dangerous overlap
//! between footprints, and a simulated-annealing optimizer assigns every
//! pending request a start slot minimizing conflict severity plus
//! deviation from the requested window.
//!
//! The crate is a pure in-process library: requests and weather arrive
//! by value, results leave by value, and no network or disk I/O happens
//! inside. Intake validation, persistence, weather fetching, priority
//! scoring, and notification delivery all belong to the surrounding
//! service.

// Core types and utilities
pub mod core_types;

// Error taxonomy
pub mod error;

// Smoke physics: dispersion model and footprint geometry
pub mod physics;

// Pairwise conflict analysis
pub mod conflict;

// Simulated-annealing schedule optimization
pub mod schedule;

// Re-export core types
pub use core_types::{
    BurnRequest, Degrees, FuelKind, FuelProperties, GeoPoint, Hectares, Insolation,
    KilogramsPerSquareMeter, MetersPerSecond, MicrogramsPerCubicMeter, Percent, PlanningHorizon,
    StabilityClass, TimeWindow, WeatherObservation, WeatherTable,
};

pub use error::CoreError;

// Re-export physics types
pub use physics::{
    build_profile, DispersionConfig, DispersionProfile, FootprintConfig, MapProjection,
    PlumeFootprint, PlumeGeometryBuilder,
};

// Re-export conflict analysis types
pub use conflict::history::{HistoricalMatch, HistoricalSmokeIndex, InMemoryIncidentIndex};
pub use conflict::{ConflictAnalyzer, ConflictRecord, ConflictSeverity, ConflictThresholds};

// Re-export optimizer types
pub use schedule::{
    AnnealingConfig, CostWeights, ScheduleOptimizer, ScheduleOutcome, ScheduledSlot,
    TerminationReason, TraceCheckpoint,
};
