//! Core types and utilities

pub mod fuel;
pub mod request;
pub mod units;
pub mod weather;

pub use fuel::{FuelKind, FuelProperties};
pub use request::{BurnRequest, GeoPoint, PlanningHorizon, TimeWindow};
pub use units::{
    Degrees, Hectares, KilogramsPerSquareMeter, MetersPerSecond, MicrogramsPerCubicMeter, Percent,
};
pub use weather::{Insolation, StabilityClass, WeatherObservation, WeatherTable};
