//! Physics of smoke transport: dispersion modeling and footprint geometry.

pub mod dispersion;
pub mod plume_geometry;

pub use dispersion::{build_profile, DispersionConfig, DispersionProfile};
pub use plume_geometry::{FootprintConfig, MapProjection, PlumeFootprint, PlumeGeometryBuilder};
