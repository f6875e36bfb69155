//! Data models for the skycast core
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates, resolution results, and fallback constants
//! - Weather: the canonical report shape and condition categories

pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{
    Coordinates, ResolvedLocation, COORDINATE_EPSILON, FALLBACK_COORDINATES, FALLBACK_LABEL,
    PENDING_LABEL,
};
pub use weather::{ConditionKind, ForecastDay, WeatherReport};
