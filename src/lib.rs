//! Skycast - weather dashboard core
//!
//! This library resolves a user location (via a geolocation capability
//! with graceful fallback, or free-text search), retrieves current
//! conditions and a multi-day forecast from a weather data provider, and
//! normalizes them into one canonical report for presentation layers.

pub mod app;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod weather;

// Re-export core types for public API
pub use app::{App, AppState};
pub use config::SkycastConfig;
pub use error::{Endpoint, SkycastError};
pub use geolocation::{
    AcquisitionProfile, Geolocator, IpGeolocator, Position, PositionError, PositionErrorCode,
    UnsupportedGeolocator,
};
pub use models::{ConditionKind, Coordinates, ForecastDay, ResolvedLocation, WeatherReport};
pub use provider::WeatherApiClient;
pub use resolver::{LocationResolver, PermissionState, Resolution, ResolutionState};
pub use weather::{WeatherService, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkycastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
