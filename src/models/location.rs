//! Location models: coordinates, resolution results, fallback constants

use serde::{Deserialize, Serialize};

/// Fixed position substituted when real acquisition fails (New York City)
pub const FALLBACK_COORDINATES: Coordinates = Coordinates {
    latitude: 40.7128,
    longitude: -74.0060,
};

/// Display label used when coordinates match the fallback position
pub const FALLBACK_LABEL: &str = "New York, NY";

/// Placeholder shown until reverse geocoding resolves a proper name
pub const PENDING_LABEL: &str = "Current Location";

/// Tolerance in degrees for treating two coordinate pairs as the same place
pub const COORDINATE_EPSILON: f64 = 0.01;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components lie within `epsilon` degrees of `other`
    #[must_use]
    pub fn approx_eq(&self, other: &Coordinates, epsilon: f64) -> bool {
        (self.latitude - other.latitude).abs() <= epsilon
            && (self.longitude - other.longitude).abs() <= epsilon
    }

    /// Whether this pair matches the fallback constant within tolerance
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.approx_eq(&FALLBACK_COORDINATES, COORDINATE_EPSILON)
    }

    /// Format location as a coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A location the resolver has settled on, with a human-readable name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Where the location is
    pub coordinates: Coordinates,
    /// What to call it
    pub display_name: String,
}

impl ResolvedLocation {
    /// Name a location before reverse geocoding has run
    #[must_use]
    pub fn pending(coordinates: Coordinates) -> Self {
        let display_name = if coordinates.is_fallback() {
            FALLBACK_LABEL
        } else {
            PENDING_LABEL
        };
        Self {
            coordinates,
            display_name: display_name.to_string(),
        }
    }

    /// Create a location with a resolved name
    #[must_use]
    pub fn named(coordinates: Coordinates, display_name: String) -> Self {
        Self {
            coordinates,
            display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq_within_epsilon() {
        let a = Coordinates::new(40.7128, -74.0060);
        let b = Coordinates::new(40.7190, -74.0010);
        assert!(a.approx_eq(&b, COORDINATE_EPSILON));

        let c = Coordinates::new(40.7300, -74.0060);
        assert!(!a.approx_eq(&c, COORDINATE_EPSILON));
    }

    #[test]
    fn test_fallback_detection() {
        assert!(FALLBACK_COORDINATES.is_fallback());
        assert!(Coordinates::new(40.7100, -74.0100).is_fallback());
        assert!(!Coordinates::new(48.8566, 2.3522).is_fallback());
    }

    #[test]
    fn test_pending_labels() {
        let fallback = ResolvedLocation::pending(FALLBACK_COORDINATES);
        assert_eq!(fallback.display_name, FALLBACK_LABEL);

        let elsewhere = ResolvedLocation::pending(Coordinates::new(48.8566, 2.3522));
        assert_eq!(elsewhere.display_name, PENDING_LABEL);
    }

    #[test]
    fn test_format_coordinates() {
        let coords = Coordinates::new(40.7128, -74.006);
        assert_eq!(coords.format_coordinates(), "40.7128, -74.0060");
    }
}
