//! Error types and handling for the skycast core

use thiserror::Error;

/// Remote provider endpoint a failed request was issued against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CurrentConditions,
    Forecast,
    Geocoding,
    ReverseGeocoding,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Endpoint::CurrentConditions => "current conditions",
            Endpoint::Forecast => "forecast",
            Endpoint::Geocoding => "geocoding",
            Endpoint::ReverseGeocoding => "reverse geocoding",
        };
        write!(f, "{label}")
    }
}

/// Main error type for the skycast core
#[derive(Error, Debug)]
pub enum SkycastError {
    /// The runtime offers no geolocation capability at all
    #[error("geolocation is not supported in this environment")]
    CapabilityUnsupported,

    /// The user or OS refused the location permission
    #[error("location permission denied")]
    PermissionDenied,

    /// Position acquisition failed without a permission refusal
    #[error("position unavailable")]
    PositionUnavailable,

    /// Position acquisition timed out
    #[error("position request timed out")]
    AcquisitionTimeout,

    /// A remote weather/geocoding call returned a non-success status
    #[error("{endpoint} request failed with HTTP status {status}")]
    Provider { endpoint: Endpoint, status: u16 },

    /// A search term could not be resolved to any location
    #[error("no location found for \"{query}\"")]
    NotFound { query: String },

    /// Configuration-related errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// HTTP client construction or response decoding failures
    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// Transport-level failures from the retrying middleware stack
    #[error("network error: {source}")]
    Network {
        #[from]
        source: reqwest_middleware::Error,
    },
}

impl SkycastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new provider error
    #[must_use]
    pub fn provider(endpoint: Endpoint, status: u16) -> Self {
        Self::Provider { endpoint, status }
    }

    /// Create a new not-found error for a search term
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Get a user-friendly error message, pairing the failure with a
    /// remediation hint where one exists
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkycastError::CapabilityUnsupported => {
                "Geolocation is not supported on this device. Search for a city instead."
                    .to_string()
            }
            SkycastError::PermissionDenied => {
                "Location access was denied. Enable location permission and try again, or search for a city."
                    .to_string()
            }
            SkycastError::PositionUnavailable | SkycastError::AcquisitionTimeout => {
                "Could not determine your position. Using default location instead.".to_string()
            }
            SkycastError::Provider { .. } => {
                "Unable to retrieve weather data right now. Please try again.".to_string()
            }
            SkycastError::NotFound { query } => {
                format!("No location found for \"{query}\". Check the spelling and try again.")
            }
            SkycastError::Config { .. } => {
                "Configuration error. Please check your weather API key.".to_string()
            }
            SkycastError::Http { .. } | SkycastError::Network { .. } => {
                "Unable to connect to the weather service. Please check your internet connection."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = SkycastError::config("missing API key");
        assert!(matches!(config_err, SkycastError::Config { .. }));

        let not_found = SkycastError::not_found("Atlantis");
        assert!(matches!(not_found, SkycastError::NotFound { .. }));
    }

    #[test]
    fn test_provider_error_carries_status_and_endpoint() {
        let err = SkycastError::provider(Endpoint::Forecast, 502);
        assert_eq!(
            err.to_string(),
            "forecast request failed with HTTP status 502"
        );
        match err {
            SkycastError::Provider { endpoint, status } => {
                assert_eq!(endpoint, Endpoint::Forecast);
                assert_eq!(status, 502);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_user_messages() {
        let denied = SkycastError::PermissionDenied;
        assert!(denied.user_message().contains("denied"));

        let timeout = SkycastError::AcquisitionTimeout;
        assert!(
            timeout
                .user_message()
                .contains("Using default location instead.")
        );

        let not_found = SkycastError::not_found("Atlantis");
        assert!(not_found.user_message().contains("Atlantis"));
    }
}
