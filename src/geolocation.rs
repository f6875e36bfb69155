//! Geolocation capability seam
//!
//! Reimplements the platform's callback-style permission/position APIs as
//! a single asynchronous operation returning a tagged result, behind a
//! trait so the resolver can run against any position source.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::Coordinates;

/// Outcome of a pre-flight permission query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Prompt,
}

/// Coded failure from a position request, mirroring the platform codes
/// (permission-denied=1, position-unavailable=2, timeout=3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other,
}

/// Failure returned by a position request
#[derive(Debug, Clone, Error)]
#[error("position request failed: {message}")]
pub struct PositionError {
    /// Which way the request failed
    pub code: PositionErrorCode,
    /// Source-specific detail
    pub message: String,
}

impl PositionError {
    /// Create a new position error
    pub fn new<S: Into<String>>(code: PositionErrorCode, message: S) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// A successfully acquired position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Reported coordinates
    pub coordinates: Coordinates,
    /// Estimated accuracy radius in meters
    pub accuracy_m: f64,
}

/// Acquisition tuning parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionProfile {
    /// Request a precise fix rather than a coarse one
    pub high_accuracy: bool,
    /// How long a position request may take before it fails
    pub timeout: Duration,
    /// How stale a previously acquired position may be and still be reused
    pub max_cached_age: Duration,
}

impl AcquisitionProfile {
    /// Precise and impatient: the default profile
    #[must_use]
    pub fn strict() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_cached_age: Duration::ZERO,
        }
    }

    /// Relaxed settings for clients that fail spuriously under strict ones:
    /// coarse fix, long timeout, permissive caching
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            high_accuracy: false,
            timeout: Duration::from_secs(30),
            max_cached_age: Duration::from_secs(300),
        }
    }

    /// Select a profile from a client hint detected at startup
    #[must_use]
    pub fn for_client_hint(hint: Option<&str>) -> Self {
        match hint {
            Some(h) if h.to_lowercase().contains("firefox") => Self::lenient(),
            _ => Self::strict(),
        }
    }
}

/// Position source abstraction
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Whether the runtime offers this capability at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Pre-flight permission query; `None` when no query capability exists
    async fn query_permission(&self) -> Option<PermissionStatus>;

    /// Request the current position
    async fn current_position(
        &self,
        profile: &AcquisitionProfile,
    ) -> Result<Position, PositionError>;
}

#[async_trait]
impl<G: Geolocator + ?Sized> Geolocator for std::sync::Arc<G> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    async fn query_permission(&self) -> Option<PermissionStatus> {
        (**self).query_permission().await
    }

    async fn current_position(
        &self,
        profile: &AcquisitionProfile,
    ) -> Result<Position, PositionError> {
        (**self).current_position(profile).await
    }
}

#[async_trait]
impl<G: Geolocator + ?Sized> Geolocator for Box<G> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    async fn query_permission(&self) -> Option<PermissionStatus> {
        (**self).query_permission().await
    }

    async fn current_position(
        &self,
        profile: &AcquisitionProfile,
    ) -> Result<Position, PositionError> {
        (**self).current_position(profile).await
    }
}

/// Position source for environments without any geolocation capability
#[derive(Debug, Default)]
pub struct UnsupportedGeolocator;

#[async_trait]
impl Geolocator for UnsupportedGeolocator {
    fn is_supported(&self) -> bool {
        false
    }

    async fn query_permission(&self) -> Option<PermissionStatus> {
        None
    }

    async fn current_position(
        &self,
        _profile: &AcquisitionProfile,
    ) -> Result<Position, PositionError> {
        Err(PositionError::new(
            PositionErrorCode::Other,
            "geolocation capability is unavailable",
        ))
    }
}

// IP lookups are city-level at best
const IP_ACCURACY_M: f64 = 25_000.0;

/// IP-based position source backed by an ip-api.com style JSON endpoint
pub struct IpGeolocator {
    http: reqwest::Client,
    endpoint: String,
    cached: Mutex<Option<CachedPosition>>,
}

#[derive(Debug, Clone, Copy)]
struct CachedPosition {
    position: Position,
    acquired_at: Instant,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl IpGeolocator {
    /// Default public lookup endpoint
    pub const DEFAULT_ENDPOINT: &'static str = "http://ip-api.com/json";

    /// Build a locator against the default endpoint
    pub fn new() -> crate::Result<Self> {
        Self::with_endpoint(Self::DEFAULT_ENDPOINT.to_string())
    }

    /// Build a locator against a specific endpoint
    pub fn with_endpoint(endpoint: String) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            cached: Mutex::new(None),
        })
    }

    async fn lookup(&self) -> Result<Position, PositionError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| PositionError::new(PositionErrorCode::PositionUnavailable, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PositionError::new(
                PositionErrorCode::PositionUnavailable,
                format!("lookup failed with status {status}"),
            ));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| PositionError::new(PositionErrorCode::PositionUnavailable, e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Position {
                coordinates: Coordinates::new(lat, lon),
                accuracy_m: IP_ACCURACY_M,
            }),
            _ => Err(PositionError::new(
                PositionErrorCode::PositionUnavailable,
                body.message
                    .unwrap_or_else(|| "lookup returned no coordinates".to_string()),
            )),
        }
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn query_permission(&self) -> Option<PermissionStatus> {
        // IP lookup has no permission model, so there is nothing to pre-flight
        None
    }

    async fn current_position(
        &self,
        profile: &AcquisitionProfile,
    ) -> Result<Position, PositionError> {
        if profile.max_cached_age > Duration::ZERO {
            let cached = self.cached.lock().await;
            if let Some(entry) = cached.as_ref() {
                if entry.acquired_at.elapsed() <= profile.max_cached_age {
                    debug!("serving cached position");
                    return Ok(entry.position);
                }
            }
        }

        let position = tokio::time::timeout(profile.timeout, self.lookup())
            .await
            .map_err(|_| {
                warn!("position lookup exceeded {:?}", profile.timeout);
                PositionError::new(
                    PositionErrorCode::Timeout,
                    format!("no position within {:?}", profile.timeout),
                )
            })??;

        *self.cached.lock().await = Some(CachedPosition {
            position,
            acquired_at: Instant::now(),
        });
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_selection_by_client_hint() {
        let lenient = AcquisitionProfile::for_client_hint(Some(
            "Mozilla/5.0 (X11; Linux x86_64; rv:140.0) Gecko/20100101 Firefox/140.0",
        ));
        assert_eq!(lenient, AcquisitionProfile::lenient());
        assert!(!lenient.high_accuracy);
        assert!(lenient.timeout > AcquisitionProfile::strict().timeout);
        assert!(lenient.max_cached_age > Duration::ZERO);

        let strict = AcquisitionProfile::for_client_hint(Some(
            "Mozilla/5.0 (Macintosh) AppleWebKit/537.36 Chrome/138.0 Safari/537.36",
        ));
        assert_eq!(strict, AcquisitionProfile::strict());
        assert_eq!(AcquisitionProfile::for_client_hint(None), strict);
    }

    #[tokio::test]
    async fn test_unsupported_locator() {
        let locator = UnsupportedGeolocator;
        assert!(!locator.is_supported());
        assert_eq!(locator.query_permission().await, None);

        let err = locator
            .current_position(&AcquisitionProfile::strict())
            .await
            .unwrap_err();
        assert_eq!(err.code, PositionErrorCode::Other);
    }

    #[test]
    fn test_position_error_display() {
        let err = PositionError::new(PositionErrorCode::Timeout, "no position within 10s");
        assert_eq!(
            err.to_string(),
            "position request failed: no position within 10s"
        );
    }
}
