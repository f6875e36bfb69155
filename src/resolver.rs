//! Location resolution state machine
//!
//! Drives permission negotiation and position acquisition against a
//! [`Geolocator`], substituting fixed fallback coordinates when
//! acquisition fails for any reason other than a permission refusal.
//! Failures reach the orchestrator as state, never as panics.

use tracing::{debug, info, warn};

use crate::error::SkycastError;
use crate::geolocation::{AcquisitionProfile, Geolocator, PermissionStatus, PositionErrorCode};
use crate::models::{Coordinates, FALLBACK_COORDINATES};

/// Advisory attached when acquisition degrades to the fallback position
pub const FALLBACK_ADVISORY: &str =
    "Could not determine your position. Using default location instead.";

/// Lifecycle of the location-permission negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Unasked,
    Granted,
    Denied,
    Fallback,
    Unsupported,
}

impl PermissionState {
    /// Whether this state comes with usable coordinates.
    ///
    /// `Fallback` counts: a substituted position behaves like a granted
    /// one for rendering purposes.
    #[must_use]
    pub fn has_position(self) -> bool {
        matches!(self, Self::Granted | Self::Fallback)
    }
}

/// Progress of the most recent resolution attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolutionState {
    Idle,
    CheckingPermission,
    AwaitingPosition,
    Resolved(Coordinates),
    Denied,
    Fallback(Coordinates),
    Unsupported,
}

/// Outcome published to the orchestrator after an attempt
#[derive(Debug)]
pub struct Resolution {
    /// Usable coordinates, real or substituted
    pub coordinates: Option<Coordinates>,
    /// Permission lifecycle after the attempt
    pub permission: PermissionState,
    /// Non-blocking notice for degraded-but-successful outcomes
    pub advisory: Option<String>,
    /// Blocking failure, when no coordinates could be produced
    pub error: Option<SkycastError>,
}

/// Permission/acquisition state machine over a position source
pub struct LocationResolver<G> {
    locator: G,
    profile: AcquisitionProfile,
    state: ResolutionState,
    permission: PermissionState,
    attempts: u32,
}

impl<G: Geolocator> LocationResolver<G> {
    /// Create a resolver over a position source
    pub fn new(locator: G, profile: AcquisitionProfile) -> Self {
        Self {
            locator,
            profile,
            state: ResolutionState::Idle,
            permission: PermissionState::Unasked,
            attempts: 0,
        }
    }

    /// Current machine state
    #[must_use]
    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Current permission lifecycle state
    #[must_use]
    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    /// Number of explicit resolution attempts so far (diagnostic only)
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run one explicit resolution attempt.
    ///
    /// Always restarts from the permission check, regardless of any
    /// prior terminal state.
    pub async fn request_position(&mut self) -> Resolution {
        self.attempts += 1;
        debug!(attempt = self.attempts, "starting location resolution");

        if !self.locator.is_supported() {
            info!("geolocation capability unavailable");
            self.state = ResolutionState::Unsupported;
            self.permission = PermissionState::Unsupported;
            return Resolution {
                coordinates: None,
                permission: self.permission,
                advisory: None,
                error: Some(SkycastError::CapabilityUnsupported),
            };
        }

        self.state = ResolutionState::CheckingPermission;
        if self.locator.query_permission().await == Some(PermissionStatus::Denied) {
            info!("permission already refused, skipping position request");
            return self.deny();
        }

        self.state = ResolutionState::AwaitingPosition;
        match self.locator.current_position(&self.profile).await {
            Ok(position) => {
                info!(
                    lat = position.coordinates.latitude,
                    lon = position.coordinates.longitude,
                    "position acquired"
                );
                self.state = ResolutionState::Resolved(position.coordinates);
                self.permission = PermissionState::Granted;
                Resolution {
                    coordinates: Some(position.coordinates),
                    permission: self.permission,
                    advisory: None,
                    error: None,
                }
            }
            Err(err) if err.code == PositionErrorCode::PermissionDenied => {
                info!("position request refused: {err}");
                self.deny()
            }
            Err(err) => {
                warn!("position request failed ({err}), substituting fallback coordinates");
                self.state = ResolutionState::Fallback(FALLBACK_COORDINATES);
                self.permission = PermissionState::Fallback;
                Resolution {
                    coordinates: Some(FALLBACK_COORDINATES),
                    permission: self.permission,
                    advisory: Some(FALLBACK_ADVISORY.to_string()),
                    error: None,
                }
            }
        }
    }

    fn deny(&mut self) -> Resolution {
        self.state = ResolutionState::Denied;
        self.permission = PermissionState::Denied;
        Resolution {
            coordinates: None,
            permission: self.permission,
            advisory: None,
            error: Some(SkycastError::PermissionDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::geolocation::{Position, PositionError};

    /// Position source whose answers are scripted per test
    #[derive(Default)]
    struct ScriptedLocator {
        supported: bool,
        permission: Option<PermissionStatus>,
        outcomes: Mutex<Vec<Result<Position, PositionError>>>,
        position_calls: AtomicU32,
    }

    impl ScriptedLocator {
        fn supported() -> Self {
            Self {
                supported: true,
                ..Self::default()
            }
        }

        fn with_outcome(outcome: Result<Position, PositionError>) -> Self {
            let locator = Self::supported();
            locator.outcomes.lock().unwrap().push(outcome);
            locator
        }
    }

    #[async_trait]
    impl Geolocator for ScriptedLocator {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn query_permission(&self) -> Option<PermissionStatus> {
            self.permission
        }

        async fn current_position(
            &self,
            _profile: &AcquisitionProfile,
        ) -> Result<Position, PositionError> {
            self.position_calls.fetch_add(1, Ordering::SeqCst);
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                panic!("unexpected position request");
            }
            outcomes.remove(0)
        }
    }

    fn position(lat: f64, lon: f64) -> Position {
        Position {
            coordinates: Coordinates::new(lat, lon),
            accuracy_m: 50.0,
        }
    }

    #[tokio::test]
    async fn test_unsupported_runtime_is_terminal() {
        let mut resolver =
            LocationResolver::new(ScriptedLocator::default(), AcquisitionProfile::strict());
        let resolution = resolver.request_position().await;

        assert_eq!(resolver.state(), ResolutionState::Unsupported);
        assert_eq!(resolver.permission(), PermissionState::Unsupported);
        assert!(resolution.coordinates.is_none());
        assert!(matches!(
            resolution.error,
            Some(SkycastError::CapabilityUnsupported)
        ));
    }

    #[tokio::test]
    async fn test_preflight_denial_never_requests_a_position() {
        let locator = Arc::new(ScriptedLocator {
            supported: true,
            permission: Some(PermissionStatus::Denied),
            ..ScriptedLocator::default()
        });
        let mut resolver =
            LocationResolver::new(locator.clone(), AcquisitionProfile::strict());
        let resolution = resolver.request_position().await;

        assert_eq!(locator.position_calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.state(), ResolutionState::Denied);
        assert_eq!(resolution.permission, PermissionState::Denied);
        assert!(matches!(
            resolution.error,
            Some(SkycastError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_successful_acquisition_resolves() {
        let locator = ScriptedLocator::with_outcome(Ok(position(48.8566, 2.3522)));
        let mut resolver = LocationResolver::new(locator, AcquisitionProfile::strict());
        let resolution = resolver.request_position().await;

        assert_eq!(
            resolver.state(),
            ResolutionState::Resolved(Coordinates::new(48.8566, 2.3522))
        );
        assert_eq!(resolution.permission, PermissionState::Granted);
        assert!(resolution.permission.has_position());
        assert!(resolution.advisory.is_none());
        assert!(resolution.error.is_none());
    }

    #[tokio::test]
    async fn test_timeout_substitutes_fallback_coordinates() {
        let locator = ScriptedLocator::with_outcome(Err(PositionError::new(
            PositionErrorCode::Timeout,
            "no position within 10s",
        )));
        let mut resolver = LocationResolver::new(locator, AcquisitionProfile::strict());
        let resolution = resolver.request_position().await;

        assert_eq!(
            resolver.state(),
            ResolutionState::Fallback(FALLBACK_COORDINATES)
        );
        assert_eq!(resolution.coordinates, Some(FALLBACK_COORDINATES));
        assert_eq!(resolution.permission, PermissionState::Fallback);
        assert!(resolution.permission.has_position());
        assert!(
            resolution
                .advisory
                .as_deref()
                .unwrap()
                .contains("Using default location instead.")
        );
        assert!(resolution.error.is_none());
    }

    #[tokio::test]
    async fn test_position_unavailable_also_falls_back() {
        let locator = ScriptedLocator::with_outcome(Err(PositionError::new(
            PositionErrorCode::PositionUnavailable,
            "no fix",
        )));
        let mut resolver = LocationResolver::new(locator, AcquisitionProfile::strict());
        let resolution = resolver.request_position().await;

        assert_eq!(resolution.coordinates, Some(FALLBACK_COORDINATES));
        assert_eq!(resolution.permission, PermissionState::Fallback);
    }

    #[tokio::test]
    async fn test_refused_position_request_is_denied() {
        let locator = ScriptedLocator::with_outcome(Err(PositionError::new(
            PositionErrorCode::PermissionDenied,
            "user refused",
        )));
        let mut resolver = LocationResolver::new(locator, AcquisitionProfile::strict());
        let resolution = resolver.request_position().await;

        assert_eq!(resolver.state(), ResolutionState::Denied);
        assert!(resolution.coordinates.is_none());
        assert!(matches!(
            resolution.error,
            Some(SkycastError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_new_request_restarts_from_terminal_state() {
        let locator = Arc::new(ScriptedLocator::supported());
        {
            let mut outcomes = locator.outcomes.lock().unwrap();
            outcomes.push(Err(PositionError::new(
                PositionErrorCode::PermissionDenied,
                "user refused",
            )));
            outcomes.push(Ok(position(52.52, 13.405)));
        }

        let mut resolver =
            LocationResolver::new(locator.clone(), AcquisitionProfile::strict());

        resolver.request_position().await;
        assert_eq!(resolver.state(), ResolutionState::Denied);
        assert_eq!(resolver.attempts(), 1);

        let resolution = resolver.request_position().await;
        assert_eq!(resolver.attempts(), 2);
        assert_eq!(resolution.coordinates, Some(Coordinates::new(52.52, 13.405)));
        assert_eq!(resolver.permission(), PermissionState::Granted);
        assert_eq!(locator.position_calls.load(Ordering::SeqCst), 2);
    }
}
