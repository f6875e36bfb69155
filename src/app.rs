//! Application orchestrator
//!
//! Owns the top-level dashboard state and wires resolver output into
//! weather fetches. State is mutated only by the orchestrator's own
//! handlers; every fetch takes a sequence ticket at initiation, and a
//! completion holding a stale ticket is discarded so an earlier-sent,
//! later-arriving response never overwrites a newer one.

use tracing::{debug, info, warn};

use crate::Result;
use crate::geolocation::Geolocator;
use crate::models::{Coordinates, FALLBACK_COORDINATES, WeatherReport};
use crate::resolver::{LocationResolver, PermissionState, Resolution};
use crate::weather::WeatherSource;

/// Top-level mutable dashboard state consumed by renderers
#[derive(Debug, Default)]
pub struct AppState {
    /// Current search box contents
    pub query: String,
    /// Last successfully resolved report, if any
    pub report: Option<WeatherReport>,
    /// A fetch is in flight
    pub loading: bool,
    /// User-visible error or advisory message
    pub error: Option<String>,
}

/// Application orchestrator
pub struct App<G, S> {
    resolver: LocationResolver<G>,
    weather: S,
    state: AppState,
    /// Sequence number of the most recently initiated fetch
    seq: u64,
    prompt_dismissed: bool,
}

impl<G: Geolocator, S: WeatherSource> App<G, S> {
    /// Wire a resolver and a weather source together
    pub fn new(resolver: LocationResolver<G>, weather: S) -> Self {
        Self {
            resolver,
            weather,
            state: AppState::default(),
            seq: 0,
            prompt_dismissed: false,
        }
    }

    /// Current dashboard state
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The location resolver, for permission display
    #[must_use]
    pub fn resolver(&self) -> &LocationResolver<G> {
        &self.resolver
    }

    /// Whether the first-load permission prompt should be shown.
    ///
    /// True until the user has answered it or a resolution attempt has
    /// moved the permission lifecycle past `Unasked`.
    #[must_use]
    pub fn prompt_required(&self) -> bool {
        !self.prompt_dismissed && self.resolver.permission() == PermissionState::Unasked
    }

    /// User accepted the permission prompt
    pub async fn accept_prompt(&mut self) {
        self.prompt_dismissed = true;
        self.request_location().await;
    }

    /// User declined the prompt: show the default location without
    /// touching permission state
    pub async fn decline_prompt(&mut self) {
        self.prompt_dismissed = true;
        info!("permission prompt declined, showing default location");
        self.on_location_resolved(FALLBACK_COORDINATES).await;
    }

    /// Explicit user request to resolve the current location
    pub async fn request_location(&mut self) {
        let resolution = self.resolver.request_position().await;
        match resolution.coordinates {
            Some(coords) => {
                self.on_location_resolved(coords).await;
                // Attached after the fetch so the success path's error
                // clear does not wipe a degraded-acquisition notice.
                if let Some(advisory) = resolution.advisory {
                    self.state.error = Some(advisory);
                }
            }
            None => self.fail_resolution(&resolution),
        }
    }

    fn fail_resolution(&mut self, resolution: &Resolution) {
        let message = resolution
            .error
            .as_ref()
            .map(crate::SkycastError::user_message)
            .unwrap_or_else(|| "Location could not be resolved.".to_string());
        warn!("location resolution failed: {message}");

        if self.state.report.is_none() {
            self.state.report = Some(WeatherReport::fallback());
        }
        self.state.error = Some(message);
    }

    /// Coordinates became available; fetch and publish a fresh report
    pub async fn on_location_resolved(&mut self, coords: Coordinates) {
        let ticket = self.begin_fetch();
        let (outcome, name) = futures::join!(
            self.weather.report_for(coords),
            self.weather.display_name(coords),
        );
        self.apply_fetch_outcome(
            ticket,
            outcome.map(|mut report| {
                report.location = name;
                report
            }),
        );
    }

    /// Search box submission
    pub async fn on_search_submit(&mut self, text: &str) {
        let query = text.trim();
        if query.is_empty() {
            debug!("ignoring blank search submission");
            return;
        }

        info!("searching for '{query}'");
        let ticket = self.begin_fetch();
        let outcome = self.weather.report_for_city(query).await;
        self.apply_search_outcome(ticket, outcome);
    }

    fn begin_fetch(&mut self) -> u64 {
        self.seq += 1;
        self.state.loading = true;
        self.seq
    }

    /// True when no newer fetch has been initiated since `ticket`
    fn is_current(&self, ticket: u64) -> bool {
        ticket == self.seq
    }

    fn apply_fetch_outcome(&mut self, ticket: u64, outcome: Result<WeatherReport>) {
        if !self.is_current(ticket) {
            debug!("discarding stale fetch result");
            return;
        }
        self.state.loading = false;

        match outcome {
            Ok(report) => {
                self.state.report = Some(report);
                self.state.error = None;
            }
            Err(err) if self.state.report.is_none() => {
                warn!("weather fetch failed with no data held: {err}");
                self.state.report = Some(WeatherReport::fallback());
                self.state.error = Some(err.user_message());
            }
            Err(err) => {
                // A working view is on screen; do not regress it
                warn!("weather fetch failed, keeping last report: {err}");
            }
        }
    }

    fn apply_search_outcome(&mut self, ticket: u64, outcome: Result<WeatherReport>) {
        if !self.is_current(ticket) {
            debug!("discarding stale search result");
            return;
        }
        self.state.loading = false;

        match outcome {
            Ok(report) => {
                self.state.report = Some(report);
                self.state.query.clear();
                self.state.error = None;
            }
            Err(err) => {
                warn!("search failed: {err}");
                self.state.error = Some(err.user_message());
            }
        }
    }
}
