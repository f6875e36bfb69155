//! Weather provider HTTP client
//!
//! Issues current-conditions, forecast, and geocoding requests against an
//! OpenWeatherMap-compatible API through a retrying middleware stack, and
//! exposes the raw response shapes consumed by the normalization layer.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::Result;
use crate::config::ProviderConfig;
use crate::error::{Endpoint, SkycastError};
use crate::models::Coordinates;

pub use self::response::{
    ConditionEntry, CurrentConditions, ForecastCity, ForecastEntry, ForecastResponse,
    GeocodeEntry, MainMetrics, Wind,
};

/// HTTP client for the weather data provider
pub struct WeatherApiClient {
    http: ClientWithMiddleware,
    config: ProviderConfig,
}

impl WeatherApiClient {
    /// Build a client from provider configuration
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let base = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let http = ClientBuilder::new(base)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { http, config })
    }

    /// Current conditions at the given coordinates, metric units
    pub async fn current_conditions(&self, coords: Coordinates) -> Result<CurrentConditions> {
        let url = format!(
            "{}/weather?lat={}&lon={}&units=metric&appid={}",
            self.config.base_url, coords.latitude, coords.longitude, self.config.api_key()
        );
        self.get_json(Endpoint::CurrentConditions, &url).await
    }

    /// Multi-day forecast at 3-hour granularity, metric units
    pub async fn forecast(&self, coords: Coordinates) -> Result<ForecastResponse> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&units=metric&appid={}",
            self.config.base_url, coords.latitude, coords.longitude, self.config.api_key()
        );
        self.get_json(Endpoint::Forecast, &url).await
    }

    /// Forward geocoding: free-text name to coordinates, first match only
    pub async fn geocode(&self, name: &str) -> Result<Vec<GeocodeEntry>> {
        let url = format!(
            "{}/direct?q={}&limit=1&appid={}",
            self.config.geo_base_url,
            urlencoding::encode(name),
            self.config.api_key()
        );
        self.get_json(Endpoint::Geocoding, &url).await
    }

    /// Reverse geocoding: coordinates to place name, first match only
    pub async fn reverse_geocode(&self, coords: Coordinates) -> Result<Vec<GeocodeEntry>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&limit=1&appid={}",
            self.config.geo_base_url, coords.latitude, coords.longitude, self.config.api_key()
        );
        self.get_json(Endpoint::ReverseGeocoding, &url).await
    }

    // URLs carry the credential, so log endpoints rather than URLs
    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint, url: &str) -> Result<T> {
        debug!("requesting {endpoint}");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("{endpoint} request failed with status {status}");
            return Err(SkycastError::provider(endpoint, status.as_u16()));
        }

        let body = response.json::<T>().await?;
        debug!("{endpoint} response received");
        Ok(body)
    }
}

/// Raw response shapes from the provider API
pub mod response {
    use serde::{Deserialize, Serialize};

    /// Current-conditions endpoint response
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CurrentConditions {
        /// Place name as reported by the provider
        pub name: String,
        /// Observation time, Unix seconds (UTC)
        pub dt: i64,
        pub main: MainMetrics,
        pub weather: Vec<ConditionEntry>,
        pub wind: Wind,
        /// Visibility in meters; absent in some reports
        pub visibility: Option<f64>,
        /// Shift from UTC in seconds
        #[serde(default)]
        pub timezone: i32,
    }

    /// Temperature and humidity block shared by both weather endpoints
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MainMetrics {
        pub temp: f64,
        pub temp_min: f64,
        pub temp_max: f64,
        pub humidity: f64,
    }

    /// One condition descriptor
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ConditionEntry {
        /// Coarse category ("Clouds")
        pub main: String,
        /// Human-readable description ("scattered clouds")
        pub description: String,
    }

    /// Wind block; speed is m/s under metric units
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Wind {
        pub speed: f64,
    }

    /// Forecast endpoint response (3-hour granularity)
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<ForecastEntry>,
        pub city: ForecastCity,
    }

    /// One 3-hour forecast slot
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ForecastEntry {
        /// Slot time, Unix seconds (UTC)
        pub dt: i64,
        pub main: MainMetrics,
        pub weather: Vec<ConditionEntry>,
    }

    /// City block attached to a forecast response
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ForecastCity {
        pub name: String,
        /// Shift from UTC in seconds
        #[serde(default)]
        pub timezone: i32,
    }

    /// Geocoding entry; forward and reverse lookups share the shape
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GeocodeEntry {
        pub name: String,
        pub lat: f64,
        pub lon: f64,
        pub country: Option<String>,
        pub state: Option<String>,
    }
}
