//! Configuration management for the skycast application
//!
//! Handles loading configuration from an optional TOML file plus
//! `SKYCAST_`-prefixed environment variables, and validates all settings.
//! The provider credential is optional at load time: a missing API key is
//! logged as an error but never halts execution; provider requests simply
//! fail when they are issued.

use crate::SkycastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::error;

/// Root configuration structure for the skycast application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkycastConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Geolocation configuration
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API key; requests go out unauthenticated when absent
    pub api_key: Option<String>,
    /// Base URL for the weather endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base URL for the geocoding endpoints
    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient request failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl ProviderConfig {
    /// Credential to attach to requests; empty when unconfigured
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }
}

/// Geolocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Client hint used to select the acquisition profile at startup
    pub client_hint: Option<String>,
    /// Position lookup endpoint
    #[serde(default = "default_position_endpoint")]
    pub position_endpoint: String,
    /// Treat the capability as absent entirely
    #[serde(default)]
    pub disabled: bool,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_position_endpoint() -> String {
    crate::geolocation::IpGeolocator::DEFAULT_ENDPOINT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            geo_base_url: default_geo_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            client_hint: None,
            position_endpoint: default_position_endpoint(),
            disabled: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for SkycastConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            geolocation: GeolocationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SkycastConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specific file path and environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("skycast.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides, e.g. SKYCAST_PROVIDER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("SKYCAST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: SkycastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        if config.provider.api_key().is_empty() {
            error!("no weather API key configured; provider requests will fail");
        }

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.provider.timeout_seconds == 0 || self.provider.timeout_seconds > 300 {
            return Err(SkycastError::config(
                "Provider timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.provider.max_retries > 10 {
            return Err(SkycastError::config("Provider max retries cannot exceed 10").into());
        }

        for url in [&self.provider.base_url, &self.provider.geo_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SkycastError::config(
                    "Provider base URLs must be valid HTTP or HTTPS URLs",
                )
                .into());
            }
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
