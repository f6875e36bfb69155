//! Canonical weather report model

use serde::{Deserialize, Serialize};

use super::location::FALLBACK_LABEL;

/// One normalized forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Three-letter weekday abbreviation ("Mon")
    pub day: String,
    /// Temperature in whole degrees Celsius
    pub temperature_c: i32,
    /// Raw condition category, lower-cased ("clouds")
    pub condition: String,
}

/// Canonical, unit-consistent weather record used throughout the app
///
/// Produced fresh on every successful fetch and replaces the previous
/// record atomically; no partial merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Resolved location name
    pub location: String,
    /// Current temperature in whole degrees Celsius
    pub temperature_c: i32,
    /// Human-readable condition, upper-cased ("SCATTERED CLOUDS")
    pub condition: String,
    /// Daily high in whole degrees Celsius
    pub high_c: i32,
    /// Daily low in whole degrees Celsius
    pub low_c: i32,
    /// Relative humidity in percent
    pub humidity_pct: i32,
    /// Wind speed in whole km/h
    pub wind_kph: i32,
    /// Visibility in whole kilometers
    pub visibility_km: i32,
    /// Always exactly five entries, padded when the provider has fewer days
    pub forecast: Vec<ForecastDay>,
}

impl WeatherReport {
    /// Hardcoded last-resort record shown when no fetch has ever succeeded
    #[must_use]
    pub fn fallback() -> Self {
        let forecast = ["Mon", "Tue", "Wed", "Thu", "Fri"]
            .into_iter()
            .map(|day| ForecastDay {
                day: day.to_string(),
                temperature_c: 18,
                condition: "clouds".to_string(),
            })
            .collect();

        Self {
            location: FALLBACK_LABEL.to_string(),
            temperature_c: 18,
            condition: "PARTLY CLOUDY".to_string(),
            high_c: 21,
            low_c: 14,
            humidity_pct: 55,
            wind_kph: 11,
            visibility_km: 10,
            forecast,
        }
    }
}

/// Condition category used by renderers to pick an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Clear,
    Rain,
    Snow,
    Storm,
    Fog,
    Clouds,
}

impl ConditionKind {
    /// Classify a condition label by substring, case-insensitive.
    ///
    /// Matches are checked in priority order; anything unrecognized is
    /// treated as generic cloud cover.
    #[must_use]
    pub fn classify(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("clear") || label.contains("sunny") {
            Self::Clear
        } else if label.contains("rain") || label.contains("drizzle") {
            Self::Rain
        } else if label.contains("snow") {
            Self::Snow
        } else if label.contains("thunder") || label.contains("lightning") {
            Self::Storm
        } else if label.contains("fog") || label.contains("mist") || label.contains("haze") {
            Self::Fog
        } else {
            Self::Clouds
        }
    }
}
