//! Weather retrieval and normalization
//!
//! Converts the provider's heterogeneous response shapes into the single
//! canonical [`WeatherReport`] consumed by presentation layers. All unit
//! conversion and rounding happens here; no fractional values escape.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike};
use tracing::{debug, warn};

use crate::Result;
use crate::error::SkycastError;
use crate::models::{Coordinates, FALLBACK_LABEL, ForecastDay, PENDING_LABEL, WeatherReport};
use crate::provider::WeatherApiClient;
use crate::provider::response::{CurrentConditions, ForecastEntry, ForecastResponse, GeocodeEntry};

/// Number of days a canonical forecast always carries
pub const FORECAST_DAYS: usize = 5;

/// Condition label used for padded forecast days
const DEFAULT_CONDITION: &str = "clouds";

/// Assumed visibility in meters when the provider omits the field
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

/// Source of canonical weather reports
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch and normalize current conditions plus forecast for coordinates
    async fn report_for(&self, coords: Coordinates) -> Result<WeatherReport>;

    /// Resolve a free-text name and fetch for the first match
    async fn report_for_city(&self, name: &str) -> Result<WeatherReport>;

    /// Human-readable name for coordinates; always produces a string
    async fn display_name(&self, coords: Coordinates) -> String;
}

#[async_trait]
impl<S: WeatherSource + ?Sized> WeatherSource for std::sync::Arc<S> {
    async fn report_for(&self, coords: Coordinates) -> Result<WeatherReport> {
        (**self).report_for(coords).await
    }

    async fn report_for_city(&self, name: &str) -> Result<WeatherReport> {
        (**self).report_for_city(name).await
    }

    async fn display_name(&self, coords: Coordinates) -> String {
        (**self).display_name(coords).await
    }
}

/// [`WeatherSource`] backed by the remote provider client
pub struct WeatherService {
    client: WeatherApiClient,
}

impl WeatherService {
    /// Wrap a provider client
    #[must_use]
    pub fn new(client: WeatherApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WeatherSource for WeatherService {
    async fn report_for(&self, coords: Coordinates) -> Result<WeatherReport> {
        // The two calls are independent; normalization needs both.
        let (current, forecast) = futures::try_join!(
            self.client.current_conditions(coords),
            self.client.forecast(coords),
        )?;
        Ok(build_report(&current, &forecast))
    }

    async fn report_for_city(&self, name: &str) -> Result<WeatherReport> {
        let matches = self.client.geocode(name).await?;
        let Some(entry) = matches.into_iter().next() else {
            return Err(SkycastError::not_found(name));
        };
        debug!(
            "geocoded '{}' to {:.4}, {:.4}",
            name, entry.lat, entry.lon
        );

        let coords = Coordinates::new(entry.lat, entry.lon);
        let mut report = self.report_for(coords).await?;
        report.location = entry.name;
        Ok(report)
    }

    async fn display_name(&self, coords: Coordinates) -> String {
        match self.client.reverse_geocode(coords).await {
            Ok(entries) if !entries.is_empty() => format_place(&entries[0]),
            Ok(_) => fallback_display_name(coords),
            Err(err) => {
                warn!("reverse geocoding failed: {err}");
                fallback_display_name(coords)
            }
        }
    }
}

/// Label used when reverse geocoding cannot produce a name
#[must_use]
pub fn fallback_display_name(coords: Coordinates) -> String {
    if coords.is_fallback() {
        FALLBACK_LABEL.to_string()
    } else {
        PENDING_LABEL.to_string()
    }
}

fn format_place(entry: &GeocodeEntry) -> String {
    match (&entry.state, &entry.country) {
        (Some(state), _) => format!("{}, {}", entry.name, state),
        (None, Some(country)) => format!("{}, {}", entry.name, country),
        (None, None) => entry.name.clone(),
    }
}

/// Build the canonical report from the two provider responses
#[must_use]
pub fn build_report(current: &CurrentConditions, forecast: &ForecastResponse) -> WeatherReport {
    let condition = current
        .weather
        .first()
        .map(|w| w.description.to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let temperature_c = round(current.main.temp);
    WeatherReport {
        location: current.name.clone(),
        temperature_c,
        condition,
        high_c: round(current.main.temp_max),
        low_c: round(current.main.temp_min),
        humidity_pct: round(current.main.humidity),
        wind_kph: round(current.wind.speed * 3.6),
        visibility_km: round(current.visibility.unwrap_or(DEFAULT_VISIBILITY_M) / 1000.0),
        forecast: daily_forecast(forecast, temperature_c, current.dt),
    }
}

struct DaySlot<'a> {
    date: NaiveDate,
    entry: &'a ForecastEntry,
    midday: bool,
}

/// Collapse 3-hourly entries into exactly [`FORECAST_DAYS`] daily entries.
///
/// Entries are grouped by provider-local calendar day; each day is
/// represented by the slot closest to midday (local hour 11..=13) when one
/// exists, else by the day's first slot. Missing days are padded with the
/// current temperature and a default condition, continuing the weekday
/// sequence.
#[must_use]
pub fn daily_forecast(
    forecast: &ForecastResponse,
    current_temp_c: i32,
    current_dt: i64,
) -> Vec<ForecastDay> {
    let offset = FixedOffset::east_opt(forecast.city.timezone)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));

    let mut days: Vec<DaySlot<'_>> = Vec::new();
    for entry in &forecast.list {
        let Some(utc) = DateTime::from_timestamp(entry.dt, 0) else {
            continue;
        };
        let local = utc.with_timezone(&offset);
        let date = local.date_naive();
        let midday = (11..=13).contains(&local.hour());

        match days.iter().position(|slot| slot.date == date) {
            Some(i) => {
                if midday && !days[i].midday {
                    days[i] = DaySlot { date, entry, midday };
                }
            }
            None if days.len() < FORECAST_DAYS => days.push(DaySlot { date, entry, midday }),
            None => {}
        }
    }

    let mut result: Vec<ForecastDay> = days
        .iter()
        .map(|slot| ForecastDay {
            day: day_label(slot.date),
            temperature_c: round(slot.entry.main.temp),
            condition: slot
                .entry
                .weather
                .first()
                .map(|w| w.main.to_lowercase())
                .unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
        })
        .collect();

    let mut next_date = days
        .last()
        .map(|slot| slot.date)
        .or_else(|| DateTime::from_timestamp(current_dt, 0).map(|dt| dt.date_naive()))
        .unwrap_or_default()
        + Duration::days(1);

    while result.len() < FORECAST_DAYS {
        result.push(ForecastDay {
            day: day_label(next_date),
            temperature_c: current_temp_c,
            condition: DEFAULT_CONDITION.to_string(),
        });
        next_date = next_date + Duration::days(1);
    }

    result
}

fn day_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// Round at the normalization boundary (half away from zero)
#[must_use]
pub fn round(value: f64) -> i32 {
    value.round() as i32
}
