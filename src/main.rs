//! Terminal front end for the skycast core
//!
//! A thin presentation collaborator: it wires the core together, runs one
//! location-or-search cycle, and renders the resulting state.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use skycast::{
    AcquisitionProfile, App, AppState, ConditionKind, Geolocator, IpGeolocator, LocationResolver,
    SkycastConfig, UnsupportedGeolocator, WeatherApiClient, WeatherService,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = SkycastConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    let client = WeatherApiClient::new(config.provider.clone())
        .with_context(|| "Failed to create weather API client")?;
    let service = WeatherService::new(client);

    let profile = AcquisitionProfile::for_client_hint(config.geolocation.client_hint.as_deref());
    let locator: Box<dyn Geolocator> = if config.geolocation.disabled {
        Box::new(UnsupportedGeolocator)
    } else {
        Box::new(
            IpGeolocator::with_endpoint(config.geolocation.position_endpoint.clone())
                .with_context(|| "Failed to create position source")?,
        )
    };
    let resolver = LocationResolver::new(locator, profile);
    let mut app = App::new(resolver, service);

    let query: Vec<String> = std::env::args().skip(1).collect();
    if query.is_empty() {
        if app.prompt_required() {
            println!("Share your location to see local weather? [y/N]");
            let mut answer = String::new();
            io::stdin()
                .lock()
                .read_line(&mut answer)
                .with_context(|| "Failed to read prompt answer")?;
            if answer.trim().eq_ignore_ascii_case("y") {
                app.accept_prompt().await;
            } else {
                app.decline_prompt().await;
            }
        } else {
            app.request_location().await;
        }
    } else {
        app.on_search_submit(&query.join(" ")).await;
    }

    render(app.state());
    Ok(())
}

fn render(state: &AppState) {
    if let Some(error) = &state.error {
        eprintln!("! {error}");
    }

    let Some(report) = &state.report else {
        println!("No weather data available.");
        return;
    };

    println!("{}", report.location);
    println!(
        "  {} {}°C  {}",
        icon(ConditionKind::classify(&report.condition)),
        report.temperature_c,
        report.condition
    );
    println!(
        "  H {}° / L {}°   humidity {}%   wind {} km/h   visibility {} km",
        report.high_c, report.low_c, report.humidity_pct, report.wind_kph, report.visibility_km
    );
    for day in &report.forecast {
        println!(
            "  {}  {:>3}°C  {} {}",
            day.day,
            day.temperature_c,
            icon(ConditionKind::classify(&day.condition)),
            day.condition
        );
    }
}

fn icon(kind: ConditionKind) -> &'static str {
    match kind {
        ConditionKind::Clear => "☀️",
        ConditionKind::Rain => "🌧️",
        ConditionKind::Snow => "❄️",
        ConditionKind::Storm => "⛈️",
        ConditionKind::Fog => "🌫️",
        ConditionKind::Clouds => "☁️",
    }
}
