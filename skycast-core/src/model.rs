use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Location identifier for a single request. Exactly one form is
/// active per request.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Place(String),
    Coordinates { lat: f64, lon: f64 },
}

impl Query {
    /// Build a place query from raw user input. The input is trimmed;
    /// an empty result is rejected here, before any network call.
    pub fn place(input: &str) -> Result<Self, WeatherError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::MissingInput);
        }
        Ok(Query::Place(trimmed.to_string()))
    }

    /// Location query parameters: `q=<city>` or `lat=<lat>&lon=<lon>`.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Query::Place(name) => vec![("q", name.clone())],
            Query::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }
}

/// Unit system forwarded to the provider as the `units` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
    /// Kelvin, the provider default.
    Standard,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
            UnitSystem::Standard => "standard",
        }
    }
}

/// Current conditions for one location at one point in time, taken
/// verbatim from the provider response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReading {
    pub place: String,
    pub country: String,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    pub visibility_m: u32,
}

/// One sampled forecast entry (daily granularity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub icon: String,
    pub description: String,
}

/// The provider forecast series is sampled every 3 hours; one entry
/// per day is every 8th element.
pub const FORECAST_STRIDE: usize = 8;
/// At most 5 daily samples are kept.
pub const FORECAST_DAYS: usize = 5;

/// Reduce a 3-hour forecast series to daily samples by stride:
/// indices 0, 8, 16, 24, 32, capped at `FORECAST_DAYS` entries.
pub fn daily_samples(series: Vec<ForecastEntry>) -> Vec<ForecastEntry> {
    series
        .into_iter()
        .step_by(FORECAST_STRIDE)
        .take(FORECAST_DAYS)
        .collect()
}
