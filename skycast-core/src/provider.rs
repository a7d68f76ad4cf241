use crate::{
    error::WeatherError,
    model::{ForecastEntry, Query, WeatherReading},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Abstraction over the weather data provider.
///
/// Both operations are a single attempt: no retries, no backoff, and
/// no timeout override beyond the HTTP client default.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions for a location.
    async fn current(&self, query: &Query) -> Result<WeatherReading, WeatherError>;

    /// Fetch the forecast for a location, already reduced to daily
    /// samples. Best-effort: callers log failures instead of
    /// surfacing them.
    async fn forecast(&self, query: &Query) -> Result<Vec<ForecastEntry>, WeatherError>;
}
