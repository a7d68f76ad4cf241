use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::GeolocationError;
use crate::model::Query;

const DEFAULT_ENDPOINT: &str = "http://ip-api.com/json";

/// Request timeout for a position lookup.
pub const POSITION_TIMEOUT: Duration = Duration::from_secs(10);
/// A position this recent is reused instead of asking the service again.
pub const POSITION_MAX_AGE: Duration = Duration::from_secs(300);

/// A resolved coordinate pair, rounded to 4 decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl From<Position> for Query {
    fn from(pos: Position) -> Self {
        Query::Coordinates { lat: pos.lat, lon: pos.lon }
    }
}

/// Source of the current position.
#[async_trait]
pub trait Locator: Send + Sync {
    async fn current_position(&self) -> Result<Position, GeolocationError>;
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Position lookup through an IP geolocation service. The closest a
/// terminal process gets to the platform location API.
#[derive(Debug)]
pub struct IpLocator {
    http: Client,
    endpoint: String,
    max_age: Duration,
    cached: Mutex<Option<(Instant, Position)>>,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(POSITION_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint: endpoint.into(),
            max_age: POSITION_MAX_AGE,
            cached: Mutex::new(None),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl Locator for IpLocator {
    async fn current_position(&self) -> Result<Position, GeolocationError> {
        if let Some((at, pos)) = *self.cached.lock() {
            if at.elapsed() < self.max_age {
                debug!(lat = pos.lat, lon = pos.lon, "reusing cached position");
                return Ok(pos);
            }
        }

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = res.status();
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(GeolocationError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(GeolocationError::Other(format!(
                "location service returned status {status}"
            )));
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .map_err(|_| GeolocationError::PositionUnavailable)?;

        if parsed.status != "success" {
            debug!(message = ?parsed.message, "location service reported failure");
            return Err(GeolocationError::PositionUnavailable);
        }

        let (Some(lat), Some(lon)) = (parsed.lat, parsed.lon) else {
            return Err(GeolocationError::PositionUnavailable);
        };

        let pos = Position { lat: round4(lat), lon: round4(lon) };
        *self.cached.lock() = Some((Instant::now(), pos));

        Ok(pos)
    }
}

fn classify_transport(err: reqwest::Error) -> GeolocationError {
    if err.is_timeout() {
        GeolocationError::Timeout
    } else {
        GeolocationError::PositionUnavailable
    }
}
