use thiserror::Error;

/// Failure classes for a position request, mirroring the platform
/// geolocation error codes as a tagged variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("request timeout")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

/// Everything that can terminate a single weather request.
///
/// All variants are terminal: nothing is retried, and each maps to one
/// user-visible message. Forecast failures never reach the user; they
/// go to the log sink instead (see `WeatherSession`).
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Empty or whitespace-only place input, rejected before any
    /// network call.
    #[error("Please enter a city name")]
    MissingInput,

    /// Provider answered 404 for the requested location.
    #[error("Weather data not found")]
    NotFound,

    /// Provider answered with any other non-success status.
    #[error("Weather service unavailable (status {status})")]
    Unavailable { status: u16 },

    /// Transport failure: no response at all.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// A 2xx body that did not match the provider schema.
    #[error("Unexpected response from weather service")]
    Decode(#[source] serde_json::Error),

    #[error("Unable to get your location: {0}")]
    Geolocation(#[from] GeolocationError),

    /// A display slot expected by the presenter is missing; the whole
    /// update is aborted rather than partially rendered.
    #[error("Display element not found: {0}")]
    Display(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geolocation_error_wraps_into_weather_error() {
        let err: WeatherError = GeolocationError::PermissionDenied.into();
        let msg = err.to_string();
        assert!(msg.contains("Unable to get your location"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn unavailable_message_carries_status() {
        let err = WeatherError::Unavailable { status: 503 };
        assert!(err.to_string().contains("503"));
    }
}
