use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::ClientOptions,
    error::WeatherError,
    model::{ForecastEntry, Query, WeatherReading, daily_samples},
};

use super::WeatherProvider;

/// OpenWeatherMap client: one GET per data kind against the configured
/// base endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    options: ClientOptions,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            http: Client::new(),
        }
    }

    async fn get_json<T>(&self, endpoint: &str, query: &Query) -> Result<T, WeatherError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{endpoint}", self.options.base_url);

        let mut params = query.params();
        params.push(("appid", self.options.api_key.clone()));
        params.push(("units", self.options.units.as_str().to_string()));

        let res = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(WeatherError::Network)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::Network)?;

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(endpoint, body = %truncate_body(&body), "location not found");
            return Err(WeatherError::NotFound);
        }

        if !status.is_success() {
            debug!(endpoint, %status, body = %truncate_body(&body), "provider request failed");
            return Err(WeatherError::Unavailable { status: status.as_u16() });
        }

        serde_json::from_str(&body).map_err(WeatherError::Decode)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    visibility: u32,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &Query) -> Result<WeatherReading, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", query).await?;

        let (description, icon) = parsed
            .weather
            .first()
            .map(|w| (w.description.clone(), w.icon.clone()))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        Ok(WeatherReading {
            place: parsed.name,
            country: parsed.sys.country,
            description,
            icon,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed_mps: parsed.wind.speed,
            visibility_m: parsed.visibility,
        })
    }

    async fn forecast(&self, query: &Query) -> Result<Vec<ForecastEntry>, WeatherError> {
        let parsed: OwForecastResponse = self.get_json("forecast", query).await?;

        let series = parsed
            .list
            .into_iter()
            .map(|e| {
                let (description, icon) = e
                    .weather
                    .first()
                    .map(|w| (w.description.clone(), w.icon.clone()))
                    .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

                ForecastEntry {
                    timestamp: DateTime::from_timestamp(e.dt, 0).unwrap_or_else(Utc::now),
                    temperature: e.main.temp,
                    icon,
                    description,
                }
            })
            .collect();

        Ok(daily_samples(series))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::new(ClientOptions::new("test-key").with_base_url(server.uri()))
    }

    fn paris_body() -> serde_json::Value {
        json!({
            "name": "Paris",
            "sys": { "country": "FR" },
            "weather": [{ "description": "clear sky", "icon": "01d" }],
            "main": { "temp": 18.4, "feels_like": 17.9, "humidity": 60, "pressure": 1012 },
            "wind": { "speed": 3.0 },
            "visibility": 10000
        })
    }

    #[tokio::test]
    async fn current_maps_response_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Paris"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
            .mount(&server)
            .await;

        let query = Query::place("Paris").expect("non-empty");
        let reading = provider_for(&server).current(&query).await.expect("success");

        assert_eq!(reading.place, "Paris");
        assert_eq!(reading.country, "FR");
        assert_eq!(reading.description, "clear sky");
        assert_eq!(reading.icon, "01d");
        assert_eq!(reading.temperature, 18.4);
        assert_eq!(reading.feels_like, 17.9);
        assert_eq!(reading.humidity_pct, 60);
        assert_eq!(reading.pressure_hpa, 1012);
        assert_eq!(reading.wind_speed_mps, 3.0);
        assert_eq!(reading.visibility_m, 10_000);
    }

    #[tokio::test]
    async fn current_sends_coordinate_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "48.8566"))
            .and(query_param("lon", "2.3522"))
            .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
            .expect(1)
            .mount(&server)
            .await;

        let query = Query::Coordinates { lat: 48.8566, lon: 2.3522 };
        provider_for(&server).current(&query).await.expect("success");
    }

    #[tokio::test]
    async fn missing_location_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let query = Query::place("Nowhereville").expect("non-empty");
        let err = provider_for(&server).current(&query).await.unwrap_err();

        assert!(matches!(err, WeatherError::NotFound));
    }

    #[tokio::test]
    async fn other_failure_status_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let query = Query::place("Paris").expect("non-empty");
        let err = provider_for(&server).current(&query).await.unwrap_err();

        assert!(matches!(err, WeatherError::Unavailable { status: 503 }));
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        // Grab a free port and release it so nothing is listening there.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };

        let provider = OpenWeatherProvider::new(
            ClientOptions::new("test-key").with_base_url(format!("http://127.0.0.1:{port}")),
        );

        let query = Query::place("Paris").expect("non-empty");
        let err = provider.current(&query).await.unwrap_err();

        assert!(matches!(err, WeatherError::Network(_)));
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cod": 200 })))
            .mount(&server)
            .await;

        let query = Query::place("Paris").expect("non-empty");
        let err = provider_for(&server).current(&query).await.unwrap_err();

        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[tokio::test]
    async fn forecast_is_reduced_to_daily_samples() {
        let server = MockServer::start().await;

        let list: Vec<_> = (0..40)
            .map(|i| {
                json!({
                    "dt": 1_700_000_000 + i * 10_800,
                    "main": { "temp": 10.0 + f64::from(i) },
                    "weather": [{ "description": "light rain", "icon": "10d" }]
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("q", "Paris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "list": list })))
            .mount(&server)
            .await;

        let query = Query::place("Paris").expect("non-empty");
        let days = provider_for(&server).forecast(&query).await.expect("success");

        assert_eq!(days.len(), 5);
        for (n, day) in days.iter().enumerate() {
            let expected = 1_700_000_000 + (n as i64) * 8 * 10_800;
            assert_eq!(day.timestamp.timestamp(), expected);
            assert_eq!(day.temperature, 10.0 + (n as f64) * 8.0);
        }
    }
}
