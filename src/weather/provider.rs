//! Weather provider seam and the Open-Meteo client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AtlasError, Result};
use crate::weather::CurrentConditions;

/// Current-condition fields requested from Open-Meteo.
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
weather_code,cloud_cover,wind_speed_10m,wind_direction_10m,pressure_msl";

const DAILY_FIELDS: &str = "sunrise,sunset,precipitation_probability_max";

// == Weather Provider ==
/// Source of current conditions for a coordinate.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_conditions(&self, lat: f64, lon: f64) -> Result<CurrentConditions>;
}

// == Open-Meteo ==
/// Open-Meteo forecast client. No API key needed.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: reqwest::Client,
    base_url: String,
    timezone: String,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current: OpenMeteoCurrent,
    #[serde(default)]
    daily: Option<OpenMeteoDaily>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    weather_code: u16,
    cloud_cover: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    #[serde(default)]
    pressure_msl: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenMeteoDaily {
    #[serde(default)]
    sunrise: Vec<i64>,
    #[serde(default)]
    sunset: Vec<i64>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
}

impl OpenMeteoProvider {
    pub fn new(
        base_url: impl Into<String>,
        timezone: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lake_atlas/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AtlasError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timezone: timezone.into(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current_conditions(&self, lat: f64, lon: f64) -> Result<CurrentConditions> {
        let query = [
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timeformat", "unixtime".to_string()),
            ("forecast_days", "1".to_string()),
            ("timezone", self.timezone.clone()),
        ];

        debug!("Fetching Open-Meteo conditions: {} lat={} lon={}", self.base_url, lat, lon);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AtlasError::Provider(format!("HTTP error for ({lat},{lon}): {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AtlasError::Provider(format!(
                "Open-Meteo returned {} for ({lat},{lon}): {}",
                status.as_u16(),
                body.chars().take(500).collect::<String>()
            )));
        }

        let payload: OpenMeteoResponse = resp.json().await.map_err(|e| {
            AtlasError::Provider(format!("JSON parse error for ({lat},{lon}): {e}"))
        })?;

        Ok(conditions_from_response(payload))
    }
}

fn conditions_from_response(payload: OpenMeteoResponse) -> CurrentConditions {
    let current = payload.current;
    let daily = payload.daily.unwrap_or_default();

    CurrentConditions {
        temperature: current.temperature_2m,
        apparent_temperature: current.apparent_temperature,
        humidity: current.relative_humidity_2m,
        wind_speed: current.wind_speed_10m,
        wind_direction: current.wind_direction_10m,
        cloud_cover: current.cloud_cover,
        weather_code: current.weather_code,
        pressure: current.pressure_msl,
        rain_chance: daily.precipitation_probability_max.first().copied().flatten(),
        sunrise: daily.sunrise.first().copied(),
        sunset: daily.sunset.first().copied(),
    }
}
