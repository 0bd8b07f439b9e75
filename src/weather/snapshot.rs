//! Canonical weather snapshot and the lookup tables used to build it.

use serde::{Deserialize, Serialize};

use crate::weather::MoonPhase;

/// Pressure reported when the provider leaves it out, hPa.
pub const STANDARD_PRESSURE: f64 = 1013.0;

/// Current conditions at a lake, in the shape the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Air temperature, °C, rounded
    pub temperature: i32,
    /// Apparent temperature, °C, rounded
    pub feels_like: i32,
    pub description: String,
    pub icon: String,
    /// km/h, rounded
    pub wind_speed: i32,
    /// Degrees, meteorological convention
    pub wind_direction: f64,
    /// Percent
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
    /// Percent
    pub clouds: f64,
    /// Percent
    pub rain_chance: f64,
    /// Unix seconds, 0 when unknown
    pub sunrise: i64,
    /// Unix seconds, 0 when unknown
    pub sunset: i64,
    pub moon_phase: String,
    pub moon_symbol: String,
}

impl WeatherSnapshot {
    pub fn wind_compass(&self) -> &'static str {
        wind_compass(self.wind_direction)
    }
}

/// Provider-neutral current conditions, before rounding and table lookups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub cloud_cover: f64,
    pub weather_code: u16,
    pub pressure: Option<f64>,
    pub rain_chance: Option<f64>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

impl CurrentConditions {
    /// Builds the canonical snapshot, filling gaps with neutral defaults.
    pub fn into_snapshot(self, moon: MoonPhase) -> WeatherSnapshot {
        let (description, icon) = weather_description(self.weather_code);
        WeatherSnapshot {
            temperature: self.temperature.round() as i32,
            feels_like: self.apparent_temperature.round() as i32,
            description: description.to_string(),
            icon: icon.to_string(),
            wind_speed: self.wind_speed.round() as i32,
            wind_direction: self.wind_direction,
            humidity: self.humidity,
            pressure: self.pressure.unwrap_or(STANDARD_PRESSURE),
            clouds: self.cloud_cover,
            rain_chance: self.rain_chance.unwrap_or(0.0),
            sunrise: self.sunrise.unwrap_or(0),
            sunset: self.sunset.unwrap_or(0),
            moon_phase: moon.name().to_string(),
            moon_symbol: moon.symbol().to_string(),
        }
    }
}

/// Description and icon used for weather codes missing from the table.
pub const UNKNOWN_WEATHER: (&str, &str) = ("Unknown", "🌡️");

/// Maps a WMO weather code to a description and icon.
pub fn weather_description(code: u16) -> (&'static str, &'static str) {
    match code {
        0 => ("Clear", "☀️"),
        1 => ("Mainly clear", "🌤️"),
        2 => ("Partly cloudy", "⛅"),
        3 => ("Overcast", "☁️"),
        45 => ("Fog", "🌫️"),
        48 => ("Depositing rime fog", "🌫️"),
        51 => ("Light drizzle", "🌦️"),
        53 => ("Drizzle", "🌦️"),
        55 => ("Dense drizzle", "🌧️"),
        61 => ("Light rain", "🌧️"),
        63 => ("Rain", "🌧️"),
        65 => ("Heavy rain", "⛈️"),
        71 => ("Light snowfall", "🌨️"),
        73 => ("Snowfall", "🌨️"),
        75 => ("Heavy snowfall", "❄️"),
        80 => ("Rain showers", "🌦️"),
        81 => ("Heavy rain showers", "⛈️"),
        82 => ("Violent rain showers", "⛈️"),
        95 => ("Thunderstorm", "⛈️"),
        96 => ("Thunderstorm with hail", "⛈️"),
        99 => ("Severe thunderstorm with hail", "⛈️"),
        _ => UNKNOWN_WEATHER,
    }
}

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Nearest of the eight compass points for a bearing in degrees.
pub fn wind_compass(degrees: f64) -> &'static str {
    let index = (degrees.rem_euclid(360.0) / 45.0).round() as usize % COMPASS.len();
    COMPASS[index]
}
