//! Response DTOs for the lake atlas API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::LakeRecord;
use crate::markers::Marker;
use crate::weather::{moon_age, moon_phase, MoonPhase, WeatherSnapshot, WeatherStats};

/// Response body for GET /lakes
#[derive(Debug, Clone, Serialize)]
pub struct LakeListResponse {
    pub count: usize,
    pub lakes: Vec<Arc<LakeRecord>>,
}

impl LakeListResponse {
    pub fn new(lakes: Vec<Arc<LakeRecord>>) -> Self {
        Self {
            count: lakes.len(),
            lakes,
        }
    }
}

/// Response body for GET /lakes/stats
#[derive(Debug, Clone, Serialize)]
pub struct LakeStatsResponse {
    pub total: usize,
    pub free_fishing: usize,
}

/// Weather lookup result. `available` is false when the provider could
/// not be reached and nothing usable was cached.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lake_id: Option<String>,
    pub available: bool,
    pub weather: Option<Arc<WeatherSnapshot>>,
    /// Compass point for the wind direction, e.g. "SW"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<&'static str>,
}

impl WeatherResponse {
    pub fn new(lake_id: Option<String>, weather: Option<Arc<WeatherSnapshot>>) -> Self {
        Self {
            lake_id,
            available: weather.is_some(),
            wind: weather.as_deref().map(WeatherSnapshot::wind_compass),
            weather,
        }
    }
}

/// Response body for GET /weather/stats
#[derive(Debug, Clone, Serialize)]
pub struct WeatherStatsResponse {
    #[serde(flatten)]
    pub stats: WeatherStats,
    /// (memory + storage hits) / all lookups
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

impl WeatherStatsResponse {
    pub fn new(stats: WeatherStats, ttl_secs: u64) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            ttl_secs,
        }
    }
}

/// Response body for POST /weather/purge
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    pub removed: usize,
}

/// Response body for GET /moon
#[derive(Debug, Clone, Serialize)]
pub struct MoonResponse {
    pub date: String,
    pub phase: MoonPhase,
    pub name: &'static str,
    pub symbol: &'static str,
    /// Days since the last new moon
    pub age: f64,
}

impl MoonResponse {
    pub fn for_date(date: NaiveDate) -> Self {
        let phase = moon_phase(date);
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            phase,
            name: phase.name(),
            symbol: phase.symbol(),
            age: (moon_age(date) * 100.0).round() / 100.0,
        }
    }
}

/// Response body for the /selection endpoints
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResponse {
    pub selected: Option<Arc<LakeRecord>>,
    /// Whether this request changed the selection
    pub changed: bool,
    pub notifications: u64,
}

/// Response body for GET /markers
#[derive(Debug, Clone, Serialize)]
pub struct MarkersResponse {
    pub filter: String,
    pub visible: usize,
    pub total: usize,
    pub markers: Vec<Marker>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Lakes in the catalog; 0 means the dataset failed to load
    pub lakes: usize,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(lakes: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            lakes,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
