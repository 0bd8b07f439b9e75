//! Request DTOs for the lake atlas API
//!
//! Query strings and JSON bodies accepted by the handlers.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::catalog::LakeQuery;
use crate::markers::MarkerFilter;

/// Query string for GET /lakes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LakeListQuery {
    /// Canton substring, case-insensitive
    pub region: Option<String>,
    /// Fish species substring, case-insensitive
    pub species: Option<String>,
    /// Only lakes with (or without) free fishing
    pub free: Option<bool>,
}

impl From<LakeListQuery> for LakeQuery {
    fn from(q: LakeListQuery) -> Self {
        LakeQuery {
            region: q.region.filter(|r| !r.trim().is_empty()),
            species: q.species.filter(|s| !s.trim().is_empty()),
            free_fishing: q.free,
        }
    }
}

/// Query string for GET /weather
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
}

impl WeatherQuery {
    /// Validates the coordinates
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Some(format!("Latitude {} is out of range", self.lat));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Some(format!("Longitude {} is out of range", self.lon));
        }
        None
    }
}

/// Query string for GET /moon
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoonQuery {
    /// `YYYY-MM-DD`, today when absent
    pub date: Option<String>,
}

impl MoonQuery {
    /// Parsed date, `Ok(None)` when absent.
    pub fn parse_date(&self) -> Result<Option<NaiveDate>, String> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| format!("Date '{}' is not in YYYY-MM-DD format", raw)),
        }
    }
}

/// Query string for GET /markers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkerQuery {
    pub filter: Option<String>,
}

impl MarkerQuery {
    pub fn parse_filter(&self) -> crate::error::Result<MarkerFilter> {
        self.filter.as_deref().unwrap_or("all").parse()
    }
}

/// Request body for PUT /selection
#[derive(Debug, Clone, Deserialize)]
pub struct SelectRequest {
    /// Lake id, or null to clear the selection
    #[serde(default)]
    pub id: Option<String>,
}
