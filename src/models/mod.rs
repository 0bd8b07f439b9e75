//! Request and Response models for the lake atlas API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{LakeListQuery, MarkerQuery, MoonQuery, SelectRequest, WeatherQuery};
pub use responses::{
    ErrorResponse, HealthResponse, LakeListResponse, LakeStatsResponse, MarkersResponse,
    MoonResponse, PurgeResponse, SelectionResponse, WeatherResponse, WeatherStatsResponse,
};
