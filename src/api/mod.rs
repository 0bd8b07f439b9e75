//! API Module
//!
//! HTTP handlers and routing for the lake atlas REST API.
//!
//! # Endpoints
//! - `GET /lakes` - List lakes, optionally filtered by region, species, free fishing
//! - `GET /lakes/stats` - Lake counts
//! - `GET /lakes/:id` - One lake
//! - `GET /lakes/:id/weather` - Current weather at a lake
//! - `GET /weather` - Current weather at a coordinate
//! - `GET /weather/stats` - Weather cache statistics
//! - `POST /weather/purge` - Drop expired weather entries
//! - `GET /moon` - Lunar phase for a date
//! - `GET|PUT|DELETE /selection` - Active lake
//! - `GET /markers` - Apply a marker filter
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
