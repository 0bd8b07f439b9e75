//! Lake Atlas - Swiss lake catalog service
//!
//! Serves a read-only catalog of Swiss lakes with map-marker filtering, an
//! active-lake selection, and current weather behind a two-tier TTL cache.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod markers;
pub mod models;
pub mod selection;
pub mod weather;

pub use api::AppState;
pub use config::Config;
pub use error::{AtlasError, Result};
