//! Weather Module
//!
//! Current conditions for a lake's coordinates behind a two-tier cache, with
//! the lunar phase computed locally.

mod cache;
mod clock;
mod entry;
mod moon;
mod provider;
mod snapshot;
mod stats;
mod storage;

// Re-export public types
pub use cache::{cache_key, WeatherCache, DEFAULT_FETCH_TIMEOUT, DEFAULT_TTL, STORAGE_PREFIX};
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use moon::{julian_day, moon_age, moon_phase, MoonPhase, SYNODIC_MONTH};
pub use provider::{OpenMeteoProvider, WeatherProvider};
pub use snapshot::{
    weather_description, wind_compass, CurrentConditions, WeatherSnapshot, STANDARD_PRESSURE,
    UNKNOWN_WEATHER,
};
pub use stats::WeatherStats;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
