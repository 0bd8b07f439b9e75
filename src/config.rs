//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default Open-Meteo forecast endpoint (no API key needed).
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Where the lake dataset comes from: `embedded`, a file path, or an http(s) URL
    pub lakes_source: String,
    /// Weather provider forecast endpoint
    pub weather_api_url: String,
    /// Timezone passed to the weather provider
    pub weather_timezone: String,
    /// Weather cache TTL in seconds
    pub weather_ttl: u64,
    /// Weather fetch timeout in seconds
    pub weather_timeout: u64,
    /// Directory for the persistent weather cache, None = in-memory only
    pub weather_cache_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `LAKES_SOURCE` - Dataset source (default: embedded)
    /// - `WEATHER_API_URL` - Forecast endpoint (default: Open-Meteo)
    /// - `WEATHER_TIMEZONE` - Provider timezone (default: Europe/Zurich)
    /// - `WEATHER_TTL_SECS` - Cache TTL in seconds (default: 1800)
    /// - `WEATHER_TIMEOUT_SECS` - Fetch timeout in seconds (default: 8)
    /// - `WEATHER_CACHE_DIR` - Persistent cache directory (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            lakes_source: env::var("LAKES_SOURCE").unwrap_or(defaults.lakes_source),
            weather_api_url: env::var("WEATHER_API_URL").unwrap_or(defaults.weather_api_url),
            weather_timezone: env::var("WEATHER_TIMEZONE").unwrap_or(defaults.weather_timezone),
            weather_ttl: env::var("WEATHER_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.weather_ttl),
            weather_timeout: env::var("WEATHER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.weather_timeout),
            weather_cache_dir: env::var("WEATHER_CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            lakes_source: "embedded".to_string(),
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            weather_timezone: "Europe/Zurich".to_string(),
            weather_ttl: 30 * 60,
            weather_timeout: 8,
            weather_cache_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.lakes_source, "embedded");
        assert_eq!(config.weather_ttl, 1800);
        assert_eq!(config.weather_timeout, 8);
        assert!(config.weather_cache_dir.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("LAKES_SOURCE");
        env::remove_var("WEATHER_TTL_SECS");
        env::remove_var("WEATHER_TIMEOUT_SECS");
        env::remove_var("WEATHER_CACHE_DIR");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.lakes_source, "embedded");
        assert_eq!(config.weather_ttl, 1800);
        assert_eq!(config.weather_timeout, 8);
        assert!(config.weather_cache_dir.is_none());
    }
}
