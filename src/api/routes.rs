//! API Routes
//!
//! Configures the Axum router with all lake atlas endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    deselect_handler, get_lake_handler, get_selection_handler, health_handler,
    lake_stats_handler, lake_weather_handler, list_lakes_handler, markers_handler, moon_handler,
    purge_handler, select_handler, weather_handler, weather_stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin, the map frontend is served separately
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/lakes", get(list_lakes_handler))
        .route("/lakes/stats", get(lake_stats_handler))
        .route("/lakes/:id", get(get_lake_handler))
        .route("/lakes/:id/weather", get(lake_weather_handler))
        .route("/weather", get(weather_handler))
        .route("/weather/stats", get(weather_stats_handler))
        .route("/weather/purge", post(purge_handler))
        .route("/moon", get(moon_handler))
        .route(
            "/selection",
            get(get_selection_handler)
                .put(select_handler)
                .delete(deselect_handler),
        )
        .route("/markers", get(markers_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
