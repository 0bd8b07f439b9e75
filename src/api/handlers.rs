//! API Handlers
//!
//! HTTP request handlers for the lake atlas endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::catalog::{source_from_config, CatalogLoader, LakeCatalog, LakeRecord};
use crate::config::Config;
use crate::error::{AtlasError, Result};
use crate::markers::MarkerLayer;
use crate::models::{
    HealthResponse, LakeListQuery, LakeListResponse, LakeStatsResponse, MarkerQuery,
    MarkersResponse, MoonQuery, MoonResponse, PurgeResponse, SelectRequest, SelectionResponse,
    WeatherQuery, WeatherResponse, WeatherStatsResponse,
};
use crate::selection::SelectionState;
use crate::weather::{
    FileStorage, KeyValueStorage, MemoryStorage, OpenMeteoProvider, WeatherCache,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read-only lake catalog
    pub catalog: Arc<LakeCatalog>,
    /// Two-tier weather cache
    pub weather: Arc<WeatherCache>,
    /// Currently active lake
    pub selection: Arc<SelectionState>,
    /// Map markers and the visible subset
    pub markers: Arc<RwLock<MarkerLayer>>,
}

impl AppState {
    /// Creates a new AppState over a loaded catalog and a weather cache.
    pub fn new(catalog: Arc<LakeCatalog>, weather: Arc<WeatherCache>) -> Self {
        let markers = MarkerLayer::from_catalog(&catalog);
        Self {
            catalog,
            weather,
            selection: Arc::new(SelectionState::new()),
            markers: Arc::new(RwLock::new(markers)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Loads the catalog, opens weather storage (falling back to memory when
    /// the cache directory is unusable), warms the cache and purges stale
    /// entries.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.weather_timeout);

        let source = source_from_config(&config.lakes_source, timeout)?;
        let catalog = CatalogLoader::new(source).ensure_loaded().await;

        let storage: Arc<dyn KeyValueStorage> = match &config.weather_cache_dir {
            Some(dir) => match FileStorage::open(dir.clone()) {
                Ok(storage) => {
                    info!("Persisting weather cache in {}", dir.display());
                    Arc::new(storage)
                }
                Err(e) => {
                    warn!("{}; keeping weather cache in memory", e);
                    Arc::new(MemoryStorage::new())
                }
            },
            None => Arc::new(MemoryStorage::new()),
        };

        let provider = OpenMeteoProvider::new(
            config.weather_api_url.clone(),
            config.weather_timezone.clone(),
            timeout,
        )?;
        let weather = WeatherCache::new(Arc::new(provider), storage)
            .with_ttl(Duration::from_secs(config.weather_ttl))
            .with_fetch_timeout(timeout);
        weather.warm_from_storage().await;
        weather.purge_expired().await;

        Ok(Self::new(catalog, Arc::new(weather)))
    }

    fn lake(&self, id: &str) -> Result<Arc<LakeRecord>> {
        self.catalog
            .by_id(id)
            .ok_or_else(|| AtlasError::NotFound(format!("lake '{}'", id)))
    }
}

// == Lakes ==

/// Handler for GET /lakes
pub async fn list_lakes_handler(
    State(state): State<AppState>,
    Query(query): Query<LakeListQuery>,
) -> Json<LakeListResponse> {
    let lakes = state.catalog.search(&query.into());
    Json(LakeListResponse::new(lakes))
}

/// Handler for GET /lakes/stats
pub async fn lake_stats_handler(State(state): State<AppState>) -> Json<LakeStatsResponse> {
    Json(LakeStatsResponse {
        total: state.catalog.count(),
        free_fishing: state.catalog.free_fishing_count(),
    })
}

/// Handler for GET /lakes/:id
pub async fn get_lake_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Arc<LakeRecord>>> {
    state.lake(&id).map(Json)
}

/// Handler for GET /lakes/:id/weather
///
/// An unreachable provider is not an error: the body reports
/// `available: false`.
pub async fn lake_weather_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeatherResponse>> {
    let lake = state.lake(&id)?;
    let weather = state
        .weather
        .get(lake.coordinates.latitude, lake.coordinates.longitude)
        .await;
    Ok(Json(WeatherResponse::new(Some(lake.id.clone()), weather)))
}

// == Weather ==

/// Handler for GET /weather
pub async fn weather_handler(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(AtlasError::InvalidRequest(error_msg));
    }
    let weather = state.weather.get(query.lat, query.lon).await;
    Ok(Json(WeatherResponse::new(None, weather)))
}

/// Handler for GET /weather/stats
pub async fn weather_stats_handler(State(state): State<AppState>) -> Json<WeatherStatsResponse> {
    let stats = state.weather.stats().await;
    Json(WeatherStatsResponse::new(stats, state.weather.ttl().as_secs()))
}

/// Handler for POST /weather/purge
pub async fn purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    let removed = state.weather.purge_expired().await;
    Json(PurgeResponse { removed })
}

/// Handler for GET /moon
pub async fn moon_handler(Query(query): Query<MoonQuery>) -> Result<Json<MoonResponse>> {
    let date = query
        .parse_date()
        .map_err(AtlasError::InvalidRequest)?
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    Ok(Json(MoonResponse::for_date(date)))
}

// == Selection ==

fn selection_response(state: &AppState, changed: bool) -> SelectionResponse {
    SelectionResponse {
        selected: state.selection.current(),
        changed,
        notifications: state.selection.notification_count(),
    }
}

/// Handler for GET /selection
pub async fn get_selection_handler(State(state): State<AppState>) -> Json<SelectionResponse> {
    Json(selection_response(&state, false))
}

/// Handler for PUT /selection
///
/// `{"id": null}` clears the selection; an unknown id is a 404 and leaves
/// the selection untouched.
pub async fn select_handler(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SelectionResponse>> {
    let lake = match req.id.as_deref() {
        Some(id) => Some(state.lake(id)?),
        None => None,
    };
    let changed = state.selection.select(lake);
    Ok(Json(selection_response(&state, changed)))
}

/// Handler for DELETE /selection
pub async fn deselect_handler(State(state): State<AppState>) -> Json<SelectionResponse> {
    let changed = state.selection.deselect();
    Json(selection_response(&state, changed))
}

// == Markers ==

/// Handler for GET /markers
pub async fn markers_handler(
    State(state): State<AppState>,
    Query(query): Query<MarkerQuery>,
) -> Result<Json<MarkersResponse>> {
    let filter = query.parse_filter()?;
    let mut layer = state.markers.write().await;
    let visible = layer.apply(filter, &state.catalog);

    Ok(Json(MarkersResponse {
        filter: layer.filter().to_string(),
        visible,
        total: layer.total(),
        markers: layer.visible().cloned().collect(),
    }))
}

// == Health ==

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.catalog.count()))
}
