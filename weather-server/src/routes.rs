//! HTTP API consumed by the dashboard UI.

use std::path::Path;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_extra::extract::Query;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use weather_core::{CitySummary, WeatherService, WeatherSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub service: WeatherService,
}

/// `GET /api/weather` query.
///
/// `cityIds` may repeat (`?cityIds=1&cityIds=3`) or hold a comma-separated
/// list (`?cityIds=1,3`). Empty values are ignored, so `?cityIds=` selects
/// every city.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherQuery {
    #[serde(default)]
    pub city_ids: Vec<String>,
}

impl WeatherQuery {
    pub fn parse_city_ids(&self) -> Result<Vec<i64>, String> {
        self.city_ids
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<i64>()
                    .map_err(|_| format!("Invalid city id '{value}'"))
            })
            .collect()
    }
}

pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/api/cities", get(list_cities))
        .route("/api/weather", get(get_weather))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    match static_dir {
        Some(dir) if dir.is_dir() => {
            tracing::info!("Serving UI from {}", dir.display());
            api.fallback_service(ServeDir::new(dir))
        }
        Some(dir) => {
            tracing::warn!("UI directory {} not found, serving API only", dir.display());
            api
        }
        None => api,
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "weather-server",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Configured cities, ordered by name.
async fn list_cities(State(state): State<AppState>) -> Json<Vec<CitySummary>> {
    Json(state.service.cities().list_summaries())
}

/// Snapshot for the requested cities, or for all of them when none are given.
/// Per-city failures are reported inside the snapshot; only a non-numeric id is a 400.
async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherSnapshot>, (StatusCode, String)> {
    let city_ids = query
        .parse_city_ids()
        .map_err(|message| (StatusCode::BAD_REQUEST, message))?;

    let snapshot = state
        .service
        .get_weather_snapshot(Some(city_ids.as_slice()))
        .await;
    Ok(Json(snapshot))
}
