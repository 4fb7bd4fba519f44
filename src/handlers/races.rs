use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::models::SeriesType;
use crate::races::update_race_weather;
use crate::state::AppState;

pub async fn get_race_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.races.get_race_by_id(&id) {
        Some(race) => Json(race).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Race not found" })),
        )
            .into_response(),
    }
}

/// Refresh the weather reading attached to a race.
pub async fn update_race_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match update_race_weather(&state, &id).await {
        Ok(Some(race)) => Json(race).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Race not found" })),
        )
            .into_response(),
        Err(err) => {
            error!(race = %id, error = %err, "failed to update race weather");
            err.into_response()
        }
    }
}

pub async fn get_series_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let series = SeriesType::parse(&id).and_then(|series| state.races.get_series_by_id(series));
    match series {
        Some(series) => Json(series).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Series not found" })),
        )
            .into_response(),
    }
}
