use axum::Router;
use axum::routing::get;
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Build the full route table over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/weather", get(handlers::weather_handler))
        .route(
            "/api/map/clouds/{z}/{x}/{y}",
            get(handlers::clouds_tile_handler),
        )
        .route(
            "/api/map/precipitation/{z}/{x}/{y}",
            get(handlers::precipitation_tile_handler),
        )
        .route(
            "/api/race/{id}",
            get(handlers::get_race_handler).put(handlers::update_race_handler),
        )
        .route("/api/series/{id}", get(handlers::get_series_handler))
        .with_state(state)
}
