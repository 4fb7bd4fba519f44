use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{error, info};

use crate::metrics::REQUEST_TOTAL;
use crate::state::AppState;
use crate::upstream::UpstreamError;
use crate::validate::{TileCoord, validate_tile};

const TILE_CACHE_CONTROL: &str = "public, max-age=300";

/// Proxy for the weather provider's cloud tiles. Keeps the API key out of
/// tile URLs handed to browsers.
pub async fn clouds_tile_handler(
    State(state): State<Arc<AppState>>,
    Path((z, x, y)): Path<(String, String, String)>,
) -> Response {
    REQUEST_TOTAL.inc();

    let tile = match validate_tile(&z, &x, &y) {
        Ok(tile) => tile,
        Err(err) => {
            error!(%z, %x, %y, "invalid cloud tile request: {err}");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    let Some(api_key) = state.api_key.as_deref() else {
        error!("tile API key not configured");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error").into_response();
    };

    info!(z = tile.z, x = tile.x, y = tile.y, "cloud tile request");
    let url = format!(
        "{}/{}/{}/{}.png?appid={}",
        state.clouds_url, tile.z, tile.x, tile.y, api_key
    );
    relay_tile(&state, &url, tile, "Failed to fetch map tile").await
}

/// Proxy for the precipitation radar tiles. The provider needs no key, but
/// proxying keeps one consistent tile surface for the map layer.
pub async fn precipitation_tile_handler(
    State(state): State<Arc<AppState>>,
    Path((z, x, y)): Path<(String, String, String)>,
) -> Response {
    REQUEST_TOTAL.inc();

    let tile = match validate_tile(&z, &x, &y) {
        Ok(tile) => tile,
        Err(err) => {
            error!(%z, %x, %y, "invalid precipitation tile request: {err}");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    info!(z = tile.z, x = tile.x, y = tile.y, "precipitation tile request");
    let url = format!(
        "{}/{}/{}/{}/8/1_1.png",
        state.precipitation_url, tile.z, tile.x, tile.y
    );
    relay_tile(&state, &url, tile, "Failed to fetch precipitation map tile").await
}

// No rate limiting here: map panning fans out dozens of tile requests per
// second, and the tile endpoints are not the metered quota.
async fn relay_tile(state: &AppState, url: &str, tile: TileCoord, failure_msg: &str) -> Response {
    match state.upstream.fetch_tile(url).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, TILE_CACHE_CONTROL),
            ],
            bytes,
        )
            .into_response(),
        Err(UpstreamError::Timeout) => {
            error!(z = tile.z, x = tile.x, y = tile.y, "map tile request timed out");
            (StatusCode::GATEWAY_TIMEOUT, "Map tile request timed out").into_response()
        }
        Err(UpstreamError::Status { status, .. }) => {
            error!(status, "map tile API error");
            (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                failure_msg.to_string(),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "error in map tile proxy");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
