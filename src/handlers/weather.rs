use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::error::GatewayError;
use crate::metrics::{RATE_LIMITED_TOTAL, REQUEST_TOTAL, UPSTREAM_LATENCY};
use crate::state::AppState;
use crate::validate::validate_coordinates;

// One Call parts the map view never reads, excluded to shrink the payload
const WEATHER_EXCLUDE: &str = "minutely,daily,alerts";

const WEATHER_CACHE_CONTROL: &str = "public, max-age=300, stale-while-revalidate=600";

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    lat: Option<String>,
    lng: Option<String>,
}

pub async fn weather_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<WeatherQuery>,
) -> Result<Response, GatewayError> {
    REQUEST_TOTAL.inc();

    // validation first: malformed requests never consume quota
    let coords = validate_coordinates(query.lat.as_deref(), query.lng.as_deref())
        .map_err(|err| {
            error!(%err, "rejected weather request");
            GatewayError::from(err)
        })?;

    // key by origin plus the rounded coordinates, so one client hammering a
    // single location is throttled per target, not locked out globally
    let origin = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");
    let client_key = format!("{origin}-{}-{}", coords.lat, coords.lng);

    let decision = state.rate_limiter.check(&client_key);
    if !decision.allowed {
        RATE_LIMITED_TOTAL.inc();
        error!(key = %client_key, "rate limit exceeded");
        let window_secs = state.rate_limiter.window().as_secs();
        return Err(GatewayError::QuotaExceeded {
            limit: state.rate_limiter.limit(),
            retry_after_secs: window_secs,
            reset_epoch: Utc::now().timestamp() + window_secs as i64,
        });
    }

    // credential check comes after admission so quota accounting stays
    // consistent whether or not the server is configured
    let api_key = state.api_key.as_deref().ok_or_else(|| {
        error!("weather API key not configured in environment");
        GatewayError::Misconfigured
    })?;

    info!(lat = coords.lat, lng = coords.lng, "fetching weather data");

    let started = Instant::now();
    let forecast = state
        .upstream
        .fetch_weather(
            &state.weather_url,
            coords.lat,
            coords.lng,
            api_key,
            WEATHER_EXCLUDE,
        )
        .await?;
    UPSTREAM_LATENCY.observe(started.elapsed().as_secs_f64());

    let expires = (Utc::now() + chrono::Duration::seconds(300))
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();

    Ok((
        [
            (header::CACHE_CONTROL, WEATHER_CACHE_CONTROL.to_string()),
            (header::EXPIRES, expires),
        ],
        Json(forecast),
    )
        .into_response())
}
