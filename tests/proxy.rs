//! End-to-end tests: the real router in front of a fake upstream provider.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use raceweather_gateway::app::router;
use raceweather_gateway::cache::ForecastCache;
use raceweather_gateway::races::RaceStore;
use raceweather_gateway::rate_limit::RateLimitStore;
use raceweather_gateway::state::AppState;
use raceweather_gateway::upstream::UpstreamClient;

const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn fake_onecall() -> Json<serde_json::Value> {
    Json(json!({
        "lat": 51.5,
        "lon": -0.12,
        "timezone": "Europe/London",
        "timezone_offset": 3600,
        "current": {
            "dt": 1754300000,
            "temp": 18.4,
            "feels_like": 17.9,
            "pressure": 1012,
            "humidity": 71,
            "wind_speed": 4.6,
            "weather": [
                {"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}
            ],
            "rain": {"1h": 0.3}
        },
        "hourly": [
            {"dt": 1754303600, "temp": 17.8, "humidity": 70, "pop": 0.4, "weather": []}
        ]
    }))
}

async fn slow_onecall() -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    fake_onecall().await
}

async fn busy_onecall() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"cod": 503, "message": "service busy"})),
    )
}

async fn fake_tile() -> impl IntoResponse {
    ([(axum::http::header::CONTENT_TYPE, "image/png")], FAKE_PNG)
}

fn upstream_router() -> Router {
    Router::new()
        .route("/onecall", get(fake_onecall))
        .route("/slow/onecall", get(slow_onecall))
        .route("/busy/onecall", get(busy_onecall))
        .route("/clouds/{z}/{x}/{file}", get(fake_tile))
        .route("/precip/{z}/{x}/{y}/{color}/{file}", get(fake_tile))
}

fn gateway_state_at(upstream: &str, api_key: Option<&str>, weather_path: &str) -> Arc<AppState> {
    Arc::new(AppState {
        upstream: UpstreamClient::new(Duration::from_secs(1)),
        forecast_cache: ForecastCache::new(Duration::from_secs(1800)),
        rate_limiter: Arc::new(RateLimitStore::new(5, Duration::from_secs(60))),
        races: RaceStore::with_sample_data(),
        api_key: api_key.map(str::to_string),
        weather_url: format!("{upstream}{weather_path}"),
        clouds_url: format!("{upstream}/clouds"),
        precipitation_url: format!("{upstream}/precip"),
    })
}

async fn spawn_gateway_at(api_key: Option<&str>, weather_path: &str) -> String {
    let upstream = serve(upstream_router()).await;
    let state = gateway_state_at(&upstream, api_key, weather_path);
    serve(router(state)).await
}

async fn spawn_gateway(api_key: Option<&str>) -> String {
    spawn_gateway_at(api_key, "/onecall").await
}

#[tokio::test]
async fn cloud_tile_is_relayed_as_png() {
    let base = spawn_gateway(Some("test-key")).await;

    let res = reqwest::get(format!("{base}/api/map/clouds/5/3/3"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers()["content-type"], "image/png");
    assert_eq!(res.headers()["cache-control"], "public, max-age=300");
    assert_eq!(res.bytes().await.unwrap().as_ref(), FAKE_PNG);
}

#[tokio::test]
async fn precipitation_tile_needs_no_credential() {
    let base = spawn_gateway(None).await;

    let res = reqwest::get(format!("{base}/api/map/precipitation/5/3/3"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers()["content-type"], "image/png");
}

#[tokio::test]
async fn cloud_tile_without_credential_is_500() {
    let base = spawn_gateway(None).await;

    let res = reqwest::get(format!("{base}/api/map/clouds/5/3/3"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);
    assert_eq!(res.text().await.unwrap(), "Server configuration error");
}

#[tokio::test]
async fn tile_validation_rejects_bad_segments() {
    let base = spawn_gateway(Some("test-key")).await;

    let res = reqwest::get(format!("{base}/api/map/clouds/12.5/3/3"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    assert_eq!(res.text().await.unwrap(), "Invalid map parameters");

    let res = reqwest::get(format!("{base}/api/map/clouds/19/0/0"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    assert_eq!(res.text().await.unwrap(), "Zoom out of range");

    let res = reqwest::get(format!("{base}/api/map/precipitation/5/32/0"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    assert_eq!(res.text().await.unwrap(), "Tile coordinates out of range");
}

#[tokio::test]
async fn weather_is_relayed_with_cache_headers() {
    let base = spawn_gateway(Some("test-key")).await;

    let res = reqwest::get(format!("{base}/api/weather?lat=51.5&lng=-0.12"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.headers()["cache-control"],
        "public, max-age=300, stale-while-revalidate=600"
    );
    assert!(res.headers().contains_key("expires"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["current"]["temp"], 18.4);
    assert_eq!(body["hourly"][0]["pop"], 0.4);
}

#[tokio::test]
async fn weather_validation_answers_400() {
    let base = spawn_gateway(Some("test-key")).await;

    let res = reqwest::get(format!("{base}/api/weather?lat=51.5"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Missing required parameters: lat and lng are required"
    );

    let res = reqwest::get(format!("{base}/api/weather?lat=abc&lng=0"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Invalid coordinates: lat and lng must be valid numbers"
    );

    let res = reqwest::get(format!("{base}/api/weather?lat=91&lng=0"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid latitude: must be between -90 and 90");
}

#[tokio::test]
async fn sixth_weather_request_is_rate_limited() {
    let base = spawn_gateway(Some("test-key")).await;
    let url = format!("{base}/api/weather?lat=51.5&lng=-0.12");

    for attempt in 1..=5 {
        let res = reqwest::get(&url).await.unwrap();
        assert_eq!(res.status().as_u16(), 200, "request {attempt} should pass");
    }

    let res = reqwest::get(&url).await.unwrap();
    assert_eq!(res.status().as_u16(), 429);
    assert_eq!(res.headers()["retry-after"], "60");
    assert_eq!(res.headers()["x-ratelimit-limit"], "5");
    assert_eq!(res.headers()["x-ratelimit-remaining"], "0");
    assert!(res.headers().contains_key("x-ratelimit-reset"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");

    // a different location is a different key for the same origin
    let res = reqwest::get(format!("{base}/api/weather?lat=43.7347&lng=7.4206"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
}

#[tokio::test]
async fn weather_without_credential_is_500() {
    let base = spawn_gateway(None).await;

    let res = reqwest::get(format!("{base}/api/weather?lat=51.5&lng=-0.12"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Weather API configuration error. Please contact support."
    );
}

#[tokio::test]
async fn weather_upstream_timeout_is_504() {
    let base = spawn_gateway_at(Some("test-key"), "/slow/onecall").await;

    let res = reqwest::get(format!("{base}/api/weather?lat=51.5&lng=-0.12"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 504);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(
        body["error"].as_str().unwrap().contains("timed out"),
        "error should mention the timeout: {body}"
    );
}

#[tokio::test]
async fn weather_upstream_failure_relays_status_and_message() {
    let base = spawn_gateway_at(Some("test-key"), "/busy/onecall").await;

    let res = reqwest::get(format!("{base}/api/weather?lat=51.5&lng=-0.12"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 503);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Weather data unavailable: service busy");
}

#[tokio::test]
async fn race_lookup_and_weather_update() {
    let base = spawn_gateway(Some("test-key")).await;
    let client = reqwest::Client::new();

    let res = reqwest::get(format!("{base}/api/race/f1-monaco-2026"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let race: serde_json::Value = res.json().await.unwrap();
    assert_eq!(race["name"], "Monaco Grand Prix");
    assert!(race.get("weatherData").is_none());

    let res = client
        .put(format!("{base}/api/race/f1-monaco-2026"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["weatherData"]["temperature"], 18);
    assert_eq!(updated["weatherData"]["rainChance"], 40);

    let res = reqwest::get(format!("{base}/api/race/nope")).await.unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Race not found");
}

#[tokio::test]
async fn series_lookup() {
    let base = spawn_gateway(Some("test-key")).await;

    let res = reqwest::get(format!("{base}/api/series/f1")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let series: serde_json::Value = res.json().await.unwrap();
    assert_eq!(series["name"], "Formula 1");
    assert!(!series["races"].as_array().unwrap().is_empty());

    let res = reqwest::get(format!("{base}/api/series/indycar"))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn health_reports_status() {
    let base = spawn_gateway(None).await;

    let res = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}
