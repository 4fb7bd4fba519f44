use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use raceweather_gateway::{app, config, rate_limit, state::AppState};

// this is main async function with tokio
#[tokio::main]
async fn main() {
    let args = config::Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_key = config::api_key_from_env();
    if api_key.is_none() {
        // not fatal: affected requests answer 500 until the key is provided
        warn!(
            "{} is not set, weather and cloud tile requests will fail",
            config::API_KEY_ENV
        );
    }

    // creating shared state
    let state = Arc::new(AppState::new(&args, api_key));

    // spawn the periodic rate limit sweep
    let sweeper = rate_limit::spawn_sweeper(Arc::clone(&state.rate_limiter));

    let app = app::router(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!("Gateway running on http://localhost:{}", args.port);
    info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    info!("Forecast cache TTL: {} seconds", args.cache_ttl);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .unwrap();

    sweeper.abort();
}
