use std::sync::Arc;
use std::time::Duration;

use crate::cache::ForecastCache;
use crate::config::Args;
use crate::races::RaceStore;
use crate::rate_limit::RateLimitStore;
use crate::upstream::UpstreamClient;

// app's shared state
pub struct AppState {
    pub upstream: UpstreamClient,
    pub forecast_cache: ForecastCache,
    // shared with the background sweeper
    pub rate_limiter: Arc<RateLimitStore>,
    pub races: RaceStore,
    pub api_key: Option<String>,
    pub weather_url: String,
    pub clouds_url: String,
    pub precipitation_url: String,
}

impl AppState {
    pub fn new(args: &Args, api_key: Option<String>) -> Self {
        Self {
            upstream: UpstreamClient::new(Duration::from_secs(args.upstream_timeout)),
            forecast_cache: ForecastCache::new(Duration::from_secs(args.cache_ttl)),
            rate_limiter: Arc::new(RateLimitStore::new(
                args.rate_limit,
                Duration::from_secs(args.rate_window),
            )),
            races: RaceStore::with_sample_data(),
            api_key,
            weather_url: args.weather_url.clone(),
            clouds_url: args.clouds_url.clone(),
            precipitation_url: args.precipitation_url.clone(),
        }
    }
}
