use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("raceweather_requests_total", "Total number of requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "raceweather_rate_limited_total",
        "Weather requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("raceweather_forecast_cache_hits_total", "Total forecast cache hits")
            .unwrap();
    pub static ref CACHE_MISSES: Counter = register_counter!(
        "raceweather_forecast_cache_misses_total",
        "Total forecast cache misses"
    )
    .unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "raceweather_upstream_latency_seconds",
        "Upstream provider latency in seconds"
    )
    .unwrap();
    pub static ref RATE_ENTRIES: Gauge = register_gauge!(
        "raceweather_rate_limit_entries",
        "Current number of rate limit entries"
    )
    .unwrap();
}
