use clap::Parser;

/// Environment variable holding the weather/cloud-tile provider credential.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "raceweather-gateway")]
#[command(about = "Rate-limited weather and map tile proxy for race schedules")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Forecast cache TTL in seconds
    #[arg(short, long, default_value_t = 1800)]
    pub cache_ttl: u64,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 5)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // Upstream call budget in seconds
    #[arg(long, default_value_t = 5)]
    pub upstream_timeout: u64,

    // One Call API endpoint
    #[arg(
        long,
        default_value = "https://api.openweathermap.org/data/3.0/onecall"
    )]
    pub weather_url: String,

    // Cloud tile base URL, /{z}/{x}/{y}.png is appended
    #[arg(long, default_value = "https://tile.openweathermap.org/map/clouds_new")]
    pub clouds_url: String,

    // Precipitation tile base URL, /{z}/{x}/{y}/8/1_1.png is appended
    #[arg(
        long,
        default_value = "https://tilecache.rainviewer.com/v2/radar/latest/256"
    )]
    pub precipitation_url: String,
}

/// Read the provider credential from the environment.
///
/// A missing key is not fatal at startup: requests that need it answer 500
/// until it is configured.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())
}
