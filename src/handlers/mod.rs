mod health;
mod metrics;
mod races;
mod tiles;
mod weather;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use races::{get_race_handler, get_series_handler, update_race_handler};
pub use tiles::{clouds_tile_handler, precipitation_tile_handler};
pub use weather::weather_handler;
