use chrono::Utc;
use dashmap::DashMap;
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES};
use crate::models::{
    Coordinates, RaceEvent, RaceLocation, SeriesData, SeriesType, WeatherData,
};
use crate::state::AppState;

// Race forecasts only need current and daily data
const RACE_EXCLUDE: &str = "minutely,hourly,alerts";

/// In-memory race schedule store, seeded with sample records.
pub struct RaceStore {
    series: DashMap<SeriesType, SeriesData>,
}

impl RaceStore {
    pub fn with_sample_data() -> Self {
        let store = Self::empty();
        for series in sample_series() {
            store.series.insert(series.id, series);
        }
        store
    }

    pub fn empty() -> Self {
        Self {
            series: DashMap::new(),
        }
    }

    pub fn insert_series(&self, series: SeriesData) {
        self.series.insert(series.id, series);
    }

    pub fn get_series_by_id(&self, id: SeriesType) -> Option<SeriesData> {
        self.series.get(&id).map(|entry| entry.value().clone())
    }

    pub fn get_races_by_series(&self, id: SeriesType) -> Vec<RaceEvent> {
        self.series
            .get(&id)
            .map(|entry| entry.races.clone())
            .unwrap_or_default()
    }

    pub fn get_race_by_id(&self, race_id: &str) -> Option<RaceEvent> {
        for entry in self.series.iter() {
            if let Some(race) = entry.races.iter().find(|race| race.id == race_id) {
                return Some(race.clone());
            }
        }
        None
    }

    /// Store a fresh weather reading on a race and stamp `updated_at`.
    pub fn set_race_weather(&self, race_id: &str, weather: WeatherData) -> Option<RaceEvent> {
        for mut entry in self.series.iter_mut() {
            if let Some(race) = entry.races.iter_mut().find(|race| race.id == race_id) {
                race.weather_data = Some(weather);
                race.updated_at = Utc::now().to_rfc3339();
                return Some(race.clone());
            }
        }
        None
    }
}

/// Refresh the stored weather for one race.
///
/// A failed refresh keeps the previous reading when one exists; with no
/// prior reading the upstream error propagates to the caller.
pub async fn update_race_weather(
    state: &AppState,
    race_id: &str,
) -> Result<Option<RaceEvent>, GatewayError> {
    let Some(race) = state.races.get_race_by_id(race_id) else {
        return Ok(None);
    };

    let coords = race.location.coordinates;
    match fetch_weather_data(state, coords).await {
        Ok(weather) => {
            info!(race = race_id, lat = coords.lat, lng = coords.lng, "updated race weather");
            Ok(state.races.set_race_weather(race_id, weather))
        }
        Err(err) if race.weather_data.is_some() => {
            warn!(race = race_id, error = %err, "weather refresh failed, keeping previous reading");
            Ok(Some(race))
        }
        Err(err) => Err(err),
    }
}

/// Fetch a forecast summary for `coords`, going through the forecast cache.
pub async fn fetch_weather_data(
    state: &AppState,
    coords: Coordinates,
) -> Result<WeatherData, GatewayError> {
    if let Some(cached) = state.forecast_cache.get(coords.lat, coords.lng) {
        CACHE_HITS.inc();
        return Ok(WeatherData::from_forecast(&cached));
    }
    CACHE_MISSES.inc();

    let api_key = state.api_key.as_deref().ok_or(GatewayError::Misconfigured)?;
    let forecast = state
        .upstream
        .fetch_weather(&state.weather_url, coords.lat, coords.lng, api_key, RACE_EXCLUDE)
        .await?;

    state
        .forecast_cache
        .put(coords.lat, coords.lng, forecast.clone());
    Ok(WeatherData::from_forecast(&forecast))
}

fn race(
    id: &str,
    series: SeriesType,
    name: &str,
    date: &str,
    venue: &str,
    city: &str,
    country: &str,
    lat: f64,
    lng: f64,
) -> RaceEvent {
    RaceEvent {
        id: id.to_string(),
        series,
        name: name.to_string(),
        date: date.to_string(),
        location: RaceLocation {
            name: venue.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            coordinates: Coordinates { lat, lng },
        },
        weather_data: None,
        updated_at: Utc::now().to_rfc3339(),
    }
}

fn sample_series() -> Vec<SeriesData> {
    vec![
        SeriesData {
            id: SeriesType::F1,
            name: "Formula 1".to_string(),
            current_season: "2026".to_string(),
            races: vec![
                race(
                    "f1-monaco-2026",
                    SeriesType::F1,
                    "Monaco Grand Prix",
                    "2026-05-24T13:00:00Z",
                    "Circuit de Monaco",
                    "Monte Carlo",
                    "Monaco",
                    43.7347,
                    7.4206,
                ),
                race(
                    "f1-silverstone-2026",
                    SeriesType::F1,
                    "British Grand Prix",
                    "2026-07-05T14:00:00Z",
                    "Silverstone Circuit",
                    "Silverstone",
                    "United Kingdom",
                    52.0786,
                    -1.0169,
                ),
                race(
                    "f1-spa-2026",
                    SeriesType::F1,
                    "Belgian Grand Prix",
                    "2026-08-30T13:00:00Z",
                    "Circuit de Spa-Francorchamps",
                    "Stavelot",
                    "Belgium",
                    50.4372,
                    5.9714,
                ),
            ],
        },
        SeriesData {
            id: SeriesType::Wrc,
            name: "World Rally Championship".to_string(),
            current_season: "2026".to_string(),
            races: vec![
                race(
                    "wrc-finland-2026",
                    SeriesType::Wrc,
                    "Rally Finland",
                    "2026-07-30T08:00:00Z",
                    "Jyvaskyla Service Park",
                    "Jyvaskyla",
                    "Finland",
                    62.2426,
                    25.7473,
                ),
                race(
                    "wrc-monte-carlo-2026",
                    SeriesType::Wrc,
                    "Rallye Monte-Carlo",
                    "2026-01-22T09:00:00Z",
                    "Col de Turini",
                    "Monaco",
                    "Monaco",
                    43.9794,
                    7.3894,
                ),
            ],
        },
        SeriesData {
            id: SeriesType::MotoGp,
            name: "MotoGP".to_string(),
            current_season: "2026".to_string(),
            races: vec![race(
                "motogp-mugello-2026",
                SeriesType::MotoGp,
                "Italian Grand Prix",
                "2026-05-31T12:00:00Z",
                "Mugello Circuit",
                "Scarperia e San Piero",
                "Italy",
                43.9975,
                11.3719,
            )],
        },
        SeriesData {
            id: SeriesType::Nascar,
            name: "NASCAR Cup Series".to_string(),
            current_season: "2026".to_string(),
            races: vec![race(
                "nascar-daytona-2026",
                SeriesType::Nascar,
                "Daytona 500",
                "2026-02-15T19:00:00Z",
                "Daytona International Speedway",
                "Daytona Beach",
                "United States",
                29.1852,
                -81.0705,
            )],
        },
    ]
}
