use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---- One Call API payloads ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

// Rain/snow volume, e.g. {"1h": 0.3}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Precipitation {
    #[serde(rename = "1h", default, skip_serializing_if = "Option::is_none")]
    pub one_hour: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub dt: i64,
    pub temp: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dew_point: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uvi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clouds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_deg: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<Precipitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<Precipitation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub dt: i64,
    pub temp: f64,
    pub humidity: i64,
    // probability of precipitation, 0.0 to 1.0
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uvi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clouds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_deg: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<Precipitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<Precipitation>,
}

// Only the fields the weather summary needs; daily entries are never relayed
// to clients verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    pub dt: i64,
    #[serde(default)]
    pub pop: f64,
}

/// Typed One Call response, validated at the gateway boundary before any
/// field is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneCallResponse {
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone_offset: Option<i64>,
    pub current: CurrentWeather,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hourly: Vec<HourlyForecast>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daily: Vec<DailyForecast>,
}

// ---- Race schedule domain ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    F1,
    Wrc,
    MotoGp,
    Nascar,
}

impl SeriesType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesType::F1 => "f1",
            SeriesType::Wrc => "wrc",
            SeriesType::MotoGp => "motogp",
            SeriesType::Nascar => "nascar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "f1" => Some(SeriesType::F1),
            "wrc" => Some(SeriesType::Wrc),
            "motogp" => Some(SeriesType::MotoGp),
            "nascar" => Some(SeriesType::Nascar),
            _ => None,
        }
    }

    pub const fn all() -> &'static [SeriesType] {
        &[
            SeriesType::F1,
            SeriesType::Wrc,
            SeriesType::MotoGp,
            SeriesType::Nascar,
        ]
    }
}

impl std::fmt::Display for SeriesType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceLocation {
    pub name: String,
    pub city: String,
    pub country: String,
    pub coordinates: Coordinates,
}

/// Compact weather summary shown on race cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub temperature: i64,
    pub rain_chance: i64,
    pub wind_speed: i64,
    pub air_pressure: i64,
    pub humidity: i64,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall_amount: Option<f64>,
}

impl WeatherData {
    /// Summarize a forecast: rain chance comes from the first hourly slot,
    /// falling back to the first daily slot when hourly data was excluded.
    pub fn from_forecast(forecast: &OneCallResponse) -> Self {
        let rain_chance = forecast
            .hourly
            .first()
            .map(|h| h.pop)
            .or_else(|| forecast.daily.first().map(|d| d.pop))
            .map(|pop| (pop * 100.0).round() as i64)
            .unwrap_or(0);

        let rainfall_amount = forecast
            .hourly
            .first()
            .and_then(|h| h.rain.as_ref())
            .or(forecast.current.rain.as_ref())
            .and_then(|rain| rain.one_hour);

        Self {
            temperature: forecast.current.temp.round() as i64,
            rain_chance,
            wind_speed: forecast.current.wind_speed.round() as i64,
            air_pressure: forecast.current.pressure,
            humidity: forecast.current.humidity,
            updated_at: Utc::now().to_rfc3339(),
            rainfall_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceEvent {
    pub id: String,
    pub series: SeriesType,
    pub name: String,
    pub date: String,
    pub location: RaceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherData>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    pub id: SeriesType,
    pub name: String,
    pub current_season: String,
    pub races: Vec<RaceEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast(hourly: Vec<HourlyForecast>, daily: Vec<DailyForecast>) -> OneCallResponse {
        OneCallResponse {
            lat: 51.5,
            lon: -0.12,
            timezone: Some("Europe/London".to_string()),
            timezone_offset: Some(0),
            current: CurrentWeather {
                dt: 1_754_300_000,
                temp: 18.4,
                pressure: 1012,
                humidity: 71,
                wind_speed: 4.6,
                weather: vec![],
                sunrise: None,
                sunset: None,
                feels_like: Some(17.9),
                dew_point: None,
                uvi: None,
                clouds: None,
                visibility: None,
                wind_deg: None,
                wind_gust: None,
                rain: Some(Precipitation { one_hour: Some(0.2) }),
                snow: None,
            },
            hourly,
            daily,
        }
    }

    fn hour(pop: f64, rain: Option<f64>) -> HourlyForecast {
        HourlyForecast {
            dt: 1_754_303_600,
            temp: 17.8,
            humidity: 70,
            pop,
            weather: vec![],
            feels_like: None,
            pressure: None,
            uvi: None,
            clouds: None,
            visibility: None,
            wind_speed: None,
            wind_deg: None,
            rain: rain.map(|mm| Precipitation { one_hour: Some(mm) }),
            snow: None,
        }
    }

    #[test]
    fn series_type_roundtrip() {
        for series in SeriesType::all() {
            assert_eq!(SeriesType::parse(series.as_str()), Some(*series));
        }
        assert_eq!(SeriesType::parse("indycar"), None);
    }

    #[test]
    fn summary_prefers_hourly_rain_chance() {
        let data = WeatherData::from_forecast(&forecast(vec![hour(0.4, Some(0.8))], vec![]));
        assert_eq!(data.rain_chance, 40);
        assert_eq!(data.rainfall_amount, Some(0.8));
        assert_eq!(data.temperature, 18);
        assert_eq!(data.wind_speed, 5);
        assert_eq!(data.air_pressure, 1012);
        assert_eq!(data.humidity, 71);
    }

    #[test]
    fn summary_falls_back_to_daily_then_zero() {
        let with_daily = WeatherData::from_forecast(&forecast(
            vec![],
            vec![DailyForecast { dt: 1, pop: 0.75 }],
        ));
        assert_eq!(with_daily.rain_chance, 75);

        let bare = WeatherData::from_forecast(&forecast(vec![], vec![]));
        assert_eq!(bare.rain_chance, 0);
    }

    #[test]
    fn summary_rainfall_falls_back_to_current() {
        // hourly slot has no rain volume, current does
        let data = WeatherData::from_forecast(&forecast(vec![hour(0.1, None)], vec![]));
        assert_eq!(data.rainfall_amount, Some(0.2));
    }

    #[test]
    fn one_call_response_parses_provider_payload() {
        let body = serde_json::json!({
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
        });

        let parsed: OneCallResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.current.weather[0].description, "light rain");
        assert_eq!(parsed.current.rain.as_ref().unwrap().one_hour, Some(0.3));
        assert_eq!(parsed.hourly.len(), 1);
        assert!(parsed.daily.is_empty());
    }

    #[test]
    fn weather_data_serializes_camel_case() {
        let data = WeatherData {
            temperature: 18,
            rain_chance: 40,
            wind_speed: 5,
            air_pressure: 1012,
            humidity: 71,
            updated_at: "2026-08-06T12:00:00Z".to_string(),
            rainfall_amount: None,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["rainChance"], 40);
        assert_eq!(json["airPressure"], 1012);
        assert!(json.get("rainfallAmount").is_none());
        assert_eq!(json["updatedAt"], "2026-08-06T12:00:00Z");
    }
}
