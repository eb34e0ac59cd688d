use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configured city. Read-only from the aggregation's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name, e.g. "Europe/Kyiv".
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Entry of the city picker list served at `/api/cities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub id: i64,
    pub name: String,
    pub timezone: String,
}

impl From<&City> for CitySummary {
    fn from(city: &City) -> Self {
        Self {
            id: city.id,
            name: city.name.clone(),
            timezone: city.timezone.clone(),
        }
    }
}

/// Normalized current-weather reading returned by a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub temperature_celsius: f64,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeatherStatus {
    Ok,
    Error,
}

/// Per-city entry of a [`WeatherSnapshot`].
///
/// Build it through [`CityWeather::ok`] or [`CityWeather::error`]: an `Ok`
/// entry always carries a temperature and a timestamp and never a message,
/// an `Error` entry carries only the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityWeather {
    pub city_id: i64,
    pub city_name: String,
    pub temperature_celsius: Option<f64>,
    pub status: WeatherStatus,
    pub data_timestamp: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub timezone: String,
}

impl CityWeather {
    pub fn ok(city: &City, reading: WeatherReading) -> Self {
        Self {
            city_id: city.id,
            city_name: city.name.clone(),
            temperature_celsius: Some(reading.temperature_celsius),
            status: WeatherStatus::Ok,
            data_timestamp: Some(reading.observed_at),
            message: None,
            timezone: city.timezone.clone(),
        }
    }

    pub fn error(city: &City, message: impl Into<String>) -> Self {
        Self {
            city_id: city.id,
            city_name: city.name.clone(),
            temperature_celsius: None,
            status: WeatherStatus::Error,
            data_timestamp: None,
            message: Some(message.into()),
            timezone: city.timezone.clone(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == WeatherStatus::Ok
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub generated_at: DateTime<Utc>,
    pub cities: Vec<CityWeather>,
}
