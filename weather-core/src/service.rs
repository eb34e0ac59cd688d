//! Snapshot aggregation over the configured cities.

use std::sync::Arc;

use crate::{
    clock::Clock,
    model::{City, CityWeather, WeatherSnapshot},
    provider::WeatherProvider,
    repository::CityRepository,
};

/// Message used when a failure carries no description of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Unable to fetch weather";

#[derive(Debug, Clone)]
pub struct WeatherService {
    cities: Arc<dyn CityRepository>,
    provider: Arc<dyn WeatherProvider>,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    pub fn new(
        cities: Arc<dyn CityRepository>,
        provider: Arc<dyn WeatherProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cities,
            provider,
            clock,
        }
    }

    pub fn cities(&self) -> &Arc<dyn CityRepository> {
        &self.cities
    }

    /// Fetch current weather for the requested cities, one provider call per city.
    ///
    /// `None` or an empty slice means every configured city, ascending by id.
    /// Otherwise the requested order is kept and unknown ids are dropped.
    /// Provider failures become `ERROR` entries; they never fail the snapshot.
    pub async fn get_weather_snapshot(&self, city_ids: Option<&[i64]>) -> WeatherSnapshot {
        let cities = self.resolve(city_ids);
        let generated_at = self.clock.now();

        tracing::debug!(count = cities.len(), "Assembling weather snapshot");

        let mut results = Vec::with_capacity(cities.len());
        for city in &cities {
            results.push(self.fetch_city(city).await);
        }

        WeatherSnapshot {
            generated_at,
            cities: results,
        }
    }

    fn resolve(&self, city_ids: Option<&[i64]>) -> Vec<City> {
        match city_ids {
            Some(ids) if !ids.is_empty() => self.cities.find_by_ids(ids),
            _ => self.cities.find_all(),
        }
    }

    async fn fetch_city(&self, city: &City) -> CityWeather {
        match self
            .provider
            .fetch_current_weather(city.latitude, city.longitude)
            .await
        {
            Ok(reading) => CityWeather::ok(city, reading),
            Err(err) => {
                tracing::error!(city = %city.name, error = %err, "Failed to retrieve weather");
                CityWeather::error(city, failure_message(&err))
            }
        }
    }
}

fn failure_message(err: &dyn std::error::Error) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock, error::ProviderError, model::WeatherReading, model::WeatherStatus,
        repository::InMemoryCityRepository,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn city(id: i64, name: &str, latitude: f64, longitude: f64) -> City {
        City {
            id,
            name: name.to_string(),
            latitude,
            longitude,
            timezone: "UTC".to_string(),
        }
    }

    /// Answers by latitude; unknown coordinates fail with status 500.
    #[derive(Debug, Default)]
    struct StubProvider {
        readings: Vec<(f64, WeatherReading)>,
        calls: Mutex<Vec<(f64, f64)>>,
    }

    impl StubProvider {
        fn with(mut self, latitude: f64, temperature: f64, observed_at: &str) -> Self {
            self.readings.push((
                latitude,
                WeatherReading {
                    temperature_celsius: temperature,
                    observed_at: at(observed_at),
                },
            ));
            self
        }

        fn calls(&self) -> Vec<(f64, f64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch_current_weather(
            &self,
            latitude: f64,
            longitude: f64,
        ) -> Result<WeatherReading, ProviderError> {
            self.calls.lock().unwrap().push((latitude, longitude));
            self.readings
                .iter()
                .find(|(lat, _)| *lat == latitude)
                .map(|(_, reading)| *reading)
                .ok_or(ProviderError::Status {
                    status: 500,
                    detail: None,
                })
        }
    }

    fn service(provider: Arc<StubProvider>) -> WeatherService {
        let repo = InMemoryCityRepository::new([
            city(2, "London", 51.50, -0.12),
            city(1, "Kyiv", 50.45, 30.52),
            city(3, "Berlin", 52.52, 13.40),
        ]);

        WeatherService::new(
            Arc::new(repo),
            provider,
            Arc::new(FixedClock(at("2024-05-01T10:00:00Z"))),
        )
    }

    fn names(snapshot: &WeatherSnapshot) -> Vec<&str> {
        snapshot
            .cities
            .iter()
            .map(|c| c.city_name.as_str())
            .collect()
    }

    #[tokio::test]
    async fn snapshot_for_all_cities_is_ordered_by_id() {
        let provider = Arc::new(
            StubProvider::default()
                .with(50.45, 12.3, "2024-05-01T09:55:00Z")
                .with(51.50, 9.8, "2024-05-01T09:50:00Z")
                .with(52.52, 14.1, "2024-05-01T09:45:00Z"),
        );

        let snapshot = service(provider.clone()).get_weather_snapshot(None).await;

        assert_eq!(snapshot.generated_at, at("2024-05-01T10:00:00Z"));
        assert_eq!(names(&snapshot), vec!["Kyiv", "London", "Berlin"]);

        let kyiv = &snapshot.cities[0];
        assert_eq!(kyiv.city_id, 1);
        assert_eq!(kyiv.status, WeatherStatus::Ok);
        assert_eq!(kyiv.temperature_celsius, Some(12.3));
        assert_eq!(kyiv.data_timestamp, Some(at("2024-05-01T09:55:00Z")));
        assert_eq!(kyiv.message, None);

        assert_eq!(
            provider.calls(),
            vec![(50.45, 30.52), (51.50, -0.12), (52.52, 13.40)]
        );
    }

    #[tokio::test]
    async fn empty_id_list_means_all_cities() {
        let provider = Arc::new(StubProvider::default());
        let snapshot = service(provider).get_weather_snapshot(Some(&[][..])).await;
        assert_eq!(names(&snapshot), vec!["Kyiv", "London", "Berlin"]);
    }

    #[tokio::test]
    async fn subset_keeps_requested_order_and_drops_unknown_ids() {
        let provider = Arc::new(
            StubProvider::default()
                .with(52.52, 14.1, "2024-05-01T09:45:00Z")
                .with(50.45, 12.3, "2024-05-01T09:55:00Z"),
        );

        let snapshot = service(provider.clone())
            .get_weather_snapshot(Some(&[3, 99, 1][..]))
            .await;

        assert_eq!(names(&snapshot), vec!["Berlin", "Kyiv"]);
        assert!(snapshot.cities.iter().all(CityWeather::is_ok));
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn only_unknown_ids_yield_empty_snapshot() {
        let provider = Arc::new(StubProvider::default());
        let snapshot = service(provider.clone())
            .get_weather_snapshot(Some(&[42][..]))
            .await;

        assert!(snapshot.cities.is_empty());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn failing_city_does_not_affect_siblings() {
        // London has no stubbed reading and fails with 500.
        let provider = Arc::new(
            StubProvider::default()
                .with(50.45, 12.3, "2024-05-01T09:55:00Z")
                .with(52.52, 14.1, "2024-05-01T09:45:00Z"),
        );

        let snapshot = service(provider).get_weather_snapshot(None).await;

        assert_eq!(snapshot.cities.len(), 3);
        let statuses: Vec<WeatherStatus> = snapshot.cities.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![WeatherStatus::Ok, WeatherStatus::Error, WeatherStatus::Ok]
        );

        let london = &snapshot.cities[1];
        assert_eq!(london.city_name, "London");
        assert_eq!(london.temperature_celsius, None);
        assert_eq!(london.data_timestamp, None);
        assert_eq!(london.message.as_deref(), Some("Weather provider error 500"));
    }

    #[tokio::test]
    async fn every_entry_is_either_complete_ok_or_error_with_message() {
        let provider = Arc::new(StubProvider::default().with(51.50, 9.8, "2024-05-01T09:50:00Z"));

        let snapshot = service(provider).get_weather_snapshot(None).await;

        for entry in &snapshot.cities {
            match entry.status {
                WeatherStatus::Ok => {
                    assert!(entry.temperature_celsius.is_some());
                    assert!(entry.data_timestamp.is_some());
                    assert!(entry.message.is_none());
                }
                WeatherStatus::Error => {
                    assert!(entry.temperature_celsius.is_none());
                    assert!(entry.data_timestamp.is_none());
                    assert!(entry.message.is_some());
                }
            }
        }
    }

    #[derive(Debug)]
    struct Silent;

    impl std::fmt::Display for Silent {
        fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Ok(())
        }
    }

    impl std::error::Error for Silent {}

    #[test]
    fn failure_without_description_uses_fallback_message() {
        assert_eq!(failure_message(&Silent), FALLBACK_ERROR_MESSAGE);
        assert_eq!(
            failure_message(&ProviderError::MissingCurrentWeather),
            "Missing current weather in response"
        );
    }
}
