use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::OpenMeteoConfig, error::ProviderError, model::WeatherReading,
    timestamp::parse_observation_time,
};

use super::WeatherProvider;

/// Client for the Open-Meteo forecast API (`GET {base_url}/forecast`).
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    /// `timeout` bounds both connecting and the whole request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Transport)?;

        Ok(Self::with_client(base_url, http))
    }

    /// Use an existing client, sharing its connection pool.
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn from_config(config: &OpenMeteoConfig) -> Result<Self, ProviderError> {
        Self::new(config.base_url.as_str(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: Option<OmCurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    time: Option<String>,
}

/// Body Open-Meteo sends with 4xx responses.
#[derive(Debug, Deserialize)]
struct OmErrorResponse {
    reason: String,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReading, ProviderError> {
        let url = format!("{}/forecast", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        let status = res.status();

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                latitude,
                longitude,
                "Open-Meteo returned error status"
            );
            // The body only enriches the message; a failed read still reports the status.
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let body = res.text().await.map_err(ProviderError::Transport)?;
        parse_current_weather(&body)
    }
}

fn parse_current_weather(body: &str) -> Result<WeatherReading, ProviderError> {
    let parsed: OmForecastResponse = serde_json::from_str(body)?;

    let current = parsed.current_weather.ok_or(ProviderError::MissingCurrentWeather)?;
    let time = current.time.ok_or(ProviderError::MissingTimestamp)?;
    let observed_at = parse_observation_time(&time)?;

    Ok(WeatherReading {
        temperature_celsius: current.temperature,
        observed_at,
    })
}

fn error_detail(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<OmErrorResponse>(body) {
        Ok(err) => Some(err.reason),
        Err(_) => Some(truncate_body(body)),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
