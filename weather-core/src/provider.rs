use crate::{Config, WeatherReading, error::ProviderError, provider::open_meteo::OpenMeteoProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

/// Source of current weather by coordinates.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// One attempt, no retry. Bounded only by the client's own timeout.
    async fn fetch_current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReading, ProviderError>;
}

/// Construct the Open-Meteo provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = OpenMeteoProvider::from_config(&config.open_meteo).map_err(|e| {
        anyhow::anyhow!(
            "Failed to build Open-Meteo client for '{}': {e}",
            config.open_meteo.base_url
        )
    })?;

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_default_config_builds() {
        let cfg = Config::default();
        assert!(provider_from_config(&cfg).is_ok());
    }
}
