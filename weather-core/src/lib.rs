//! Core library for the weather dashboard backend.
//!
//! This crate defines:
//! - Configuration (server, Open-Meteo client, configured cities)
//! - The weather provider abstraction and its Open-Meteo adapter
//! - The snapshot aggregation service with per-city failure isolation
//!
//! It is used by `weather-server`, but has no dependency on any HTTP server framework.

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod repository;
pub mod service;
pub mod timestamp;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, OpenMeteoConfig, ServerConfig};
pub use error::{ProviderError, TimestampError};
pub use model::{City, CitySummary, CityWeather, WeatherReading, WeatherSnapshot, WeatherStatus};
pub use provider::{WeatherProvider, open_meteo::OpenMeteoProvider, provider_from_config};
pub use repository::{CityRepository, InMemoryCityRepository};
pub use service::WeatherService;
