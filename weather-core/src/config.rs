use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path, path::PathBuf, time::Duration};

use crate::model::City;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

const ENV_BIND: &str = "WEATHER_BIND";
const ENV_OPEN_METEO_URL: &str = "WEATHER_OPEN_METEO_BASE_URL";

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// Directory with a built UI, served at `/` when present.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            static_dir: None,
        }
    }
}

/// Open-Meteo client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenMeteoConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPEN_METEO_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl OpenMeteoConfig {
    /// Connect/read timeout, never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [server]
/// bind = "127.0.0.1:8080"
///
/// [open_meteo]
/// timeout_seconds = 5
///
/// [[cities]]
/// id = 1
/// name = "Kyiv"
/// latitude = 50.45
/// longitude = 30.52
/// timezone = "Europe/Kyiv"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub open_meteo: OpenMeteoConfig,
    pub cities: Vec<City>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            open_meteo: OpenMeteoConfig::default(),
            cities: default_cities(),
        }
    }
}

fn default_cities() -> Vec<City> {
    let city = |id, name: &str, latitude, longitude, timezone: &str| City {
        id,
        name: name.to_string(),
        latitude,
        longitude,
        timezone: timezone.to_string(),
    };

    vec![
        city(1, "Kyiv", 50.45, 30.52, "Europe/Kyiv"),
        city(2, "London", 51.50, -0.12, "Europe/London"),
        city(3, "Berlin", 52.52, 13.40, "Europe/Berlin"),
        city(4, "New York", 40.71, -74.01, "America/New_York"),
        city(5, "Tokyo", 35.68, 139.69, "Asia/Tokyo"),
    ]
}

impl Config {
    /// Load config from the default location, or the built-in default if there is none yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use the seed cities.
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the default config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `WEATHER_BIND` / `WEATHER_OPEN_METEO_BASE_URL` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
            self.server.bind = bind;
        }
        if let Some(url) = lookup(ENV_OPEN_METEO_URL).filter(|v| !v.is_empty()) {
            self.open_meteo.base_url = url;
        }
    }

    /// Check the loaded values before the service starts.
    pub fn validate(&self) -> Result<()> {
        if self.open_meteo.base_url.trim().is_empty() {
            bail!("open_meteo.base_url must not be empty");
        }

        let mut ids = HashSet::with_capacity(self.cities.len());
        for city in &self.cities {
            if !ids.insert(city.id) {
                bail!("Duplicate city id {} ('{}')", city.id, city.name);
            }
            if city.name.trim().is_empty() {
                bail!("City {} has an empty name", city.id);
            }
            if !(-90.0..=90.0).contains(&city.latitude) {
                bail!("City '{}' has latitude {} outside [-90, 90]", city.name, city.latitude);
            }
            if !(-180.0..=180.0).contains(&city.longitude) {
                bail!("City '{}' has longitude {} outside [-180, 180]", city.name, city.longitude);
            }
        }

        Ok(())
    }
}
