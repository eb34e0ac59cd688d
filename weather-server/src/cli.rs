use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use weather_core::{
    Config, InMemoryCityRepository, SystemClock, WeatherService, WeatherSnapshot, WeatherStatus,
    provider_from_config,
};

use crate::routes::{self, AppState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather dashboard backend")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a default config file with the seed cities.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Run the HTTP API.
    Serve {
        /// Address to listen on, overriding the config file.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Fetch one snapshot and print it.
    Show {
        /// City id to include; repeat for several. All cities when absent.
        #[arg(long = "city-id")]
        city_ids: Vec<i64>,

        /// Print the snapshot as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Init { force } => {
                let path = match self.config {
                    Some(path) => path,
                    None => Config::config_file_path()?,
                };
                init_config(&path, force)?;
                println!("Wrote default configuration to {}", path.display());
                Ok(())
            }
            Command::Serve { bind } => {
                let config = load_config(self.config.as_deref())?;
                let service = build_service(&config)?;
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                serve(service, &bind, &config).await
            }
            Command::Show { city_ids, json } => {
                let config = load_config(self.config.as_deref())?;
                let service = build_service(&config)?;
                let snapshot = service
                    .get_weather_snapshot(Some(city_ids.as_slice()))
                    .await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                } else {
                    print!("{}", render_snapshot(&snapshot));
                }
                Ok(())
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file {} already exists. Hint: pass --force to overwrite it.",
            path.display()
        );
    }

    Config::default().save_to(path)
}

fn build_service(config: &Config) -> anyhow::Result<WeatherService> {
    let cities = InMemoryCityRepository::new(config.cities.iter().cloned());
    tracing::info!("Loaded {} cities", cities.len());

    let provider = provider_from_config(config)?;

    Ok(WeatherService::new(
        Arc::new(cities),
        Arc::from(provider),
        Arc::new(SystemClock),
    ))
}

async fn serve(service: WeatherService, bind: &str, config: &Config) -> anyhow::Result<()> {
    let app = routes::router(AppState { service }, config.server.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    tracing::info!("Weather server listening on {}", bind);
    tracing::info!("Open-Meteo endpoint: {}", config.open_meteo.base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Weather server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Human-readable table for the `show` command.
fn render_snapshot(snapshot: &WeatherSnapshot) -> String {
    let mut out = format!(
        "Weather snapshot at {}\n",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if snapshot.cities.is_empty() {
        out.push_str("  (no matching cities)\n");
        return out;
    }

    for city in &snapshot.cities {
        let row = match (city.status, city.temperature_celsius, city.data_timestamp) {
            (WeatherStatus::Ok, Some(temp), Some(ts)) => format!(
                "  {:>4}  {:<16} {:>6.1} °C  observed {} ({})\n",
                city.city_id,
                city.city_name,
                temp,
                ts.format("%Y-%m-%d %H:%M UTC"),
                city.timezone,
            ),
            _ => format!(
                "  {:>4}  {:<16} {:>9}  {}\n",
                city.city_id,
                city.city_name,
                "ERROR",
                city.message.as_deref().unwrap_or("Unknown error"),
            ),
        };
        out.push_str(&row);
    }

    out
}
