//! Configuration management for the Weather Watch ingestion service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with WX_ prefix
//!    (e.g. WX_WEATHER__API_KEY, WX_DATABASE__URL)

use std::path::PathBuf;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Storage backend selection
    pub storage: StorageConfig,

    /// Database configuration; required for the postgres backend
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Provider base URL
    pub api_endpoint: String,

    /// Provider API key; the run fails fast when absent
    pub api_key: String,

    /// Watch-list of location query strings
    pub locations: Vec<String>,

    /// Forecast horizon in days (1..=14)
    pub forecast_days: u32,

    /// Delay between provider requests; 0 skips the sleep
    pub rate_delay_secs: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Output directory for the csv backend
    pub csv_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Csv,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

/// WeatherAPI accepts at most a two-week horizon
const MAX_FORECAST_DAYS: u32 = 14;

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WX_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("weather.api_endpoint", "https://api.weatherapi.com/v1")?
            .set_default("weather.locations", vec!["Rochester,NY".to_string()])?
            .set_default("weather.forecast_days", 3)?
            .set_default("weather.rate_delay_secs", 0.6)?
            .set_default("storage.backend", "postgres")?
            .set_default("storage.csv_dir", ".")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WX_ prefix)
            .add_source(
                Environment::with_prefix("WX")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("weather.locations")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.weather.forecast_days < 1 || self.weather.forecast_days > MAX_FORECAST_DAYS {
            return Err(ConfigError::Message(format!(
                "weather.forecast_days must be between 1 and {}",
                MAX_FORECAST_DAYS
            )));
        }
        if self.weather.location_list().is_empty() {
            return Err(ConfigError::Message(
                "weather.locations must name at least one location".to_string(),
            ));
        }
        Ok(())
    }
}

impl WeatherConfig {
    /// The configured watch-list, trimmed, with empty entries dropped
    pub fn location_list(&self) -> Vec<String> {
        self.locations
            .iter()
            .map(|query| query.trim())
            .filter(|query| !query.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Inter-request delay as a `Duration`; negative values behave like zero
    pub fn rate_delay(&self) -> Duration {
        if self.rate_delay_secs > 0.0 {
            Duration::from_secs_f64(self.rate_delay_secs)
        } else {
            Duration::ZERO
        }
    }
}
