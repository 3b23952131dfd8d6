//! Configuration management for `GeoScan`
//!
//! Handles loading configuration from an optional TOML file and
//! `GEOSCAN__*` environment variables, and validates the result.

use crate::GeoScanError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "geoscan.toml";

/// Root configuration structure for the `GeoScan` service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Inbound HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Weather provider (OpenWeatherMap)
    #[serde(default = "ProviderConfig::weather")]
    pub weather: ProviderConfig,
    /// Reverse geocoding provider (Mapbox)
    #[serde(default = "ProviderConfig::geocoding")]
    pub geocoding: ProviderConfig,
    /// Settings shared by all outbound calls
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Location catalog storage
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Credentials and endpoint of one upstream provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider credential, sent with every request
    pub api_key: Option<String>,
    /// Base URL the request path is appended to
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Upper bound for one upstream call, connect to last body byte
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// SQLite file holding the curated locations
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Optional JSON file replacing the built-in seed list
    pub seed_file: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_connect_timeout() -> u64 {
    3
}

fn default_user_agent() -> String {
    format!("GeoScan/{}", env!("CARGO_PKG_VERSION"))
}

fn default_database_path() -> String {
    "locations.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            weather: ProviderConfig::weather(),
            geocoding: ProviderConfig::geocoding(),
            upstream: UpstreamConfig::default(),
            catalog: CatalogConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ProviderConfig {
    fn weather() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }

    fn geocoding() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            seed_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file =
            config_path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        } else if config_path.is_some() {
            return Err(GeoScanError::config(format!(
                "Config file not found: {}",
                config_file.display()
            ))
            .into());
        }

        // GEOSCAN__WEATHER__API_KEY -> weather.api_key
        builder = builder.add_source(
            Environment::with_prefix("GEOSCAN")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ScanConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_credential_fallbacks();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Pick up the bare `WEATHER_KEY` / `MAPBOX_KEY` variables when no
    /// prefixed key was configured.
    fn apply_credential_fallbacks(&mut self) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = std::env::var("WEATHER_KEY").ok();
        }
        if self.geocoding.api_key.is_none() {
            self.geocoding.api_key = std::env::var("MAPBOX_KEY").ok();
        }
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.catalog.database_path.is_empty() {
            self.catalog.database_path = default_database_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        // an empty key is the same as no key
        self.weather.api_key = self.weather.api_key.take().filter(|k| !k.trim().is_empty());
        self.geocoding.api_key = self.geocoding.api_key.take().filter(|k| !k.trim().is_empty());
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<(), GeoScanError> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<(), GeoScanError> {
        if self.server.port == 0 {
            return Err(GeoScanError::config("Server port cannot be 0"));
        }

        if self.upstream.timeout_seconds == 0 {
            return Err(GeoScanError::config(
                "Upstream timeout must be at least 1 second",
            ));
        }

        if self.upstream.timeout_seconds > 60 {
            return Err(GeoScanError::config(
                "Upstream timeout cannot exceed 60 seconds",
            ));
        }

        if self.upstream.connect_timeout_seconds > self.upstream.timeout_seconds {
            return Err(GeoScanError::config(
                "Upstream connect timeout cannot exceed the request timeout",
            ));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<(), GeoScanError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(GeoScanError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(GeoScanError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("Geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(GeoScanError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        Ok(())
    }
}
