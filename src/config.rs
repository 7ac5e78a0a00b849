//! Configuration management for routecast
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RoutecastError;
use crate::models::City;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutecastConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Route persistence backend
    #[serde(default)]
    pub storage: StorageConfig,
    /// Forecast and geocoding API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Forecast cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// City search backend
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Where saved routes live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `fjall`
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Database directory for the fjall backend
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in hours, 0 disables the cache
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Where city search results come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// `open_meteo` (geocoding API) or `catalog` (the cities below, offline)
    #[serde(default = "default_search_backend")]
    pub backend: String,
    /// Cities served by the `catalog` backend
    #[serde(default)]
    pub cities: Vec<City>,
}

// Default value functions
fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

fn default_storage_path() -> String {
    "~/.local/share/routecast/routes".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_weather_max_retries() -> u32 {
    3
}

fn default_cache_ttl() -> u32 {
    6
}

fn default_cache_location() -> String {
    "~/.cache/routecast".to_string()
}

fn default_search_backend() -> String {
    "open_meteo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_storage_path(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            geocoding_url: default_geocoding_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
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

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: default_search_backend(),
            cities: Vec::new(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 3600)
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.ttl_hours > 0
    }
}

/// Expand a leading `~/` to the home directory
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

impl RoutecastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ROUTECAST__WEATHER__MAX_RETRIES=5 and friends
        builder = builder.add_source(
            Environment::with_prefix("ROUTECAST")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RoutecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("routecast").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.storage.backend.is_empty() {
            self.storage.backend = default_storage_backend();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.search.backend.is_empty() {
            self.search.backend = default_search_backend();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                RoutecastError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(RoutecastError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.cache.ttl_hours > 168 {
            return Err(
                RoutecastError::config("Cache TTL cannot exceed 168 hours (1 week)").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RoutecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RoutecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_backends = ["memory", "fjall"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(RoutecastError::config(format!(
                "Invalid storage backend '{}'. Must be one of: {}",
                self.storage.backend,
                valid_backends.join(", ")
            ))
            .into());
        }

        let valid_search_backends = ["open_meteo", "catalog"];
        if !valid_search_backends.contains(&self.search.backend.as_str()) {
            return Err(RoutecastError::config(format!(
                "Invalid search backend '{}'. Must be one of: {}",
                self.search.backend,
                valid_search_backends.join(", ")
            ))
            .into());
        }

        if self.search.backend == "catalog" && self.search.cities.is_empty() {
            return Err(
                RoutecastError::config("Catalog search needs at least one city").into(),
            );
        }

        for (label, url) in [
            ("Weather API base URL", &self.weather.base_url),
            ("Geocoding API URL", &self.weather.geocoding_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RoutecastError::config(format!(
                    "{label} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RoutecastConfig::default();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.cache.ttl_hours, 6);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.server.address(), "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = RoutecastConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = RoutecastConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_unknown_backend() {
        let mut config = RoutecastConfig::default();
        config.storage.backend = "postgres".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = RoutecastConfig::default();
        config.weather.base_url.clear();
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[storage]\nbackend = \"fjall\"\npath = \"/tmp/routes\"\n\n[cache]\nttl_hours = 0"
        )
        .unwrap();

        let config = RoutecastConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.storage.backend, "fjall");
        assert_eq!(config.storage.path, "/tmp/routes");
        assert!(!config.cache.enabled());
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_catalog_search() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"[search]
backend = "catalog"

[[search.cities]]
id = 1
name = "Paris"
coordinates = {{ latitude = 48.85, longitude = 2.35 }}

[[search.cities]]
id = 2
name = "Lyon""#
        )
        .unwrap();

        let config = RoutecastConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.search.backend, "catalog");
        assert_eq!(config.search.cities.len(), 2);
        assert_eq!(config.search.cities[0].name, "Paris");
        assert!(config.search.cities[0].coordinates.is_some());
        assert!(config.search.cities[1].coordinates.is_none());
    }

    #[test]
    fn test_catalog_search_needs_cities() {
        let mut config = RoutecastConfig::default();
        assert_eq!(config.search.backend, "open_meteo");
        config.search.backend = "catalog".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("at least one city"));

        config.search.backend = "nominatim".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_ttl() {
        let cache = CacheConfig::default();
        assert_eq!(cache.ttl(), Duration::from_secs(6 * 3600));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/lib/x"), PathBuf::from("/var/lib/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/data"), home.join("data"));
        }
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = RoutecastConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("routecast"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
