use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::location::{default_locations, Location};

/// Environment variable that overrides `services.prediction_api_url`
pub const API_URL_ENV: &str = "SOLARFEED_API_URL";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Remote service endpoints
    pub services: ServiceConfig,

    /// Live feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Device location settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Address used for a one-off manual prediction at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserAddressConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the prediction API (e.g. http://127.0.0.1:8000/api/v1)
    pub prediction_api_url: String,

    /// Forward geocoding search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// User-Agent sent with every outgoing request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_prediction_api_url() -> String {
    "http://127.0.0.1:8000/api/v1".to_string()
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_user_agent() -> String {
    format!("SolarFeed/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            prediction_api_url: default_prediction_api_url(),
            geocoding_url: default_geocoding_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Seconds between location changes (default: 10)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Maximum number of predictions kept in history (default: 20)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Sites the feed rotates through
    #[serde(default = "default_locations")]
    pub locations: Vec<Location>,
}

fn default_interval() -> u64 {
    10
}

fn default_history_capacity() -> usize {
    20
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            history_capacity: default_history_capacity(),
            locations: default_locations(),
        }
    }
}

/// Device location source. Leaving the coordinates unset means the host
/// has no geolocation capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// How long to wait for a position fix (default: 10)
    #[serde(default = "default_device_timeout")]
    pub timeout_secs: u64,
}

fn default_device_timeout() -> u64 {
    10
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            timeout_secs: default_device_timeout(),
        }
    }
}

impl DeviceConfig {
    /// Configured fixed coordinates, if both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// A manually entered address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAddressConfig {
    #[serde(default)]
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub country: String,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("solarfeed");

        Self {
            config_dir,
            services: ServiceConfig::default(),
            feed: FeedConfig::default(),
            device: DeviceConfig::default(),
            user: None,
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment overrides for this run only. Call after loading;
    /// never save a config that has had them applied.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            tracing::info!("Using prediction API URL from {}", API_URL_ENV);
            self.services.prediction_api_url = url;
        }
    }

    /// Load configuration from an explicit path, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.services.prediction_api_url,
            "services.prediction_api_url",
            &mut result,
        );
        self.validate_url(
            &self.services.geocoding_url,
            "services.geocoding_url",
            &mut result,
        );

        if self.services.request_timeout_secs == 0 {
            result.add_error(
                "services.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.feed.interval_secs == 0 {
            result.add_error("feed.interval_secs", "Feed interval must be greater than 0");
        } else if self.feed.interval_secs > 3600 {
            result.add_warning("feed.interval_secs", "Feed interval is more than an hour");
        }

        if self.feed.history_capacity == 0 {
            result.add_error(
                "feed.history_capacity",
                "History capacity must be greater than 0",
            );
        }

        if self.feed.locations.is_empty() {
            result.add_error("feed.locations", "At least one location is required");
        }

        for (i, loc) in self.feed.locations.iter().enumerate() {
            if !loc.has_valid_coordinates() {
                result.add_error(
                    format!("feed.locations[{}]", i),
                    format!("Coordinates out of range for {}", loc.name),
                );
            }
        }

        match (self.device.latitude, self.device.longitude) {
            (Some(_), None) | (None, Some(_)) => {
                result.add_warning(
                    "device",
                    "Only one device coordinate set - device location disabled",
                );
            }
            (None, None) => {
                result.add_warning("device", "No device location configured");
            }
            (Some(_), Some(_)) => {}
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("solarfeed");

        Ok(config_dir.join("config.toml"))
    }
}
