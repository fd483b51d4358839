use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::forecast::DEFAULT_FORECAST_DAYS;

pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";
pub const UPSTREAM_BASE_URL_ENV: &str = "OPENWEATHERMAP_BASE_URL";
pub const SERVICE_BASE_URL_ENV: &str = "WEATHER_API_BASE_URL";
pub const BIND_ADDR_ENV: &str = "WEATHER_BIND_ADDR";

/// Top-level configuration stored on disk, overridable from the environment.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Oslo"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Root of the upstream weather/geocoding API.
    pub upstream_base_url: String,

    /// Where display clients find the proxy's HTTP API.
    pub service_base_url: String,

    /// Listen address for `weather serve`.
    pub bind_addr: String,

    /// City used when a request names none.
    pub default_city: String,

    /// Number of geocoding matches requested when the caller gives no limit.
    pub geocoding_limit: u32,

    /// Upstream unit system ("metric", "imperial" or "standard").
    pub units: String,

    /// Days kept by the forecast aggregation.
    pub forecast_days: usize,

    /// UTC offset, in seconds, that forecast day boundaries are taken in.
    pub forecast_utc_offset_secs: i32,

    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            upstream_base_url: "https://api.openweathermap.org".to_string(),
            service_base_url: "http://localhost:8000/api".to_string(),
            bind_addr: "127.0.0.1:8000".to_string(),
            default_city: "London".to_string(),
            geocoding_limit: 5,
            units: "metric".to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            forecast_utc_offset_secs: 0,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let cfg = Self::load_file()?;
        Ok(cfg.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Override fields from environment variables, looked up through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = get(UPSTREAM_BASE_URL_ENV) {
            self.upstream_base_url = url;
        }
        if let Some(url) = get(SERVICE_BASE_URL_ENV) {
            self.service_base_url = url;
        }
        if let Some(addr) = get(BIND_ADDR_ENV) {
            self.bind_addr = addr;
        }
        self
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-proxy", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The upstream API key, or an error with a hint on how to provide one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No OpenWeatherMap API key configured.\n\
                 Hint: set {API_KEY_ENV} or run `weather configure`."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn forecast_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.forecast_utc_offset_secs).ok_or_else(|| {
            anyhow!(
                "forecast_utc_offset_secs must be within one day, got {}",
                self.forecast_utc_offset_secs
            )
        })
    }
}
