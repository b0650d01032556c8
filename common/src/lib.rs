/*!
common/src/lib.rs

Shared configuration types and filesystem helpers for Daybrief.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file
- A helper to prepare parent directories before first write
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Dedup memory log configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path to the JSON log file (e.g. "db/memory_log.json")
    pub log_path: Option<String>,
    /// How many days a recorded sighting stays valid
    pub retention_days: Option<i64>,
}

/// User preferences source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Path to the preferences JSON file, keyed by user id
    pub path: Option<String>,
}

/// News search feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Base URL of the RSS search endpoint
    pub search_url: Option<String>,
    pub max_items_per_interest: Option<usize>,
    pub fetch_timeout_seconds: Option<u64>,
}

/// Weather forecast API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_url: Option<String>,
    /// Name of the env var holding the API key (keys never live in config)
    pub api_key_env: Option<String>,
    pub units: Option<String>, // "metric" or "imperial"
    /// Rain probability (percent) at or above which an hour counts as notable
    pub rain_threshold_pct: Option<f64>,
    pub timeout_seconds: Option<u64>,
}

/// Commute traffic API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub memory: Option<MemoryConfig>,
    pub profile: Option<ProfileConfig>,
    pub news: Option<NewsConfig>,
    pub weather: Option<WeatherConfig>,
    pub traffic: Option<TrafficConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Ensure the parent directory of `path` exists, creating it if necessary.
/// Called before the first write of any durable file so a fresh checkout
/// can run without manual setup.
///
/// Example:
///   ensure_parent_dir(Path::new("db/memory_log.json")).await?;
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }
    }
    Ok(())
}
