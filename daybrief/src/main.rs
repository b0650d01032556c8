/*
daybrief - single-binary main.rs
This binary gathers one user's daily briefing (news, weather, traffic) and
writes it as a JSON document for downstream rendering.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::Config;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use daybrief::briefing::BriefingPipeline;
use daybrief::memory::MemoryLog;
use daybrief::news;
use daybrief::profile;
use daybrief::traffic::TrafficClient;
use daybrief::weather::client::WeatherClient;
use daybrief::weather::DEFAULT_RAIN_THRESHOLD_PCT;

#[derive(Parser, Debug)]
#[command(name = "daybrief", about = "Daybrief daily briefing pipeline")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// User id to brief (key into the preferences file)
    #[arg(long, default_value = "user_123")]
    user: String,

    /// Write the briefing JSON to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    // Load configuration with defaults
    let config = match Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref()
    ).await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    // Load the user's profile from the preferences file
    let profile_path = config
        .profile
        .as_ref()
        .and_then(|p| p.path.clone())
        .unwrap_or_else(|| "db/preferences.json".to_string());
    let user_profile = match profile::load_profile(Path::new(&profile_path), &args.user).await? {
        Some(p) => p,
        None => {
            error!(user = %args.user, path = %profile_path, "user not found in preferences");
            return Err(anyhow::anyhow!(
                "User {} not found in {}",
                args.user,
                profile_path
            ));
        }
    };
    info!(user = %args.user, name = %user_profile.name, "profile loaded");

    // Dedup memory store
    let log_path = config
        .memory
        .as_ref()
        .and_then(|m| m.log_path.clone())
        .unwrap_or_else(|| "db/memory_log.json".to_string());
    let retention_days = config
        .memory
        .as_ref()
        .and_then(|m| m.retention_days)
        .unwrap_or(MemoryLog::DEFAULT_RETENTION_DAYS);
    let memory = MemoryLog::new(&log_path, retention_days);
    info!(path = %log_path, retention_days, "memory log ready");

    // News fetch client
    let search_url = config
        .news
        .as_ref()
        .and_then(|n| n.search_url.clone())
        .unwrap_or_else(|| "https://news.google.com/rss/search".to_string());
    let max_items = config
        .news
        .as_ref()
        .and_then(|n| n.max_items_per_interest)
        .unwrap_or(3);
    let fetch_timeout = config
        .news
        .as_ref()
        .and_then(|n| n.fetch_timeout_seconds)
        .unwrap_or(10);
    let feed_client = news::feed_client(fetch_timeout)?;

    let mut pipeline =
        BriefingPipeline::new(feed_client, search_url, memory).with_max_items(max_items);

    // Optional arms: a missing or misconfigured client skips the arm
    // instead of failing the run.
    match create_weather_client(&config) {
        Ok(Some((client, threshold))) => {
            pipeline = pipeline.with_weather(client, threshold);
        }
        Ok(None) => info!("weather not configured; briefing will omit it"),
        Err(e) => warn!(%e, "failed to initialize weather client; briefing will omit weather"),
    }
    match create_traffic_client(&config) {
        Ok(Some(client)) => {
            pipeline = pipeline.with_traffic(client);
        }
        Ok(None) => info!("traffic not configured; briefing will omit it"),
        Err(e) => warn!(%e, "failed to initialize traffic client; briefing will omit traffic"),
    }

    info!(user = %args.user, "gathering briefing");
    let briefing = pipeline.gather(&args.user, &user_profile).await;

    let json = serde_json::to_string_pretty(&briefing).context("failed to serialize briefing")?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &json)
                .await
                .with_context(|| format!("failed to write briefing to {}", path.display()))?;
            info!(path = %path.display(), "briefing written");
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Create the weather client from configuration, with the API key read
/// from the configured env var. `Ok(None)` means the section is absent.
fn create_weather_client(config: &Config) -> Result<Option<(WeatherClient, f64)>> {
    let weather_config = match config.weather.as_ref() {
        Some(c) => c,
        None => return Ok(None),
    };

    let api_key_env = weather_config
        .api_key_env
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Missing api_key_env in weather config"))?;
    let api_key = std::env::var(api_key_env)
        .with_context(|| format!("Weather API key env var '{}' not set", api_key_env))?;

    let api_url = weather_config
        .api_url
        .clone()
        .unwrap_or_else(|| "https://weather.googleapis.com/v1".to_string());
    let units = weather_config
        .units
        .clone()
        .unwrap_or_else(|| "metric".to_string());
    let timeout_secs = weather_config.timeout_seconds.unwrap_or(10);
    let threshold = weather_config
        .rain_threshold_pct
        .unwrap_or(DEFAULT_RAIN_THRESHOLD_PCT);

    let client = WeatherClient::new(api_url, api_key)
        .with_units(units)
        .with_timeout(timeout_secs);
    Ok(Some((client, threshold)))
}

/// Create the traffic client from configuration. `Ok(None)` means the
/// section is absent.
fn create_traffic_client(config: &Config) -> Result<Option<TrafficClient>> {
    let traffic_config = match config.traffic.as_ref() {
        Some(c) => c,
        None => return Ok(None),
    };

    let api_key_env = traffic_config
        .api_key_env
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Missing api_key_env in traffic config"))?;
    let api_key = std::env::var(api_key_env)
        .with_context(|| format!("Directions API key env var '{}' not set", api_key_env))?;

    let api_url = traffic_config
        .api_url
        .clone()
        .unwrap_or_else(|| "https://maps.googleapis.com/maps/api/directions/json".to_string());
    let timeout_secs = traffic_config.timeout_seconds.unwrap_or(10);

    Ok(Some(
        TrafficClient::new(api_url, api_key).with_timeout(timeout_secs),
    ))
}
