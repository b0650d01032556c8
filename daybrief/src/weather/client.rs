/*!
daybrief/src/weather/client.rs

Forecast payload fetch and boundary decoding.

All payload quirks are absorbed here, before anything reaches the
extractor: hours with missing or mangled timestamps are skipped, missing
numeric fields default to zero, and rain probability is normalized to
percent whichever of its two historical shapes the payload used.
*/

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{derive_insights, DailySummary, HourlyObservation, WeatherInsights};

/// HTTP client for a Google-style forecast API exposing
/// `forecast/days:lookup` and `forecast/hours:lookup`.
pub struct WeatherClient {
    base_url: String,
    api_key: String,
    units: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            units: "metric".to_string(),
            timeout: Duration::from_secs(10),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    /// Fetch the daily and hourly forecasts for a location and reduce them
    /// to derived facts. Two single-shot requests, no retries.
    pub async fn fetch_insights(
        &self,
        latitude: f64,
        longitude: f64,
        rain_threshold_pct: f64,
    ) -> Result<WeatherInsights> {
        let units_param = if self.units.eq_ignore_ascii_case("imperial") {
            "IMPERIAL"
        } else {
            "METRIC"
        };
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let daily_url = format!("{}/forecast/days:lookup", self.base_url);
        let daily_params = [
            ("key", self.api_key.as_str()),
            ("location.latitude", lat.as_str()),
            ("location.longitude", lon.as_str()),
            ("days", "1"),
            ("unitsSystem", units_param),
        ];
        let daily_body = self.get_text(&daily_url, &daily_params).await?;
        let daily = decode_daily_json(&daily_body).context("Failed to decode daily forecast")?;

        let hourly_url = format!("{}/forecast/hours:lookup", self.base_url);
        let hourly_params = [
            ("key", self.api_key.as_str()),
            ("location.latitude", lat.as_str()),
            ("location.longitude", lon.as_str()),
            ("hours", "24"),
            ("unitsSystem", units_param),
        ];
        let hourly_body = self.get_text(&hourly_url, &hourly_params).await?;
        let hours = decode_hourly_json(&hourly_body).context("Failed to decode hourly forecast")?;

        debug!(hours = hours.len(), "decoded forecast observations");
        Ok(derive_insights(&daily, &hours, rain_threshold_pct))
    }

    async fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let response = tokio::time::timeout(
            self.timeout,
            self.client.get(url).query(params).send(),
        )
        .await
        .context("weather request timed out")?
        .context("weather HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("weather API error {}: {}", status, body);
        }

        response
            .text()
            .await
            .context("Failed to read weather response body")
    }
}

/// Decode a daily forecast payload to the day's summary.
/// Missing pieces degrade to "Unknown" conditions, absent temperatures and
/// zero UV rather than failing the briefing.
pub fn decode_daily_json(body: &str) -> Result<DailySummary> {
    let payload: DailyPayload =
        serde_json::from_str(body).context("daily forecast is not valid JSON")?;
    let day = payload.forecast_days.into_iter().next().unwrap_or_default();
    let daytime = day.daytime_forecast.unwrap_or_default();
    let nighttime = day.nighttime_forecast.unwrap_or_default();

    Ok(DailySummary {
        day_condition: condition_text(&daytime),
        night_condition: condition_text(&nighttime),
        temp_max: day.max_temperature.and_then(|d| d.degrees),
        temp_min: day.min_temperature.and_then(|d| d.degrees),
        uv_index: daytime.uv_index.unwrap_or(0.0),
    })
}

/// Decode an hourly forecast payload to normalized observations.
/// Hours without a parsable `interval.startTime` are skipped; missing
/// numeric fields default to zero; rain probability comes out in percent.
pub fn decode_hourly_json(body: &str) -> Result<Vec<HourlyObservation>> {
    let payload: HourlyPayload =
        serde_json::from_str(body).context("hourly forecast is not valid JSON")?;

    let mut hours = Vec::with_capacity(payload.forecast_hours.len());
    let mut skipped = 0usize;

    for hour in payload.forecast_hours {
        let start = match hour.interval.as_ref().and_then(|i| i.start_time.as_deref()) {
            Some(s) => s,
            None => {
                skipped += 1;
                continue;
            }
        };
        let time = match DateTime::parse_from_rfc3339(start) {
            Ok(t) => t.with_timezone(&Utc),
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        hours.push(HourlyObservation {
            time,
            uv_index: hour.uv_index.unwrap_or(0.0),
            temperature: hour.temperature.and_then(|d| d.degrees).unwrap_or(0.0),
            rain_chance: hour
                .precipitation
                .and_then(|p| p.probability)
                .map(|p| p.as_percent())
                .unwrap_or(0.0),
        });
    }

    if skipped > 0 {
        warn!(
            count = skipped,
            "skipped forecast hours with missing or invalid timestamps"
        );
    }

    Ok(hours)
}

fn condition_text(part: &DayPart) -> String {
    part.weather_condition
        .as_ref()
        .and_then(|c| c.description.as_ref())
        .and_then(|d| d.text.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

// Forecast payload structures

#[derive(Debug, Deserialize)]
struct DailyPayload {
    #[serde(rename = "forecastDays", default)]
    forecast_days: Vec<ForecastDay>,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastDay {
    #[serde(rename = "daytimeForecast")]
    daytime_forecast: Option<DayPart>,
    #[serde(rename = "nighttimeForecast")]
    nighttime_forecast: Option<DayPart>,
    #[serde(rename = "maxTemperature")]
    max_temperature: Option<Degrees>,
    #[serde(rename = "minTemperature")]
    min_temperature: Option<Degrees>,
}

#[derive(Debug, Default, Deserialize)]
struct DayPart {
    #[serde(rename = "weatherCondition")]
    weather_condition: Option<WeatherCondition>,
    #[serde(rename = "uvIndex")]
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: Option<ConditionDescription>,
}

#[derive(Debug, Deserialize)]
struct ConditionDescription {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Degrees {
    degrees: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyPayload {
    #[serde(rename = "forecastHours", default)]
    forecast_hours: Vec<ForecastHour>,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastHour {
    interval: Option<Interval>,
    #[serde(rename = "uvIndex")]
    uv_index: Option<f64>,
    temperature: Option<Degrees>,
    precipitation: Option<Precipitation>,
}

#[derive(Debug, Deserialize)]
struct Interval {
    #[serde(rename = "startTime")]
    start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Precipitation {
    probability: Option<Probability>,
}

/// The probability field has shipped in two shapes over time: an object
/// carrying `percent` (0..=100), and a bare fraction (0.0..=1.0).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Probability {
    Detailed { percent: Option<f64> },
    Fraction(f64),
}

impl Probability {
    /// Canonical unit is percent. Fractions convert; percents pass through.
    fn as_percent(&self) -> f64 {
        match self {
            Probability::Detailed { percent } => percent.unwrap_or(0.0),
            Probability::Fraction(v) => v * 100.0,
        }
    }
}
