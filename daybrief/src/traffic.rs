/*!
daybrief/src/traffic.rs

Commute delay facts from a directions API.

Reduces the first route's first leg to typed durations and a delay in
seconds. No message text is composed here; the briefing carries facts and
downstream rendering decides how to phrase them.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the briefing needs to know about the commute: how long it takes
/// today versus normally, and by which route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommuteFacts {
    pub origin: String,
    pub destination: String,
    pub route_summary: String,
    pub normal_secs: u64,
    pub in_traffic_secs: u64,
    /// In-traffic minus normal, floored at zero.
    pub delay_secs: u64,
    pub normal_text: String,
    pub in_traffic_text: String,
}

/// HTTP client for a Google-style directions API.
pub struct TrafficClient {
    api_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl TrafficClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    /// Fetch current commute facts for the given endpoints. Single-shot
    /// request with `departure_time=now` so the in-traffic duration is
    /// populated.
    pub async fn fetch_commute(&self, origin: &str, destination: &str) -> Result<CommuteFacts> {
        let params = [
            ("origin", origin),
            ("destination", destination),
            ("departure_time", "now"),
            ("key", self.api_key.as_str()),
        ];

        let response = tokio::time::timeout(
            self.timeout,
            self.client.get(&self.api_url).query(&params).send(),
        )
        .await
        .context("directions request timed out")?
        .context("directions HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("directions API error {}: {}", status, body);
        }

        let payload: DirectionsPayload = response
            .json()
            .await
            .context("Failed to parse directions response")?;

        let route = payload
            .routes
            .into_iter()
            .next()
            .context("directions response has no routes")?;
        let summary = route.summary;
        let leg = route
            .legs
            .into_iter()
            .next()
            .context("directions route has no legs")?;

        let normal = leg.duration.unwrap_or_default();
        let in_traffic = leg.duration_in_traffic.unwrap_or_else(|| normal.clone());
        let delay_secs = in_traffic.value.saturating_sub(normal.value);

        Ok(CommuteFacts {
            origin: origin.to_string(),
            destination: destination.to_string(),
            route_summary: summary.unwrap_or_else(|| "your usual route".to_string()),
            normal_secs: normal.value,
            in_traffic_secs: in_traffic.value,
            delay_secs,
            normal_text: normal.text,
            in_traffic_text: in_traffic.text,
        })
    }
}

// Directions payload structures

#[derive(Debug, Deserialize)]
struct DirectionsPayload {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    summary: Option<String>,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    duration: Option<DurationValue>,
    duration_in_traffic: Option<DurationValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DurationValue {
    #[serde(default)]
    text: String,
    #[serde(default)]
    value: u64,
}
