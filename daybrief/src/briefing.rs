/*!
daybrief/src/briefing.rs

Concurrent gather of the briefing arms and final assembly.

The three arms (news, weather, traffic) run concurrently and degrade
independently: a failed fetch logs a warning and contributes nothing, so
one broken upstream never sinks the whole briefing. News fetches run one
task per topic of interest; the dedup store sits behind a mutex and every
batch passes through it under the lock, which is what keeps the same story
from surfacing under two interests at once.
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::memory::{MemoryLog, MemoryRecord};
use crate::news;
use crate::profile::UserProfile;
use crate::traffic::{CommuteFacts, TrafficClient};
use crate::weather::client::WeatherClient;
use crate::weather::{WeatherInsights, DEFAULT_RAIN_THRESHOLD_PCT};

/// Validated news for one interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestNews {
    pub interest: String,
    pub items: Vec<MemoryRecord>,
}

/// The assembled briefing document, ready for downstream rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub run_id: Uuid,
    pub user: String,
    pub generated_at: DateTime<Utc>,
    pub location: Option<String>,
    pub news: Vec<InterestNews>,
    pub weather: Option<WeatherInsights>,
    pub traffic: Option<CommuteFacts>,
}

/// Wires the fetch arms to one user's gather run.
pub struct BriefingPipeline {
    feed_client: reqwest::Client,
    search_url: String,
    max_items_per_interest: usize,
    memory: Arc<Mutex<MemoryLog>>,
    weather: Option<WeatherClient>,
    rain_threshold_pct: f64,
    traffic: Option<TrafficClient>,
}

impl BriefingPipeline {
    pub fn new(feed_client: reqwest::Client, search_url: impl Into<String>, memory: MemoryLog) -> Self {
        Self {
            feed_client,
            search_url: search_url.into(),
            max_items_per_interest: 3,
            memory: Arc::new(Mutex::new(memory)),
            weather: None,
            rain_threshold_pct: DEFAULT_RAIN_THRESHOLD_PCT,
            traffic: None,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items_per_interest = max_items;
        self
    }

    pub fn with_weather(mut self, client: WeatherClient, rain_threshold_pct: f64) -> Self {
        self.weather = Some(client);
        self.rain_threshold_pct = rain_threshold_pct;
        self
    }

    pub fn with_traffic(mut self, client: TrafficClient) -> Self {
        self.traffic = Some(client);
        self
    }

    /// Run every configured arm and assemble the briefing. Never fails;
    /// arms that error come back empty.
    pub async fn gather(&self, user_id: &str, profile: &UserProfile) -> Briefing {
        let city = profile.location.as_ref().map(|l| l.city.clone());

        let news_fut = self.gather_news(profile, city.as_deref());
        let weather_fut = self.gather_weather(profile);
        let traffic_fut = self.gather_traffic(profile);

        let (news, weather, traffic) = tokio::join!(news_fut, weather_fut, traffic_fut);

        let total_items: usize = news.iter().map(|n| n.items.len()).sum();
        info!(
            user = user_id,
            news_items = total_items,
            weather = weather.is_some(),
            traffic = traffic.is_some(),
            "briefing assembled"
        );

        Briefing {
            run_id: Uuid::new_v4(),
            user: user_id.to_string(),
            generated_at: Utc::now(),
            location: city,
            news,
            weather,
            traffic,
        }
    }

    /// One fetch task per interest, plus a top-headlines task for the
    /// user's city. Each task pushes its candidates through the shared
    /// dedup store under the lock.
    async fn gather_news(&self, profile: &UserProfile, city: Option<&str>) -> Vec<InterestNews> {
        let mut tasks: Vec<(String, JoinHandle<Vec<MemoryRecord>>)> = Vec::new();

        if let Some(city) = city {
            tasks.push((
                "top headlines".to_string(),
                self.spawn_news_task(NewsQuery::TopHeadlines(city.to_string())),
            ));
        }
        for interest in &profile.interests {
            tasks.push((
                interest.clone(),
                self.spawn_news_task(NewsQuery::Interest(interest.clone())),
            ));
        }

        let mut news = Vec::with_capacity(tasks.len());
        for (interest, handle) in tasks {
            let items = match handle.await {
                Ok(items) => items,
                Err(e) => {
                    warn!(interest = %interest, error = %e, "news task failed");
                    Vec::new()
                }
            };
            news.push(InterestNews { interest, items });
        }
        news
    }

    fn spawn_news_task(&self, query: NewsQuery) -> JoinHandle<Vec<MemoryRecord>> {
        let client = self.feed_client.clone();
        let search_url = self.search_url.clone();
        let memory = self.memory.clone();
        let max_items = self.max_items_per_interest;

        tokio::spawn(async move {
            let fetched = match &query {
                NewsQuery::Interest(interest) => {
                    news::fetch_interest_news(&client, &search_url, interest, max_items).await
                }
                NewsQuery::TopHeadlines(city) => {
                    news::fetch_top_headlines(&client, &search_url, city, max_items).await
                }
            };

            let candidates = match fetched {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(query = %query.label(), error = %e, "news fetch failed, continuing without it");
                    return Vec::new();
                }
            };

            // Hold the lock for the whole read-modify-write; the store has
            // no internal locking of its own.
            let mut log = memory.lock().await;
            log.validate_and_record(candidates).await
        })
    }

    async fn gather_weather(&self, profile: &UserProfile) -> Option<WeatherInsights> {
        let client = self.weather.as_ref()?;
        let coords = match profile.location.as_ref().and_then(|l| l.coordinates.as_ref()) {
            Some(coords) => coords,
            None => {
                warn!("profile has no coordinates, skipping weather");
                return None;
            }
        };

        match client
            .fetch_insights(coords.lat, coords.lon, self.rain_threshold_pct)
            .await
        {
            Ok(insights) => Some(insights),
            Err(e) => {
                warn!(error = %e, "weather arm failed, briefing continues without it");
                None
            }
        }
    }

    async fn gather_traffic(&self, profile: &UserProfile) -> Option<CommuteFacts> {
        let client = self.traffic.as_ref()?;
        let commute = match profile.commute.as_ref() {
            Some(commute) => commute,
            None => {
                warn!("profile has no commute, skipping traffic");
                return None;
            }
        };

        match client
            .fetch_commute(&commute.origin, &commute.destination)
            .await
        {
            Ok(facts) => Some(facts),
            Err(e) => {
                warn!(error = %e, "traffic arm failed, briefing continues without it");
                None
            }
        }
    }
}

enum NewsQuery {
    Interest(String),
    TopHeadlines(String),
}

impl NewsQuery {
    fn label(&self) -> &str {
        match self {
            NewsQuery::Interest(interest) => interest,
            NewsQuery::TopHeadlines(_) => "top headlines",
        }
    }
}
