/*!
daybrief/src/news.rs

News candidate sourcing from an RSS search feed.

Each topic of interest becomes one query against the configured search
feed; entries come back as `MemoryRecord` candidates ready for the dedup
store. Every candidate leaves here with a usable identifier: the feed's own
entry id when it has one, otherwise a content hash, so the store's
empty-id bypass is never exercised by this pipeline.
*/

use anyhow::{Context, Result};
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use reqwest::Client;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::memory::MemoryRecord;

/// Build the reqwest client used for feed fetches. Requests are
/// single-shot with a hard timeout; failures are the caller's to absorb.
pub fn feed_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("Daybrief/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build reqwest client")
}

/// Fetch candidates for one topic of interest.
pub async fn fetch_interest_news(
    client: &Client,
    search_url: &str,
    interest: &str,
    max_items: usize,
) -> Result<Vec<MemoryRecord>> {
    fetch_candidates(client, search_url, interest, interest, max_items).await
}

/// Fetch the non-personalized arm: top stories for the user's city.
pub async fn fetch_top_headlines(
    client: &Client,
    search_url: &str,
    city: &str,
    max_items: usize,
) -> Result<Vec<MemoryRecord>> {
    let query = format!("top news {}", city);
    fetch_candidates(client, search_url, &query, "top headlines", max_items).await
}

async fn fetch_candidates(
    client: &Client,
    search_url: &str,
    query: &str,
    interest: &str,
    max_items: usize,
) -> Result<Vec<MemoryRecord>> {
    let mut url = Url::parse(search_url).context("invalid news search URL")?;
    url.query_pairs_mut().append_pair("q", query);

    let feed = fetch_feed(client, url.as_str()).await?;
    debug!(interest, entries = feed.entries.len(), "search feed fetched");

    let records = feed
        .entries
        .iter()
        .filter_map(|entry| entry_to_record(entry, interest))
        .take(max_items)
        .collect();
    Ok(records)
}

/// Fetch a feed URL and parse it. One attempt only.
async fn fetch_feed(client: &Client, url: &str) -> Result<Feed> {
    let response = client
        .get(url)
        .send()
        .await
        .context("network error during feed fetch")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("feed fetch failed with status: {}", status);
    }

    let bytes = response.bytes().await.context("failed to read response body")?;
    let feed = parser::parse(bytes.as_ref()).context("failed to parse feed")?;
    Ok(feed)
}

/// Map one feed entry to a dedup candidate. Entries with neither headline
/// nor link carry nothing worth briefing and are dropped.
fn entry_to_record(entry: &Entry, interest: &str) -> Option<MemoryRecord> {
    let headline = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default();
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();

    if headline.is_empty() && link.is_empty() {
        debug!("skipping entry without headline or link");
        return None;
    }

    let mut record = MemoryRecord::new(candidate_id(&entry.id, &headline, &link))
        .with_field("interest", Value::String(interest.to_string()));
    if let Some(host) = Url::parse(&link).ok().and_then(|u| u.host_str().map(str::to_string)) {
        record = record.with_field("source", Value::String(host));
    }
    if let Some(published) = entry.published {
        record = record.with_field("published", Value::String(published.to_rfc3339()));
    }
    record = record
        .with_field("headline", Value::String(headline))
        .with_field("url", Value::String(link));

    Some(record)
}

/// Identifier for a candidate: the feed's own entry id when it carries
/// one, otherwise a hash of the content.
pub fn candidate_id(entry_id: &str, headline: &str, link: &str) -> String {
    if entry_id.is_empty() {
        content_id(headline, link)
    } else {
        entry_id.to_string()
    }
}

/// Stable identifier for entries the feed did not identify: SHA-256 over
/// the normalized headline and link.
pub fn content_id(headline: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(headline).as_bytes());
    hasher.update(b"\n");
    hasher.update(normalize(link).as_bytes());
    hex::encode(hasher.finalize())
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_id_prefers_feed_entry_id() {
        let id = candidate_id("guid-123", "Some headline", "https://example.com/a");
        assert_eq!(id, "guid-123");
    }

    #[test]
    fn candidate_id_falls_back_to_content_hash() {
        let id = candidate_id("", "Some headline", "https://example.com/a");
        assert_eq!(id, content_id("Some headline", "https://example.com/a"));
        assert_eq!(id.len(), 64);
    }

    #[test]
    fn content_id_ignores_case_and_whitespace() {
        let a = content_id("  Rust 1.80 Released ", "https://example.com/rust");
        let b = content_id("rust 1.80 released", "HTTPS://EXAMPLE.COM/RUST");
        assert_eq!(a, b);
    }

    #[test]
    fn content_id_distinguishes_different_stories() {
        let a = content_id("Rust 1.80 released", "https://example.com/rust-180");
        let b = content_id("Rust 1.81 released", "https://example.com/rust-181");
        assert_ne!(a, b);
    }
}
