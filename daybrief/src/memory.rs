/*!
daybrief/src/memory.rs

Persisted, time-bounded dedup store for news candidates.

The store keeps one JSON file of recently seen candidate identifiers and
filters each new batch against it, so a story surfaced on Monday does not
come back on Tuesday. Entries age out after a retention window. The store
never raises: an absent or mangled file simply behaves as an empty log.

Callers must serialize access; the store itself holds no lock. The briefing
assembler wraps it in a `tokio::sync::Mutex`.
*/

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A candidate item flowing through the dedup filter.
///
/// `id` is the uniqueness key; an empty string means the upstream produced
/// no identifier. Every other field is opaque payload carried through
/// unchanged (headline, url, interest, whatever the source attached).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl MemoryRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Convenience accessor for the most commonly logged payload field.
    pub fn headline(&self) -> Option<&str> {
        self.fields.get("headline").and_then(Value::as_str)
    }
}

/// One recorded sighting in the persisted log.
///
/// The timestamp stays a plain string so a single mangled value drops only
/// its own entry during pruning instead of failing the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTopic {
    #[serde(default)]
    id: String,
    #[serde(default)]
    timestamp: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl StoredTopic {
    fn from_record(record: &MemoryRecord, seen_at: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            timestamp: seen_at.to_rfc3339(),
            fields: record.fields.clone(),
        }
    }
}

/// On-disk shape: `{"recent_topics": [...]}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryFile {
    #[serde(default)]
    recent_topics: Vec<StoredTopic>,
}

/// The dedup store. Owns its backing file path and an in-memory snapshot
/// that is reloaded at the start of every call (read-modify-write), so the
/// snapshot never drifts more than one call from disk.
pub struct MemoryLog {
    path: PathBuf,
    retention_days: i64,
    topics: Vec<StoredTopic>,
}

impl MemoryLog {
    pub const DEFAULT_RETENTION_DAYS: i64 = 7;

    pub fn new(path: impl Into<PathBuf>, retention_days: i64) -> Self {
        Self {
            path: path.into(),
            retention_days,
            topics: Vec::new(),
        }
    }

    pub fn with_default_retention(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Self::DEFAULT_RETENTION_DAYS)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filter `candidates` down to the ones never seen before (or whose
    /// previous sighting has aged out), recording each admitted candidate
    /// with the current time. Input order is preserved.
    ///
    /// Rules, in the order they apply:
    /// - expired and unparsable sightings are pruned first, every call
    /// - a candidate with an empty `id` always passes and is never recorded
    /// - a candidate whose `id` is already known is rejected; its stored
    ///   sighting gets a fresh timestamp so a live story stays suppressed
    /// - an admitted `id` is known for the rest of the batch, so duplicates
    ///   inside a single batch are rejected too
    ///
    /// The backing file is rewritten in full whenever the call changed
    /// state; a call that changed nothing leaves it untouched. This method
    /// never fails: IO problems are logged and the filtered batch is
    /// returned regardless.
    pub async fn validate_and_record(&mut self, candidates: Vec<MemoryRecord>) -> Vec<MemoryRecord> {
        let now = Utc::now();

        self.reload().await;
        let pruned = self.prune(now);

        let mut known: HashSet<String> = self
            .topics
            .iter()
            .filter(|topic| !topic.id.is_empty())
            .map(|topic| topic.id.clone())
            .collect();

        let mut kept = Vec::with_capacity(candidates.len());
        let mut admitted = 0usize;
        let mut refreshed = 0usize;

        for record in candidates {
            if record.id.is_empty() {
                // Cannot dedupe without an identifier; let it through unrecorded.
                warn!(
                    headline = record.headline().unwrap_or("<none>"),
                    "candidate without id bypasses dedup"
                );
                kept.push(record);
                continue;
            }

            if known.contains(&record.id) {
                info!(
                    id = %record.id,
                    headline = record.headline().unwrap_or("<none>"),
                    "skipping duplicate candidate"
                );
                if let Some(topic) = self.topics.iter_mut().find(|t| t.id == record.id) {
                    topic.timestamp = now.to_rfc3339();
                    refreshed += 1;
                }
                continue;
            }

            // Record immediately so a repeat inside this same batch is caught.
            known.insert(record.id.clone());
            self.topics.push(StoredTopic::from_record(&record, now));
            admitted += 1;
            kept.push(record);
        }

        if pruned > 0 || admitted > 0 || refreshed > 0 {
            if let Err(e) = self.persist().await {
                warn!(path = %self.path.display(), error = %e, "failed to persist memory log");
            }
        }

        kept
    }

    /// Re-read the backing file. Absent or malformed files yield an empty
    /// log; this never fails.
    async fn reload(&mut self) {
        self.topics = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => match serde_json::from_str::<MemoryFile>(&data) {
                Ok(file) => file.recent_topics,
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "memory log unreadable, starting from an empty log"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read memory log, starting from an empty log"
                );
                Vec::new()
            }
        };
    }

    /// Drop every sighting older than the retention window, plus any whose
    /// timestamp does not parse. Returns how many entries were removed.
    fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(self.retention_days);
        let before = self.topics.len();

        self.topics.retain(|topic| {
            match DateTime::parse_from_rfc3339(&topic.timestamp) {
                Ok(ts) => ts.with_timezone(&Utc) > cutoff,
                Err(_) => {
                    warn!(id = %topic.id, "dropping sighting with unparsable timestamp");
                    false
                }
            }
        });

        before - self.topics.len()
    }

    /// Rewrite the whole log: serialize to a temp sibling, then rename over
    /// the real file so readers never observe a half-written log.
    async fn persist(&self) -> Result<()> {
        common::ensure_parent_dir(&self.path).await?;

        let file = MemoryFile {
            recent_topics: self.topics.clone(),
        };
        let data = serde_json::to_string_pretty(&file).context("failed to serialize memory log")?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data)
            .await
            .with_context(|| format!("failed to write temp log: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace log: {}", self.path.display()))?;

        Ok(())
    }
}
