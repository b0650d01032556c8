/*!
daybrief/src/profile.rs

User preferences, read from a JSON file keyed by user id.
The file is an opaque external source; nothing here validates or manages
it beyond parsing one user's entry.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    #[serde(default)]
    pub country: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commute {
    pub origin: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub location: Option<Location>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub commute: Option<Commute>,
}

/// Load one user's profile from the preferences file. Returns `None` when
/// the user has no entry; the file itself must exist and parse.
pub async fn load_profile(path: &Path, user_id: &str) -> Result<Option<UserProfile>> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read preferences file: {}", path.display()))?;
    let mut profiles: HashMap<String, UserProfile> =
        serde_json::from_str(&data).context("Failed to parse preferences file")?;
    Ok(profiles.remove(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_known_user_and_misses_unknown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        tokio::fs::write(
            &path,
            r#"{
                "user_123": {
                    "name": "Alex",
                    "location": {
                        "city": "San Francisco",
                        "country": "USA",
                        "coordinates": { "lat": 37.7749, "lon": -122.4194 }
                    },
                    "interests": ["technology", "cycling"],
                    "commute": {
                        "origin": "Mission District",
                        "destination": "Financial District"
                    }
                }
            }"#,
        )
        .await
        .expect("write preferences");

        let profile = load_profile(&path, "user_123")
            .await
            .expect("load")
            .expect("user present");
        assert_eq!(profile.name, "Alex");
        assert_eq!(profile.interests, vec!["technology", "cycling"]);
        let location = profile.location.expect("location");
        assert_eq!(location.city, "San Francisco");
        assert!(location.coordinates.is_some());

        let missing = load_profile(&path, "user_999").await.expect("load");
        assert!(missing.is_none());
    }
}
