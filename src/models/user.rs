// User data model
// The slice of the user document this subsystem reads and writes

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use super::platform_stats::PlatformStats;
use super::stats::AggregatedStats;

/// A platform account linked to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedPlatform {
    pub username: String,
    /// Base URL, only used for custom platforms
    #[serde(rename = "platformUrl", default, skip_serializing_if = "Option::is_none")]
    pub platform_url: Option<String>,
    /// Missing on entries written before link timestamps existed
    #[serde(rename = "linkedAt", default, skip_serializing_if = "Option::is_none")]
    pub linked_at: Option<DateTime<Utc>>,
    #[serde(rename = "isActive", default = "default_active")]
    pub is_active: bool,
    /// Set on every sync attempt, success or failure
    #[serde(rename = "lastSync", default)]
    pub last_sync: Option<DateTime<Utc>>,
    /// `None` with `last_sync` set means the last sync found nothing verifiable.
    /// Unreadable stored stats also read as `None`; the next sync overwrites them.
    #[serde(default, deserialize_with = "lenient")]
    pub stats: Option<PlatformStats>,
}

fn default_active() -> bool {
    true
}

impl LinkedPlatform {
    pub fn new(username: &str, platform_url: Option<&str>) -> Self {
        Self {
            username: username.to_string(),
            platform_url: platform_url.map(|s| s.to_string()),
            linked_at: Some(Utc::now()),
            is_active: true,
            last_sync: None,
            stats: None,
        }
    }

    pub fn never_synced(&self) -> bool {
        self.last_sync.is_none()
    }
}

/// User document as seen by the sync service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "_id")]
    pub id: String,
    /// Unlinked platforms may linger as explicit nulls. A malformed entry reads
    /// as `None` instead of failing the whole document.
    #[serde(rename = "linkedPlatforms", default, deserialize_with = "lenient_links")]
    pub linked_platforms: Option<BTreeMap<String, Option<LinkedPlatform>>>,
    #[serde(default, deserialize_with = "lenient")]
    pub stats: Option<AggregatedStats>,
}

/// Reads a value that older or hand-edited documents may have in another shape
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| match serde_json::from_value(v) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable stored value");
            None
        }
    }))
}

fn lenient_links<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, Option<LinkedPlatform>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Object(entries)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let links = entries
        .into_iter()
        .map(|(key, entry)| {
            let link = match serde_json::from_value::<Option<LinkedPlatform>>(entry) {
                Ok(link) => link,
                Err(e) => {
                    warn!(platform = %key, error = %e, "Ignoring unreadable linked platform");
                    None
                }
            };
            (key, link)
        })
        .collect();
    Ok(Some(links))
}

impl User {
    /// Linked platforms with a usable username
    pub fn active_links(&self) -> Vec<(String, LinkedPlatform)> {
        self.linked_platforms
            .iter()
            .flatten()
            .filter_map(|(key, link)| link.as_ref().map(|l| (key.clone(), l.clone())))
            .filter(|(_, link)| !link.username.trim().is_empty())
            .collect()
    }

    pub fn link(&self, key: &str) -> Option<&LinkedPlatform> {
        self.linked_platforms.as_ref()?.get(key)?.as_ref()
    }
}
