// Platform sync service
// Refreshes every linked platform of a user and persists the outcome per platform

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::aggregator::fold_stats;
use crate::models::platform::normalize_platform_key;
use crate::models::{AggregatedStats, LinkedPlatform, PlatformId, PlatformStats, User};
use crate::platforms::{clean_username, StatsFetcher};
use crate::store::{FieldUpdates, StoreError, UserStore};

/// Outcome of syncing one linked platform
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub platform: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PlatformStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct PlatformSyncService {
    store: Arc<dyn UserStore>,
    fetcher: Arc<dyn StatsFetcher>,
    concurrency: usize,
}

impl PlatformSyncService {
    pub fn new(store: Arc<dyn UserStore>, fetcher: Arc<dyn StatsFetcher>, concurrency: usize) -> Self {
        Self {
            store,
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    async fn load_user(&self, user_id: &str) -> Result<User> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        Ok(user)
    }

    /// Refresh every linked platform of a user.
    ///
    /// Each platform is written as soon as its fetch settles: `lastSync` is
    /// always stamped and `stats` is replaced by the new result or `null`, so
    /// stale data never survives a failed sync. The aggregated `stats` cache is
    /// recomputed from the successful results at the end.
    pub async fn sync_user_platforms(&self, user_id: &str) -> Result<Vec<SyncResult>> {
        let user = self.load_user(user_id).await?;
        self.ensure_initialized(&user).await?;

        let links = user.active_links();
        info!(user_id, platforms = links.len(), "Syncing linked platforms");

        let mut results: Vec<SyncResult> = stream::iter(links)
            .map(|(key, link)| async move { self.sync_one(user_id, key, link).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        results.sort_by(|a, b| a.platform.cmp(&b.platform));

        let aggregated = fold_stats(
            results
                .iter()
                .filter_map(|r| r.data.as_ref().map(|stats| (r.platform.as_str(), stats))),
        );
        // Platform entries are already written; a failed cache refresh must not hide them
        if let Err(e) = self.write_cache(user_id, &aggregated).await {
            error!(user_id, error = %e, "Failed to refresh aggregated stats");
        }

        let ok = results.iter().filter(|r| r.success).count();
        info!(user_id, ok, failed = results.len() - ok, "Sync finished");
        Ok(results)
    }

    async fn write_cache(&self, user_id: &str, aggregated: &AggregatedStats) -> Result<()> {
        self.store
            .update(
                user_id,
                FieldUpdates::new().set("stats", serde_json::to_value(aggregated)?),
            )
            .await?;
        Ok(())
    }

    /// First sync of a fresh user document: create the containers it expects
    async fn ensure_initialized(&self, user: &User) -> Result<()> {
        let mut updates = FieldUpdates::new();
        if user.linked_platforms.is_none() {
            updates = updates.set("linkedPlatforms", Value::Object(Default::default()));
        }
        if user.stats.is_none() {
            updates = updates.set("stats", serde_json::to_value(AggregatedStats::default())?);
        }
        if !updates.is_empty() {
            self.store.update(&user.id, updates).await?;
        }
        Ok(())
    }

    async fn sync_one(&self, user_id: &str, key: String, link: LinkedPlatform) -> SyncResult {
        if link.never_synced() {
            debug!(user_id, platform = %key, "First sync for this link");
        }
        let platform = PlatformId::resolve(&key);
        let outcome = match platform {
            Some(platform) => self.fetcher.fetch(platform, &link.username).await,
            None => {
                self.fetcher
                    .fetch_custom(&key, &link.username, link.platform_url.as_deref())
                    .await
            }
        };

        let (data, error) = match outcome {
            Ok(Some(stats)) => (Some(stats), None),
            Ok(None) => (
                None,
                Some(format!(
                    "No verifiable {} profile found for {}",
                    platform.map_or(key.as_str(), |p| p.label()),
                    link.username
                )),
            ),
            Err(e) => {
                warn!(user_id, platform = %key, error = %e, "Platform fetch failed");
                (None, Some(e.to_string()))
            }
        };

        if let Err(e) = self.persist(user_id, &key, data.as_ref()).await {
            error!(user_id, platform = %key, error = %e, "Failed to persist platform stats");
            return SyncResult {
                platform: key,
                success: false,
                data: None,
                error: Some(format!("Failed to save stats: {}", e)),
            };
        }

        SyncResult {
            success: data.is_some(),
            platform: key,
            data,
            error,
        }
    }

    /// Stamp `lastSync` and overwrite `stats`, `null` included
    async fn persist(&self, user_id: &str, key: &str, stats: Option<&PlatformStats>) -> Result<()> {
        let stats = match stats {
            Some(stats) => serde_json::to_value(stats)?,
            None => Value::Null,
        };
        let updates = FieldUpdates::new()
            .set(
                format!("linkedPlatforms.{}.lastSync", key),
                serde_json::to_value(Utc::now())?,
            )
            .set(format!("linkedPlatforms.{}.stats", key), stats);
        self.store.update(user_id, updates).await?;
        Ok(())
    }

    /// Link (or relink) a platform account, then sync the user
    pub async fn link_platform(
        &self,
        user_id: &str,
        platform: &str,
        username: &str,
        platform_url: Option<&str>,
    ) -> Result<Vec<SyncResult>> {
        let key = normalize_platform_key(platform);
        if key.trim_matches('_').is_empty() {
            bail!("Platform name is required");
        }
        let username = clean_username(PlatformId::resolve(&key), username)
            .ok_or_else(|| anyhow!("Username is required"))?;
        let platform_url = platform_url.map(str::trim).filter(|u| !u.is_empty());

        // Fail before writing anything for unknown users
        self.load_user(user_id).await?;

        let link = LinkedPlatform::new(&username, platform_url);
        self.store
            .update(
                user_id,
                FieldUpdates::new().set(
                    format!("linkedPlatforms.{}", key),
                    serde_json::to_value(&link)?,
                ),
            )
            .await?;
        info!(user_id, platform = %key, username = %username, "Linked platform");

        self.sync_user_platforms(user_id).await
    }

    /// Remove a linked platform and refresh the aggregated cache from what is
    /// still stored
    pub async fn unlink_platform(&self, user_id: &str, platform: &str) -> Result<()> {
        let key = normalize_platform_key(platform);
        let user = self.load_user(user_id).await?;
        if user.link(&key).is_none() {
            warn!(user_id, platform = %key, "Unlinking a platform that is not linked");
        }

        let remaining: Vec<(String, PlatformStats)> = user
            .active_links()
            .into_iter()
            .filter(|(k, _)| *k != key)
            .filter_map(|(k, link)| link.stats.map(|stats| (k, stats)))
            .collect();
        let aggregated = fold_stats(remaining.iter().map(|(k, s)| (k.as_str(), s)));

        self.store
            .update(
                user_id,
                FieldUpdates::new()
                    .delete(format!("linkedPlatforms.{}", key))
                    .set("stats", serde_json::to_value(&aggregated)?),
            )
            .await?;
        info!(user_id, platform = %key, "Unlinked platform");
        Ok(())
    }
}
