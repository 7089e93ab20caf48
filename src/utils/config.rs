// Centralized configuration for CodeTrack sync

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

/// Timeout for third-party mirror APIs
pub const MIRROR_TIMEOUT: Duration = Duration::from_secs(8);

/// Timeout for official platform APIs
pub const OFFICIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for HTML profile pages (the slowest source)
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(15);

/// User agent sent to JSON APIs
pub const API_USER_AGENT: &str = "CodeTrack-Sync/1.0 (+reqwest)";

/// Browser-like user agent for profile pages, many platforms block bot agents
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// How many platforms are fetched at once for a single user
pub const DEFAULT_SYNC_CONCURRENCY: usize = 4;

/// Firestore collection holding user documents
pub const USERS_COLLECTION: &str = "users";

/// Per-tier request timeouts
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub mirror: Duration,
    pub official: Duration,
    pub scrape: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            mirror: MIRROR_TIMEOUT,
            official: OFFICIAL_TIMEOUT,
            scrape: SCRAPE_TIMEOUT,
        }
    }
}

/// Runtime configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional token for GitHub rate-limit relief
    pub github_token: Option<String>,
    pub firebase_key_path: String,
    pub sync_concurrency: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let github_token = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let firebase_key_path = env::var("FIREBASE_KEY_PATH")
            .unwrap_or_else(|_| "firebase-key.json".to_string());

        let sync_concurrency = env::var("SYNC_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_SYNC_CONCURRENCY);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "codetrack=info".to_string());

        Self {
            github_token,
            firebase_key_path,
            sync_concurrency,
            rust_log,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            firebase_key_path: "firebase-key.json".to_string(),
            sync_concurrency: DEFAULT_SYNC_CONCURRENCY,
            rust_log: "codetrack=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_follow_source_cost() {
        let t = Timeouts::default();
        assert!(t.mirror < t.official);
        assert!(t.official < t.scrape);
        assert_eq!(t.scrape, Duration::from_secs(15));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github_token.is_none());
        assert_eq!(config.sync_concurrency, DEFAULT_SYNC_CONCURRENCY);
    }
}
