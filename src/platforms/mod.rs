// Platform fetchers
// One spec per platform driving the shared cascade, plus a generic fetcher for custom platforms

pub mod cascade;
pub mod extract;
pub mod handle;

pub mod atcoder;
pub mod codechef;
pub mod codeforces;
pub mod codewars;
pub mod codingninjas;
pub mod cses;
pub mod generic;
pub mod geeksforgeeks;
pub mod github;
pub mod gitlab;
pub mod hackerearth;
pub mod hackerrank;
pub mod interviewbit;
pub mod kattis;
pub mod leetcode;
pub mod spoj;
pub mod topcoder;
pub mod uva;

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::http::HttpTransport;
use crate::models::{PlatformId, PlatformStats};
use crate::utils::config::Timeouts;
use cascade::PlatformSpec;

/// Everything a fetcher needs to talk to the outside world
#[derive(Clone)]
pub struct FetchContext {
    pub http: Arc<dyn HttpTransport>,
    /// Sent as a bearer token to the GitHub API when set
    pub github_token: Option<String>,
    pub timeouts: Timeouts,
}

impl FetchContext {
    pub fn new(http: Arc<dyn HttpTransport>) -> Self {
        Self {
            http,
            github_token: None,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token;
        self
    }
}

/// The cascade configuration for a predefined platform
pub fn spec_for(platform: PlatformId) -> &'static PlatformSpec {
    match platform {
        PlatformId::LeetCode => &*leetcode::SPEC,
        PlatformId::Codeforces => &*codeforces::SPEC,
        PlatformId::CodeChef => &*codechef::SPEC,
        PlatformId::GitHub => &*github::SPEC,
        PlatformId::HackerRank => &*hackerrank::SPEC,
        PlatformId::HackerEarth => &*hackerearth::SPEC,
        PlatformId::GeeksforGeeks => &*geeksforgeeks::SPEC,
        PlatformId::AtCoder => &*atcoder::SPEC,
        PlatformId::TopCoder => &*topcoder::SPEC,
        PlatformId::Spoj => &*spoj::SPEC,
        PlatformId::InterviewBit => &*interviewbit::SPEC,
        PlatformId::CodingNinjas => &*codingninjas::SPEC,
        PlatformId::Kattis => &*kattis::SPEC,
        PlatformId::Codewars => &*codewars::SPEC,
        PlatformId::Cses => &*cses::SPEC,
        PlatformId::Uva => &*uva::SPEC,
        PlatformId::GitLab => &*gitlab::SPEC,
    }
}

/// Clean a username the way the platform's fetcher will see it
pub fn clean_username(platform: Option<PlatformId>, raw: &str) -> Option<String> {
    match platform {
        Some(p) => spec_for(p).normalize(raw),
        None => generic::normalize(raw),
    }
}

/// Source of per-platform stats, the seam used by aggregation and sync
#[async_trait]
pub trait StatsFetcher: Send + Sync {
    /// Stats for a predefined platform. `Ok(None)` means nothing verifiable.
    async fn fetch(&self, platform: PlatformId, username: &str)
        -> anyhow::Result<Option<PlatformStats>>;

    /// Stats for a platform without a dedicated fetcher
    async fn fetch_custom(
        &self,
        platform: &str,
        username: &str,
        platform_url: Option<&str>,
    ) -> anyhow::Result<Option<PlatformStats>>;
}

/// Production fetcher set
#[derive(Clone)]
pub struct PlatformFetchers {
    ctx: FetchContext,
}

impl PlatformFetchers {
    pub fn new(ctx: FetchContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &FetchContext {
        &self.ctx
    }
}

#[async_trait]
impl StatsFetcher for PlatformFetchers {
    async fn fetch(
        &self,
        platform: PlatformId,
        username: &str,
    ) -> anyhow::Result<Option<PlatformStats>> {
        Ok(spec_for(platform).fetch(&self.ctx, username).await)
    }

    async fn fetch_custom(
        &self,
        platform: &str,
        username: &str,
        platform_url: Option<&str>,
    ) -> anyhow::Result<Option<PlatformStats>> {
        Ok(generic::fetch_stats(&self.ctx, platform, username, platform_url).await)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::api::http::{HttpResponse, MockTransport};

    pub fn ctx_with(mock: &MockTransport) -> FetchContext {
        FetchContext::new(Arc::new(mock.clone()))
    }

    /// Transport where every source answers 404
    pub fn all_missing() -> MockTransport {
        MockTransport::with_fallback(HttpResponse::new(404, "Not Found"))
    }
}
