// Source cascade shared by every platform fetcher
// mirror APIs -> official API -> profile page -> basic profile, first verified result wins

use std::ops::RangeInclusive;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::extract::{contains_any, extract_all, json_reports_error, FieldRule, Observed};
use super::handle::{is_valid_handle, normalize_handle};
use super::FetchContext;
use crate::api::http::{HttpError, HttpRequest, HttpResponse};
use crate::models::{PlatformId, PlatformStats};

/// Turns observed fields into the platform's stats struct
pub type BuildFn = fn(handle: &str, profile_url: String, observed: &Observed) -> PlatformStats;

/// Maps a mirror's JSON to observed fields, `None` when it carries no stats
pub type MirrorMapFn = fn(&Value) -> Option<Observed>;

/// Result of asking an authoritative source
#[derive(Debug)]
pub enum Lookup {
    Found(Observed),
    /// Source confirmed the profile does not exist; trusted, ends the cascade
    NotFound,
    /// Source could not answer; the cascade moves on
    Unavailable,
}

/// A platform's own API
#[async_trait]
pub trait OfficialApi: Send + Sync {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup;
}

/// A third-party aggregation endpoint
pub struct MirrorApi {
    /// `{handle}` is substituted, URL-encoded
    pub url: &'static str,
    pub map: MirrorMapFn,
}

impl MirrorApi {
    async fn query(&self, ctx: &FetchContext, handle: &str) -> Option<Observed> {
        let url = fill_template(self.url, handle);
        let response = ctx
            .http
            .send(HttpRequest::api(url.clone(), ctx.timeouts.mirror))
            .await;

        let body = match response {
            Ok(resp) if resp.is_success() => resp.json()?,
            Ok(resp) => {
                debug!(url = %url, status = resp.status, "Mirror returned non-success");
                return None;
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Mirror request failed");
                return None;
            }
        };

        if json_reports_error(&body) {
            debug!(url = %url, "Mirror reported an error");
            return None;
        }

        (self.map)(&body).filter(|obs| !obs.is_empty())
    }
}

/// Public profile page and how to read it
pub struct ScrapePage {
    pub url: &'static str,
    /// Page served but the profile is absent
    pub not_found: &'static [&'static str],
    /// Genuine profile without rated history
    pub unrated: &'static [&'static str],
    /// Proof that the page is a real profile even when no field matched
    pub profile_markers: &'static [&'static str],
    pub rules: Vec<FieldRule>,
    /// Profile pages always mention their handle; single-page apps may not
    pub handle_must_appear: bool,
}

#[derive(Debug)]
enum ScrapeOutcome {
    Found(Observed),
    NotFound,
    /// Page served, nothing verifiable on it
    Unverified,
    Unavailable,
}

impl ScrapePage {
    async fn scrape(&self, ctx: &FetchContext, handle: &str) -> ScrapeOutcome {
        let url = fill_template(self.url, handle);
        let response = ctx
            .http
            .send(HttpRequest::page(url.clone(), ctx.timeouts.scrape))
            .await;

        let body = match response {
            Ok(resp) if resp.is_success() => resp.body,
            Ok(resp) if resp.is_not_found() => return ScrapeOutcome::NotFound,
            Ok(resp) => {
                debug!(url = %url, status = resp.status, "Profile page not served");
                return ScrapeOutcome::Unavailable;
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Profile page request failed");
                return ScrapeOutcome::Unavailable;
            }
        };

        self.read(&body, handle)
    }

    fn read(&self, body: &str, handle: &str) -> ScrapeOutcome {
        let lower = body.to_lowercase();

        if contains_any(&lower, self.not_found) {
            return ScrapeOutcome::NotFound;
        }
        if self.handle_must_appear && !lower.contains(&handle.to_lowercase()) {
            // Redirected to a landing page
            return ScrapeOutcome::NotFound;
        }
        if contains_any(&lower, self.unrated) {
            return ScrapeOutcome::Found(Observed::unrated());
        }

        let observed = extract_all(&self.rules, body);
        if !observed.is_empty() {
            return ScrapeOutcome::Found(observed);
        }
        if contains_any(&lower, self.profile_markers) {
            return ScrapeOutcome::Found(Observed::new());
        }
        ScrapeOutcome::Unverified
    }
}

/// Per-platform configuration record driving the cascade
pub struct PlatformSpec {
    pub platform: PlatformId,
    /// URL shapes, handle in capture group 1
    pub handle_patterns: Vec<Regex>,
    pub profile_url: &'static str,
    pub mirrors: Vec<MirrorApi>,
    pub official: Option<Box<dyn OfficialApi>>,
    pub scrape: Option<ScrapePage>,
    /// Zero-stats profile when the page was served but nothing verified
    pub basic_fallback: bool,
    pub build: BuildFn,
}

impl PlatformSpec {
    pub fn normalize(&self, raw: &str) -> Option<String> {
        normalize_handle(raw, &self.handle_patterns)
    }

    pub fn profile_url_for(&self, handle: &str) -> String {
        fill_template(self.profile_url, handle)
    }

    /// Fetch stats for a username or profile URL; `None` when nothing real
    /// could be observed
    pub async fn fetch(&self, ctx: &FetchContext, raw: &str) -> Option<PlatformStats> {
        let Some(handle) = self.normalize(raw) else {
            debug!(platform = %self.platform, "Empty username, skipping fetch");
            return None;
        };

        let observed = self.cascade(ctx, &handle).await?;
        Some((self.build)(&handle, self.profile_url_for(&handle), &observed))
    }

    async fn cascade(&self, ctx: &FetchContext, handle: &str) -> Option<Observed> {
        let platform = self.platform;

        for mirror in &self.mirrors {
            if let Some(observed) = mirror.query(ctx, handle).await {
                info!(%platform, handle, source = "mirror", "Fetched stats");
                return Some(observed);
            }
        }

        if let Some(api) = &self.official {
            match api.lookup(ctx, handle).await {
                Lookup::Found(observed) => {
                    info!(%platform, handle, source = "official", "Fetched stats");
                    return Some(observed);
                }
                Lookup::NotFound => {
                    info!(%platform, handle, "Profile does not exist");
                    return None;
                }
                Lookup::Unavailable => {
                    debug!(%platform, handle, "Official API unavailable, falling back");
                }
            }
        }

        let mut page_served = false;
        if let Some(page) = &self.scrape {
            match page.scrape(ctx, handle).await {
                ScrapeOutcome::Found(observed) => {
                    info!(%platform, handle, source = "scrape", "Fetched stats");
                    return Some(observed);
                }
                ScrapeOutcome::NotFound => {
                    info!(%platform, handle, "Profile page reports no such user");
                    return None;
                }
                ScrapeOutcome::Unverified => page_served = true,
                ScrapeOutcome::Unavailable => {}
            }
        }

        if self.basic_fallback && page_served && is_valid_handle(handle) {
            info!(%platform, handle, "Stats unverifiable, using basic profile");
            return Some(Observed::new());
        }

        warn!(%platform, handle, "No source could verify profile");
        None
    }
}

/// Reply from a JSON endpoint, classified for the cascade
#[derive(Debug)]
pub enum ApiReply {
    Json(Value),
    NotFound,
    Unavailable,
}

/// Send a request to an official JSON API
pub async fn fetch_json(ctx: &FetchContext, request: HttpRequest) -> ApiReply {
    let url = request.url.clone();
    classify_reply(&url, ctx.http.send(request).await)
}

fn classify_reply(url: &str, response: Result<HttpResponse, HttpError>) -> ApiReply {
    match response {
        Ok(resp) if resp.is_success() => match resp.json() {
            Some(json) => ApiReply::Json(json),
            None => {
                debug!(url, "Malformed JSON from official API");
                ApiReply::Unavailable
            }
        },
        Ok(resp) if resp.is_not_found() => ApiReply::NotFound,
        Ok(resp) => {
            debug!(url, status = resp.status, "Official API returned non-success");
            ApiReply::Unavailable
        }
        Err(e) => {
            warn!(url, error = %e, "Official API request failed");
            ApiReply::Unavailable
        }
    }
}

/// Substitute `{handle}`, URL-encoded
pub fn fill_template(template: &str, handle: &str) -> String {
    template.replace("{handle}", &urlencoding::encode(handle))
}

/// Range check for mirror values, the same bounds the scrape rules use
pub fn in_range(value: Option<i64>, range: &RangeInclusive<i64>) -> Option<i64> {
    value.filter(|v| range.contains(v))
}
