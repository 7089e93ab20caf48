// GitHub stats
// REST API for profile, repos and languages; contribution count from the calendar fragment

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::cascade::{fetch_json, fill_template, ApiReply, Lookup, OfficialApi, PlatformSpec, ScrapePage};
use super::extract::{compile, parse_int, FieldRule, Observed};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::{GitHubStats, LanguageUsage};
use crate::models::{PlatformId, PlatformStats};

const API_BASE: &str = "https://api.github.com";

/// Repos whose languages are counted, most recently updated first
const LANGUAGE_REPO_LIMIT: usize = 10;

static CONTRIBUTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\d,]+)\s+contributions?\s+in\s+the\s+last\s+year").expect("valid regex")
});

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::GitHub,
    handle_patterns: compile(&[r"(?i)github\.com/([A-Za-z0-9-]+)"]),
    profile_url: "https://github.com/{handle}",
    mirrors: vec![],
    official: Some(Box::new(GitHubApi)),
    scrape: Some(ScrapePage {
        url: "https://github.com/{handle}",
        not_found: &[],
        unrated: &[],
        profile_markers: &["vcard-names"],
        rules: vec![
            FieldRule::count(
                "public_repos",
                &[r#"Repositories\s*(?:<[^>]+>\s*)*<span[^>]*class="Counter[^"]*"[^>]*>\s*([\d,]+)"#],
                0..=100_000,
            ),
            FieldRule::count(
                "followers",
                &[r"([\d,]+)\s*(?:</[^>]+>\s*)*followers"],
                0..=100_000_000,
            ),
            FieldRule::count(
                "following",
                &[r"([\d,]+)\s*(?:</[^>]+>\s*)*following"],
                0..=1_000_000,
            ),
            FieldRule::count(
                "contributions",
                &[r"([\d,]+)\s+contributions?\s+in\s+the\s+last\s+year"],
                0..=1_000_000,
            ),
        ],
        handle_must_appear: true,
    }),
    basic_fallback: false,
    build,
});

pub async fn fetch_stats(ctx: &FetchContext, username: &str) -> Option<PlatformStats> {
    SPEC.fetch(ctx, username).await
}

fn build(handle: &str, profile_url: String, obs: &Observed) -> PlatformStats {
    let mut languages: Vec<LanguageUsage> = obs
        .weighted("languages")
        .into_iter()
        .map(|(name, bytes)| LanguageUsage { name, bytes })
        .collect();
    languages.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));

    PlatformStats::GitHub(GitHubStats {
        username: obs.text("login").unwrap_or(handle).to_string(),
        name: obs.text("name").map(str::to_string),
        public_repos: obs.count("public_repos"),
        followers: obs.count("followers"),
        following: obs.count("following"),
        total_stars: obs.count("stars"),
        total_forks: obs.count("forks"),
        contributions: obs.count("contributions"),
        languages,
        profile_url,
    })
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
    name: Option<String>,
    #[serde(default)]
    public_repos: i64,
    #[serde(default)]
    followers: i64,
    #[serde(default)]
    following: i64,
}

#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    stargazers_count: i64,
    #[serde(default)]
    forks_count: i64,
}

struct GitHubApi;

impl GitHubApi {
    fn request(ctx: &FetchContext, url: String) -> HttpRequest {
        let request = HttpRequest::api(url, ctx.timeouts.official)
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &ctx.github_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn repos(ctx: &FetchContext, handle: &str) -> Option<Vec<ApiRepo>> {
        let url = fill_template(
            &format!("{}/users/{{handle}}/repos?per_page=100&sort=updated", API_BASE),
            handle,
        );
        match fetch_json(ctx, Self::request(ctx, url)).await {
            ApiReply::Json(json) => serde_json::from_value(json).ok(),
            _ => None,
        }
    }

    async fn languages(ctx: &FetchContext, handle: &str, repos: &[ApiRepo]) -> Vec<(String, u64)> {
        let mut totals: HashMap<String, u64> = HashMap::new();
        for repo in repos.iter().filter(|r| !r.fork).take(LANGUAGE_REPO_LIMIT) {
            let url = format!(
                "{}/repos/{}/{}/languages",
                API_BASE,
                urlencoding::encode(handle),
                urlencoding::encode(&repo.name)
            );
            let ApiReply::Json(json) = fetch_json(ctx, Self::request(ctx, url)).await else {
                debug!(repo = %repo.name, "Skipping languages for repo");
                continue;
            };
            let Some(map) = json.as_object() else { continue };
            for (language, bytes) in map {
                if let Some(bytes) = bytes.as_u64() {
                    *totals.entry(language.clone()).or_default() += bytes;
                }
            }
        }
        totals.into_iter().collect()
    }

    /// Contributions are only exposed on the HTML calendar fragment
    async fn contributions(ctx: &FetchContext, handle: &str) -> Option<i64> {
        let url = fill_template("https://github.com/users/{handle}/contributions", handle);
        let response = ctx
            .http
            .send(HttpRequest::page(url, ctx.timeouts.scrape))
            .await
            .ok()?;
        if !response.is_success() {
            return None;
        }
        let caps = CONTRIBUTIONS.captures(&response.body)?;
        parse_int(caps.get(1)?.as_str())
    }
}

#[async_trait]
impl OfficialApi for GitHubApi {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup {
        let url = fill_template(&format!("{}/users/{{handle}}", API_BASE), handle);
        let user: ApiUser = match fetch_json(ctx, Self::request(ctx, url)).await {
            ApiReply::Json(json) => match serde_json::from_value(json) {
                Ok(user) => user,
                Err(_) => return Lookup::Unavailable,
            },
            ApiReply::NotFound => return Lookup::NotFound,
            ApiReply::Unavailable => return Lookup::Unavailable,
        };

        let mut obs = Observed::new();
        obs.set_text("login", user.login);
        obs.set_text_opt("name", user.name);
        obs.set_int("public_repos", user.public_repos);
        obs.set_int("followers", user.followers);
        obs.set_int("following", user.following);

        if let Some(repos) = Self::repos(ctx, handle).await {
            obs.set_int("stars", repos.iter().map(|r| r.stargazers_count).sum());
            obs.set_int("forks", repos.iter().map(|r| r.forks_count).sum());
            obs.set_weighted("languages", Self::languages(ctx, handle, &repos).await);
        }
        obs.set_int_opt("contributions", Self::contributions(ctx, handle).await);

        Lookup::Found(obs)
    }
}
