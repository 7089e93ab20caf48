// HackerRank stats from the badges endpoint, profile page as fallback

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;

use super::cascade::{fetch_json, fill_template, ApiReply, Lookup, OfficialApi, PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::HackerRankStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::HackerRank,
    handle_patterns: compile(&[r"(?i)hackerrank\.com/(?:profile/)?([A-Za-z0-9_-]+)"]),
    profile_url: "https://www.hackerrank.com/profile/{handle}",
    mirrors: vec![],
    official: Some(Box::new(BadgesApi)),
    scrape: Some(ScrapePage {
        url: "https://www.hackerrank.com/profile/{handle}",
        not_found: &["user not found", "page not found"],
        unrated: &[],
        profile_markers: &["profile-heading"],
        rules: vec![
            FieldRule::count("solved", &[r#""solved"\s*:\s*(\d+)"#], 0..=10_000),
            FieldRule::count("badges", &[r"(\d+)\s*(?:</[^>]+>\s*)*Badges"], 0..=500),
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
    PlatformStats::HackerRank(HackerRankStats {
        username: handle.to_string(),
        problems_solved: obs.count("solved"),
        badges: obs.count("badges"),
        stars: obs.count("stars"),
        badge_names: obs.list("badge_names"),
        profile_url,
    })
}

#[derive(Debug, Deserialize)]
struct BadgesResponse {
    #[serde(default)]
    models: Vec<Badge>,
}

#[derive(Debug, Deserialize)]
struct Badge {
    badge_name: Option<String>,
    #[serde(default)]
    stars: i64,
    #[serde(default)]
    solved: i64,
}

struct BadgesApi;

#[async_trait]
impl OfficialApi for BadgesApi {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup {
        let url = fill_template("https://www.hackerrank.com/rest/hackers/{handle}/badges", handle);
        let response: BadgesResponse = match fetch_json(ctx, HttpRequest::api(url, ctx.timeouts.official)).await {
            ApiReply::Json(json) => match serde_json::from_value(json) {
                Ok(r) => r,
                Err(_) => return Lookup::Unavailable,
            },
            ApiReply::NotFound => return Lookup::NotFound,
            ApiReply::Unavailable => return Lookup::Unavailable,
        };

        // Badges with zero stars are only placeholders for tracks not started
        let earned: Vec<&Badge> = response.models.iter().filter(|b| b.stars > 0).collect();

        let mut obs = Observed::new();
        obs.set_int("solved", response.models.iter().map(|b| b.solved.max(0)).sum());
        obs.set_int("badges", earned.len() as i64);
        obs.set_int("stars", earned.iter().map(|b| b.stars).sum());
        obs.set_list(
            "badge_names",
            earned.iter().filter_map(|b| b.badge_name.clone()).collect(),
        );
        Lookup::Found(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_badges_are_summed() {
        let mock = all_missing();
        mock.push(
            "https://www.hackerrank.com/rest/hackers/ranker/badges",
            HttpResponse::new(
                200,
                r#"{"models":[
                    {"badge_name":"Problem Solving","stars":4,"solved":120},
                    {"badge_name":"Python","stars":3,"solved":40},
                    {"badge_name":"SQL","stars":0,"solved":0}]}"#,
            ),
        );

        let Some(PlatformStats::HackerRank(s)) = fetch_stats(&ctx_with(&mock), "@ranker").await else {
            panic!("expected stats");
        };
        assert_eq!(s.problems_solved, 160);
        assert_eq!(s.badges, 2);
        assert_eq!(s.stars, 7);
        assert_eq!(s.badge_names, vec!["Problem Solving", "Python"]);
    }
}
