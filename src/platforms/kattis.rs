// Kattis stats, scraped from open.kattis.com

use once_cell::sync::Lazy;

use super::cascade::{PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::KattisStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::Kattis,
    handle_patterns: compile(&[r"(?i)kattis\.com/users/([A-Za-z0-9_.-]+)"]),
    profile_url: "https://open.kattis.com/users/{handle}",
    mirrors: vec![],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://open.kattis.com/users/{handle}",
        not_found: &["user not found", "no such user"],
        unrated: &[],
        profile_markers: &["user-infobox"],
        rules: vec![
            FieldRule::decimal(
                "score",
                &[r"Score\s*(?:<[^>]+>\s*)*([\d,]+(?:\.\d+)?)"],
                0.0..=100_000.0,
            ),
            FieldRule::count("rank", &[r"Rank\s*(?:<[^>]+>\s*)*([\d,]+)"], 1..=10_000_000),
            FieldRule::count(
                "solved",
                &[r"(\d+)\s*(?:<[^>]+>\s*)*problems?\s+solved", r"Solved\s*(?:<[^>]+>\s*)*(\d+)"],
                0..=10_000,
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
    PlatformStats::Kattis(KattisStats {
        username: handle.to_string(),
        score: obs.float("score"),
        rank: obs.count("rank"),
        problems_solved: obs.count("solved"),
        profile_url,
    })
}
