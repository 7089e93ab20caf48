// CSES stats; users are identified by their numeric id

use once_cell::sync::Lazy;

use super::cascade::{PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::CsesStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::Cses,
    handle_patterns: compile(&[r"(?i)cses\.fi/(?:problemset/)?user/(\d+)"]),
    profile_url: "https://cses.fi/problemset/user/{handle}/",
    mirrors: vec![],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://cses.fi/problemset/user/{handle}/",
        not_found: &["user not found", "invalid user"],
        unrated: &[],
        profile_markers: &["task-score"],
        rules: vec![
            FieldRule::count(
                "solved",
                &[r"Solved tasks:?\s*(?:<[^>]+>\s*)*(\d+)", r"(\d+)\s*/\s*\d+\s*(?:<[^>]+>\s*)*solved"],
                0..=1_000,
            ),
            FieldRule::count(
                "submissions",
                &[r"Submission count:?\s*(?:<[^>]+>\s*)*(\d+)"],
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
    PlatformStats::Cses(CsesStats {
        user_id: handle.to_string(),
        problems_solved: obs.count("solved"),
        submissions: obs.count("submissions"),
        profile_url,
    })
}
