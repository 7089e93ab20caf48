// GeeksforGeeks stats
// Two mirror APIs, then the profile page

use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use serde_json::Value;

use super::cascade::{in_range, MirrorApi, PlatformSpec, ScrapePage};
use super::extract::{compile, json_int, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::GeeksforGeeksStats;
use crate::models::{PlatformId, PlatformStats};

const SOLVED: RangeInclusive<i64> = 0..=10_000;
const SCORE: RangeInclusive<i64> = 0..=1_000_000;
const RANK: RangeInclusive<i64> = 1..=10_000_000;
const STREAK: RangeInclusive<i64> = 0..=10_000;

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::GeeksforGeeks,
    handle_patterns: compile(&[
        r"(?i)geeksforgeeks\.org/(?:user|profile)/([A-Za-z0-9_.-]+)",
        r"(?i)auth\.geeksforgeeks\.org/user/([A-Za-z0-9_.-]+)",
    ]),
    profile_url: "https://www.geeksforgeeks.org/user/{handle}/",
    mirrors: vec![
        MirrorApi {
            url: "https://geeks-for-geeks-api.vercel.app/{handle}",
            map: map_mirror,
        },
        MirrorApi {
            url: "https://geeks-for-geeks-stats-api.vercel.app/?raw=y&userName={handle}",
            map: map_mirror,
        },
    ],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://www.geeksforgeeks.org/user/{handle}/",
        not_found: &["user does not exist", "page not found", "profile not found"],
        unrated: &[],
        profile_markers: &["profile_head", "profilepicsection"],
        rules: vec![
            FieldRule::count(
                "solved",
                &[
                    r#""total_problems_solved"\s*:\s*(\d+)"#,
                    r"Problems? Solved\s*(?:<[^>]+>\s*)*(\d+)",
                ],
                SOLVED,
            ),
            FieldRule::count(
                "score",
                &[r#""score"\s*:\s*(\d+)"#, r"Coding Score\s*(?:<[^>]+>\s*)*(\d+)"],
                SCORE,
            ),
            FieldRule::count(
                "institute_rank",
                &[r#""institute_rank"\s*:\s*"?(\d+)"#, r"Institute Rank\s*(?:<[^>]+>\s*)*(\d+)"],
                RANK,
            ),
            FieldRule::count("current_streak", &[r#""pod_solved_current_streak"\s*:\s*(\d+)"#], STREAK),
            FieldRule::count(
                "max_streak",
                &[r#""pod_solved_longest_streak"\s*:\s*(\d+)"#, r"Longest Streak\s*(?:<[^>]+>\s*)*(\d+)"],
                STREAK,
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
    let current = obs.count("current_streak");
    PlatformStats::GeeksforGeeks(GeeksforGeeksStats {
        username: handle.to_string(),
        problems_solved: obs.count("solved"),
        coding_score: obs.count("score"),
        institute_rank: obs.count("institute_rank"),
        current_streak: current,
        max_streak: obs.count("max_streak").max(current),
        profile_url,
    })
}

/// Stats sit under `info` on one mirror and at the top level on the other
fn map_mirror(v: &Value) -> Option<Observed> {
    let info = v.get("info").filter(|i| i.is_object()).unwrap_or(v);
    let solved = in_range(
        json_int(info, &["totalProblemsSolved", "total_problems_solved"]),
        &SOLVED,
    )?;

    let mut obs = Observed::new();
    obs.set_int("solved", solved);
    obs.set_int_opt("score", in_range(json_int(info, &["codingScore", "coding_score"]), &SCORE));
    obs.set_int_opt(
        "institute_rank",
        in_range(json_int(info, &["instituteRank", "institute_rank"]), &RANK),
    );
    obs.set_int_opt(
        "current_streak",
        in_range(json_int(info, &["currentStreak", "current_streak"]), &STREAK),
    );
    obs.set_int_opt("max_streak", in_range(json_int(info, &["maxStreak", "max_streak"]), &STREAK));
    Some(obs)
}
