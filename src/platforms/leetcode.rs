// LeetCode stats
// Mirrors first, then the GraphQL endpoint, then the profile page

use std::ops::RangeInclusive;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::cascade::{fetch_json, in_range, ApiReply, Lookup, MirrorApi, OfficialApi, PlatformSpec, ScrapePage};
use super::extract::{compile, json_float, json_int, FieldRule, Observed};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::LeetCodeStats;
use crate::models::{PlatformId, PlatformStats};

const GRAPHQL_URL: &str = "https://leetcode.com/graphql";

const PROFILE_QUERY: &str = r#"
    query userProfile($username: String!) {
        matchedUser(username: $username) {
            username
            profile {
                ranking
                reputation
            }
            contributions {
                points
            }
            submitStatsGlobal {
                acSubmissionNum {
                    difficulty
                    count
                    submissions
                }
                totalSubmissionNum {
                    difficulty
                    count
                    submissions
                }
            }
        }
        userContestRanking(username: $username) {
            attendedContestsCount
            rating
        }
    }
"#;

const SOLVED: RangeInclusive<i64> = 0..=10_000;
const RANKING: RangeInclusive<i64> = 1..=10_000_000;

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::LeetCode,
    handle_patterns: compile(&[r"(?i)leetcode\.(?:com|cn)/(?:u/|profile/)?([A-Za-z0-9_-]+)"]),
    profile_url: "https://leetcode.com/u/{handle}/",
    mirrors: vec![
        MirrorApi {
            url: "https://leetcode-stats-api.herokuapp.com/{handle}",
            map: map_stats_api,
        },
        MirrorApi {
            url: "https://alfa-leetcode-api.onrender.com/{handle}/solved",
            map: map_alfa_api,
        },
    ],
    official: Some(Box::new(LeetCodeGraphql)),
    scrape: Some(ScrapePage {
        url: "https://leetcode.com/u/{handle}/",
        not_found: &["user does not exist", "page not found"],
        unrated: &[],
        profile_markers: &[],
        rules: vec![
            FieldRule::count(
                "total",
                &[r#""difficulty":"All","count":(\d+)"#, r"(\d+)\s*(?:<[^>]+>\s*)*/\s*(?:<[^>]+>\s*)*\d+\s*(?:<[^>]+>\s*)*Solved"],
                SOLVED,
            ),
            FieldRule::count("easy", &[r#""difficulty":"Easy","count":(\d+)"#], SOLVED),
            FieldRule::count("medium", &[r#""difficulty":"Medium","count":(\d+)"#], SOLVED),
            FieldRule::count("hard", &[r#""difficulty":"Hard","count":(\d+)"#], SOLVED),
            FieldRule::count("ranking", &[r#""ranking":(\d+)"#], RANKING),
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
    let easy = obs.count("easy");
    let medium = obs.count("medium");
    let hard = obs.count("hard");
    let total_solved = if obs.has("total") {
        obs.count("total")
    } else {
        easy + medium + hard
    };

    PlatformStats::LeetCode(LeetCodeStats {
        username: handle.to_string(),
        total_solved,
        easy_solved: easy,
        medium_solved: medium,
        hard_solved: hard,
        ranking: obs.count("ranking"),
        acceptance_rate: obs.float("acceptance"),
        contribution_points: obs.count("contribution"),
        reputation: obs.count("reputation"),
        contest_rating: obs.count("contest_rating"),
        contests_attended: obs.count("contests"),
        profile_url,
    })
}

/// leetcode-stats-api: flat object with `status`
fn map_stats_api(v: &Value) -> Option<Observed> {
    let total = in_range(json_int(v, &["totalSolved"]), &SOLVED)?;
    let mut obs = Observed::new();
    obs.set_int("total", total);
    set_difficulty_counts(&mut obs, v);
    obs.set_int_opt("ranking", in_range(json_int(v, &["ranking"]), &RANKING));
    obs.set_float_opt("acceptance", json_float(v, &["acceptanceRate"]));
    obs.set_int_opt("contribution", json_int(v, &["contributionPoints"]));
    obs.set_int_opt("reputation", json_int(v, &["reputation"]));
    Some(obs)
}

/// alfa-leetcode-api `/solved`
fn map_alfa_api(v: &Value) -> Option<Observed> {
    let total = in_range(json_int(v, &["solvedProblem"]), &SOLVED)?;
    let mut obs = Observed::new();
    obs.set_int("total", total);
    set_difficulty_counts(&mut obs, v);
    Some(obs)
}

fn set_difficulty_counts(obs: &mut Observed, v: &Value) {
    obs.set_int_opt("easy", in_range(json_int(v, &["easySolved"]), &SOLVED));
    obs.set_int_opt("medium", in_range(json_int(v, &["mediumSolved"]), &SOLVED));
    obs.set_int_opt("hard", in_range(json_int(v, &["hardSolved"]), &SOLVED));
}

// ============ GraphQL ============

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<GraphqlData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlData {
    matched_user: Option<MatchedUser>,
    user_contest_ranking: Option<ContestRanking>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUser {
    profile: Option<Profile>,
    contributions: Option<Contributions>,
    submit_stats_global: Option<SubmitStats>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    ranking: Option<i64>,
    reputation: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Contributions {
    points: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitStats {
    #[serde(default)]
    ac_submission_num: Vec<DifficultyCount>,
    #[serde(default)]
    total_submission_num: Vec<DifficultyCount>,
}

#[derive(Debug, Deserialize)]
struct DifficultyCount {
    difficulty: String,
    count: i64,
    #[serde(default)]
    submissions: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContestRanking {
    attended_contests_count: Option<i64>,
    rating: Option<f64>,
}

struct LeetCodeGraphql;

#[async_trait]
impl OfficialApi for LeetCodeGraphql {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup {
        let body = serde_json::json!({
            "query": PROFILE_QUERY,
            "variables": { "username": handle },
        });
        let request = HttpRequest::post_json(GRAPHQL_URL, &body, ctx.timeouts.official)
            .header("Referer", "https://leetcode.com");

        match fetch_json(ctx, request).await {
            ApiReply::Json(json) => read_graphql(json),
            ApiReply::NotFound => Lookup::NotFound,
            ApiReply::Unavailable => Lookup::Unavailable,
        }
    }
}

fn read_graphql(json: Value) -> Lookup {
    let response: GraphqlResponse = match serde_json::from_value(json) {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "Unexpected LeetCode GraphQL shape");
            return Lookup::Unavailable;
        }
    };

    if response
        .errors
        .iter()
        .any(|e| e.message.to_lowercase().contains("does not exist"))
    {
        return Lookup::NotFound;
    }

    let Some(data) = response.data else {
        return Lookup::Unavailable;
    };
    let Some(user) = data.matched_user else {
        return Lookup::NotFound;
    };

    let mut obs = Observed::new();
    if let Some(stats) = &user.submit_stats_global {
        for entry in &stats.ac_submission_num {
            let field = match entry.difficulty.as_str() {
                "All" => "total",
                "Easy" => "easy",
                "Medium" => "medium",
                "Hard" => "hard",
                _ => continue,
            };
            obs.set_int(field, entry.count);
        }
        obs.set_float_opt("acceptance", acceptance_rate(stats));
    }
    if let Some(profile) = &user.profile {
        obs.set_int_opt("ranking", profile.ranking);
        obs.set_int_opt("reputation", profile.reputation);
    }
    if let Some(contrib) = &user.contributions {
        obs.set_int_opt("contribution", contrib.points);
    }
    if let Some(contest) = &data.user_contest_ranking {
        obs.set_int_opt("contests", contest.attended_contests_count);
        obs.set_int_opt("contest_rating", contest.rating.map(|r| r.round() as i64));
    }
    Lookup::Found(obs)
}

/// Accepted over total submissions, percent with two decimals
fn acceptance_rate(stats: &SubmitStats) -> Option<f64> {
    let all = |list: &[DifficultyCount]| {
        list.iter()
            .find(|e| e.difficulty == "All")
            .map(|e| e.submissions)
    };
    let accepted = all(&stats.ac_submission_num)?;
    let total = all(&stats.total_submission_num).filter(|t| *t > 0)?;
    let rate = accepted as f64 / total as f64 * 100.0;
    Some((rate * 100.0).round() / 100.0)
}
