// Codeforces stats
// Official API (user.info, user.rating, user.status), profile page as fallback

use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::cascade::{fill_template, Lookup, OfficialApi, PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::CodeforcesStats;
use crate::models::{PlatformId, PlatformStats};

const API_BASE: &str = "https://codeforces.com/api";

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::Codeforces,
    handle_patterns: compile(&[r"(?i)codeforces\.com/(?:profile|submissions|contests/with)/([A-Za-z0-9_.-]+)"]),
    profile_url: "https://codeforces.com/profile/{handle}",
    mirrors: vec![],
    official: Some(Box::new(CodeforcesApi)),
    scrape: Some(ScrapePage {
        url: "https://codeforces.com/profile/{handle}",
        not_found: &["no such handle"],
        unrated: &[],
        profile_markers: &["userbox"],
        rules: vec![
            FieldRule::count(
                "rating",
                &[r"Contest rating:\s*(?:<[^>]+>\s*)*(\d+)"],
                0..=4000,
            ),
            FieldRule::count(
                "max_rating",
                &[r"max\.\s*(?:<[^>]+>\s*)*[A-Za-z ]+(?:<[^>]+>)*,\s*(?:<[^>]+>\s*)*(\d+)"],
                0..=4000,
            ),
            FieldRule::text("rank", &[r#"<div class="user-rank">\s*<span[^>]*>\s*([^<]+?)\s*</span>"#]),
            FieldRule::count(
                "solved",
                &[r"([\d,]+)\s*problems?\s*(?:<[^>]+>\s*)*solved for all time"],
                0..=20_000,
            ),
            FieldRule::count(
                "contribution",
                &[r"Contribution:\s*(?:<[^>]+>\s*)*([+-]?\d+)"],
                -10_000..=10_000,
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
    let rating = obs.count("rating");
    PlatformStats::Codeforces(CodeforcesStats {
        handle: obs.text("handle").unwrap_or(handle).to_string(),
        rating,
        // A page without a max shows the current rating only
        max_rating: obs.count("max_rating").max(rating),
        rank: obs.text("rank").map(str::to_string).unwrap_or_else(|| "unrated".to_string()),
        max_rank: obs.text_or_default("max_rank"),
        contests_participated: obs.count("contests"),
        problems_solved: obs.count("solved"),
        contribution: obs.signed("contribution"),
        friend_of_count: obs.count("friends"),
        profile_url,
    })
}

// ============ API ============

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: String,
    comment: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    handle: String,
    rating: Option<i64>,
    max_rating: Option<i64>,
    rank: Option<String>,
    max_rank: Option<String>,
    contribution: Option<i64>,
    friend_of_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Submission {
    problem: Problem,
    verdict: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Problem {
    contest_id: Option<i64>,
    index: Option<String>,
    name: String,
}

enum ApiCall<T> {
    Ok(T),
    /// `FAILED` naming the handle as unknown
    Missing,
    Unavailable,
}

/// The API answers `FAILED` with a 400 for unknown handles, so the status
/// code alone cannot be trusted
async fn call<T: DeserializeOwned>(ctx: &FetchContext, url: String) -> ApiCall<T> {
    let response = match ctx
        .http
        .send(HttpRequest::api(url.clone(), ctx.timeouts.official))
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            warn!(url = %url, error = %e, "Codeforces API request failed");
            return ApiCall::Unavailable;
        }
    };

    if response.is_not_found() {
        return ApiCall::Missing;
    }
    let envelope: ApiEnvelope<T> = match serde_json::from_str(&response.body) {
        Ok(env) => env,
        Err(_) => {
            debug!(url = %url, status = response.status, "Codeforces API returned non-JSON");
            return ApiCall::Unavailable;
        }
    };

    match (envelope.status.as_str(), envelope.result) {
        ("OK", Some(result)) => ApiCall::Ok(result),
        ("FAILED", _) => {
            let comment = envelope.comment.unwrap_or_default();
            if comment.to_lowercase().contains("not found") {
                ApiCall::Missing
            } else {
                debug!(url = %url, comment = %comment, "Codeforces API call failed");
                ApiCall::Unavailable
            }
        }
        _ => ApiCall::Unavailable,
    }
}

struct CodeforcesApi;

#[async_trait]
impl OfficialApi for CodeforcesApi {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup {
        let info_url = fill_template(&format!("{}/user.info?handles={{handle}}", API_BASE), handle);
        let info = match call::<Vec<UserInfo>>(ctx, info_url).await {
            ApiCall::Ok(mut users) if !users.is_empty() => users.remove(0),
            ApiCall::Ok(_) | ApiCall::Missing => return Lookup::NotFound,
            ApiCall::Unavailable => return Lookup::Unavailable,
        };

        let mut obs = Observed::new();
        obs.set_text("handle", info.handle.clone());
        obs.set_int_opt("rating", info.rating);
        obs.set_int_opt("max_rating", info.max_rating);
        obs.set_text_opt("rank", info.rank);
        obs.set_text_opt("max_rank", info.max_rank);
        obs.set_int_opt("contribution", info.contribution);
        obs.set_int_opt("friends", info.friend_of_count);

        let rating_url = fill_template(&format!("{}/user.rating?handle={{handle}}", API_BASE), handle);
        if let ApiCall::Ok(changes) = call::<Vec<serde_json::Value>>(ctx, rating_url).await {
            obs.set_int("contests", changes.len() as i64);
        }

        let status_url = fill_template(
            &format!("{}/user.status?handle={{handle}}&from=1&count=10000", API_BASE),
            handle,
        );
        if let ApiCall::Ok(submissions) = call::<Vec<Submission>>(ctx, status_url).await {
            obs.set_int("solved", unique_solved(&submissions) as i64);
        }

        Lookup::Found(obs)
    }
}

/// Distinct problems with an accepted verdict
fn unique_solved(submissions: &[Submission]) -> usize {
    submissions
        .iter()
        .filter(|s| s.verdict.as_deref() == Some("OK"))
        .map(|s| match (&s.problem.contest_id, &s.problem.index) {
            (Some(contest), Some(index)) => format!("{}{}", contest, index),
            _ => s.problem.name.clone(),
        })
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_failed_status_is_trusted() {
        let mock = all_missing();
        mock.push(
            "https://codeforces.com/api/user.info?handles=ghost",
            HttpResponse::new(
                400,
                r#"{"status":"FAILED","comment":"handles: User with handle ghost not found"}"#,
            ),
        );

        assert!(fetch_stats(&ctx_with(&mock), "ghost").await.is_none());
        assert_eq!(mock.urls().len(), 1);
    }

    #[tokio::test]
    async fn test_official_api_combines_calls() {
        let mock = all_missing();
        mock.push(
            "https://codeforces.com/api/user.info?handles=tourist",
            HttpResponse::new(
                200,
                r#"{"status":"OK","result":[{"handle":"tourist","rating":3500,"maxRating":3979,
                    "rank":"legendary grandmaster","maxRank":"legendary grandmaster",
                    "contribution":120,"friendOfCount":70000}]}"#,
            ),
        );
        mock.push(
            "https://codeforces.com/api/user.rating?handle=tourist",
            HttpResponse::new(200, r#"{"status":"OK","result":[{},{},{}]}"#),
        );
        mock.push(
            "https://codeforces.com/api/user.status?handle=tourist&from=1&count=10000",
            HttpResponse::new(
                200,
                r#"{"status":"OK","result":[
                    {"problem":{"contestId":1,"index":"A","name":"x"},"verdict":"OK"},
                    {"problem":{"contestId":1,"index":"A","name":"x"},"verdict":"OK"},
                    {"problem":{"contestId":1,"index":"B","name":"y"},"verdict":"WRONG_ANSWER"},
                    {"problem":{"contestId":2,"index":"C","name":"z"},"verdict":"OK"}]}"#,
            ),
        );

        let stats = fetch_stats(&ctx_with(&mock), "https://codeforces.com/profile/tourist").await;
        let Some(PlatformStats::Codeforces(s)) = stats else {
            panic!("expected Codeforces stats, got {:?}", stats);
        };
        assert_eq!(s.max_rating, 3979);
        assert_eq!(s.contests_participated, 3);
        assert_eq!(s.problems_solved, 2);
        assert_eq!(s.friend_of_count, 70000);
    }

    #[tokio::test]
    async fn test_scrape_when_api_is_down() {
        let mock = crate::api::http::MockTransport::new();
        mock.push(
            "https://codeforces.com/profile/alice",
            HttpResponse::new(
                200,
                r#"<div class="userbox"><div class="user-rank"><span class="user-green">pupil</span></div>
                   <a href="/profile/alice">alice</a>
                   <li>Contest rating: <span class="user-green">1250</span>
                   (max. <span class="user-cyan">specialist</span>, <span class="user-cyan">1420</span>)</li>
                   <div class="_UserActivityFrame_counterValue">312 problems</div>
                   <div class="_UserActivityFrame_counterDescription">solved for all time</div></div>"#,
            ),
        );

        let Some(PlatformStats::Codeforces(s)) = fetch_stats(&ctx_with(&mock), "alice").await else {
            panic!("expected stats");
        };
        assert_eq!(s.rating, 1250);
        assert_eq!(s.max_rating, 1420);
        assert_eq!(s.rank, "pupil");
        assert_eq!(s.problems_solved, 312);
    }
}
