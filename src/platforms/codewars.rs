// Codewars stats from the public users API

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;

use super::cascade::{fetch_json, fill_template, ApiReply, Lookup, OfficialApi, PlatformSpec};
use super::extract::{compile, Observed};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::CodewarsStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::Codewars,
    handle_patterns: compile(&[r"(?i)codewars\.com/users/([A-Za-z0-9_.-]+)"]),
    profile_url: "https://www.codewars.com/users/{handle}",
    mirrors: vec![],
    official: Some(Box::new(UsersApi)),
    scrape: None,
    basic_fallback: false,
    build,
});

pub async fn fetch_stats(ctx: &FetchContext, username: &str) -> Option<PlatformStats> {
    SPEC.fetch(ctx, username).await
}

fn build(handle: &str, profile_url: String, obs: &Observed) -> PlatformStats {
    PlatformStats::Codewars(CodewarsStats {
        username: obs.text("username").unwrap_or(handle).to_string(),
        honor: obs.count("honor"),
        rank_name: obs.text_or_default("rank_name"),
        score: obs.count("score"),
        leaderboard_position: obs.count("leaderboard_position"),
        completed_katas: obs.count("completed"),
        languages: obs.list("languages"),
        profile_url,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUser {
    username: String,
    #[serde(default)]
    honor: i64,
    leaderboard_position: Option<i64>,
    ranks: Option<Ranks>,
    code_challenges: Option<CodeChallenges>,
}

#[derive(Debug, Deserialize)]
struct Ranks {
    overall: Option<Rank>,
    #[serde(default)]
    languages: HashMap<String, Rank>,
}

#[derive(Debug, Deserialize)]
struct Rank {
    name: Option<String>,
    #[serde(default)]
    score: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeChallenges {
    #[serde(default)]
    total_completed: i64,
}

struct UsersApi;

#[async_trait]
impl OfficialApi for UsersApi {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup {
        let url = fill_template("https://www.codewars.com/api/v1/users/{handle}", handle);
        let user: ApiUser = match fetch_json(ctx, HttpRequest::api(url, ctx.timeouts.official)).await {
            ApiReply::Json(json) => match serde_json::from_value(json) {
                Ok(user) => user,
                Err(_) => return Lookup::Unavailable,
            },
            ApiReply::NotFound => return Lookup::NotFound,
            ApiReply::Unavailable => return Lookup::Unavailable,
        };

        let mut obs = Observed::new();
        obs.set_text("username", user.username);
        obs.set_int("honor", user.honor);
        obs.set_int_opt("leaderboard_position", user.leaderboard_position);
        if let Some(challenges) = user.code_challenges {
            obs.set_int("completed", challenges.total_completed);
        }
        if let Some(ranks) = user.ranks {
            if let Some(overall) = ranks.overall {
                obs.set_text_opt("rank_name", overall.name);
                obs.set_int("score", overall.score);
            }
            obs.set_list("languages", by_score(ranks.languages));
        }
        Lookup::Found(obs)
    }
}

/// Language names, strongest first
fn by_score(languages: HashMap<String, Rank>) -> Vec<String> {
    let mut ranked: Vec<(String, i64)> = languages
        .into_iter()
        .map(|(name, rank)| (name, rank.score))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_user_with_languages() {
        let mock = all_missing();
        mock.push(
            "https://www.codewars.com/api/v1/users/kata_fan",
            HttpResponse::new(
                200,
                r#"{"username":"kata_fan","honor":544,"leaderboardPosition":13400,
                    "ranks":{"overall":{"rank":-4,"name":"4 kyu","score":1200},
                             "languages":{"python":{"name":"4 kyu","score":1100},
                                          "rust":{"name":"6 kyu","score":90}}},
                    "codeChallenges":{"totalAuthored":0,"totalCompleted":231}}"#,
            ),
        );

        let Some(PlatformStats::Codewars(s)) = fetch_stats(&ctx_with(&mock), "kata_fan").await else {
            panic!("expected stats");
        };
        assert_eq!(s.completed_katas, 231);
        assert_eq!(s.rank_name, "4 kyu");
        assert_eq!(s.languages, vec!["python", "rust"]);
        assert_eq!(s.leaderboard_position, 13400);
    }
}
