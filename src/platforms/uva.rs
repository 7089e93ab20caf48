// UVa Online Judge stats through the uHunt API

use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;

use super::cascade::{fetch_json, fill_template, ApiReply, Lookup, OfficialApi, PlatformSpec};
use super::extract::{as_int, compile, Observed};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::UvaStats;
use crate::models::{PlatformId, PlatformStats};

const API_BASE: &str = "https://uhunt.onlinejudge.org/api";

/// uHunt verdict id for Accepted
const VERDICT_ACCEPTED: i64 = 90;

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::Uva,
    handle_patterns: compile(&[r"(?i)uhunt\.onlinejudge\.org/u/([A-Za-z0-9_.-]+)"]),
    profile_url: "https://uhunt.onlinejudge.org/u/{handle}",
    mirrors: vec![],
    official: Some(Box::new(UhuntApi)),
    scrape: None,
    basic_fallback: false,
    build,
});

pub async fn fetch_stats(ctx: &FetchContext, username: &str) -> Option<PlatformStats> {
    SPEC.fetch(ctx, username).await
}

fn build(handle: &str, profile_url: String, obs: &Observed) -> PlatformStats {
    PlatformStats::Uva(UvaStats {
        username: handle.to_string(),
        user_id: obs.count("user_id"),
        problems_solved: obs.count("solved"),
        submissions: obs.count("submissions"),
        profile_url,
    })
}

/// Each submission is `[id, problem, verdict, runtime, time, language, rank]`
#[derive(Debug, Deserialize)]
struct UserSubmissions {
    #[serde(default)]
    subs: Vec<Vec<serde_json::Value>>,
}

struct UhuntApi;

#[async_trait]
impl OfficialApi for UhuntApi {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup {
        let uid_url = fill_template(&format!("{}/uname2uid/{{handle}}", API_BASE), handle);
        let uid = match fetch_json(ctx, HttpRequest::api(uid_url, ctx.timeouts.official)).await {
            ApiReply::Json(json) => match as_int(&json) {
                Some(0) => return Lookup::NotFound,
                Some(uid) => uid,
                None => return Lookup::Unavailable,
            },
            ApiReply::NotFound => return Lookup::NotFound,
            ApiReply::Unavailable => return Lookup::Unavailable,
        };

        let subs_url = format!("{}/subs-user/{}", API_BASE, uid);
        let subs: UserSubmissions =
            match fetch_json(ctx, HttpRequest::api(subs_url, ctx.timeouts.official)).await {
                ApiReply::Json(json) => match serde_json::from_value(json) {
                    Ok(subs) => subs,
                    Err(_) => return Lookup::Unavailable,
                },
                _ => return Lookup::Unavailable,
            };

        let solved: HashSet<i64> = subs
            .subs
            .iter()
            .filter(|s| s.get(2).and_then(as_int) == Some(VERDICT_ACCEPTED))
            .filter_map(|s| s.get(1).and_then(as_int))
            .collect();

        let mut obs = Observed::new();
        obs.set_int("user_id", uid);
        obs.set_int("solved", solved.len() as i64);
        obs.set_int("submissions", subs.subs.len() as i64);
        Lookup::Found(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_uid_zero_is_not_found() {
        let mock = all_missing();
        mock.push(
            "https://uhunt.onlinejudge.org/api/uname2uid/nobody",
            HttpResponse::new(200, "0"),
        );
        assert!(fetch_stats(&ctx_with(&mock), "nobody").await.is_none());
        assert_eq!(mock.urls().len(), 1);
    }

    #[tokio::test]
    async fn test_unique_accepted_problems() {
        let mock = all_missing();
        mock.push(
            "https://uhunt.onlinejudge.org/api/uname2uid/felix",
            HttpResponse::new(200, "339"),
        );
        mock.push(
            "https://uhunt.onlinejudge.org/api/subs-user/339",
            HttpResponse::new(
                200,
                r#"{"name":"Felix","uname":"felix","subs":[
                    [1,36,90,10,1,1,-1],[2,36,90,12,2,1,-1],
                    [3,37,70,0,3,1,-1],[4,38,90,5,4,5,-1]]}"#,
            ),
        );

        let Some(PlatformStats::Uva(s)) = fetch_stats(&ctx_with(&mock), "felix").await else {
            panic!("expected stats");
        };
        assert_eq!(s.user_id, 339);
        assert_eq!(s.problems_solved, 2);
        assert_eq!(s.submissions, 4);
    }
}
