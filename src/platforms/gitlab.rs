// GitLab stats from the v4 REST API

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;

use super::cascade::{fetch_json, fill_template, ApiReply, Lookup, OfficialApi, PlatformSpec};
use super::extract::{compile, Observed};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::GitLabStats;
use crate::models::{PlatformId, PlatformStats};

const API_BASE: &str = "https://gitlab.com/api/v4";

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::GitLab,
    handle_patterns: compile(&[r"(?i)gitlab\.com/(?:users/)?([A-Za-z0-9_.-]+)"]),
    profile_url: "https://gitlab.com/{handle}",
    mirrors: vec![],
    official: Some(Box::new(GitLabApi)),
    scrape: None,
    basic_fallback: false,
    build,
});

pub async fn fetch_stats(ctx: &FetchContext, username: &str) -> Option<PlatformStats> {
    SPEC.fetch(ctx, username).await
}

fn build(handle: &str, profile_url: String, obs: &Observed) -> PlatformStats {
    PlatformStats::GitLab(GitLabStats {
        username: obs.text("username").unwrap_or(handle).to_string(),
        name: obs.text("name").map(str::to_string),
        public_projects: obs.count("projects"),
        total_stars: obs.count("stars"),
        profile_url,
    })
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: i64,
    username: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiProject {
    #[serde(default)]
    star_count: i64,
}

struct GitLabApi;

#[async_trait]
impl OfficialApi for GitLabApi {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup {
        let url = fill_template(&format!("{}/users?username={{handle}}", API_BASE), handle);
        let mut users: Vec<ApiUser> =
            match fetch_json(ctx, HttpRequest::api(url, ctx.timeouts.official)).await {
                ApiReply::Json(json) => match serde_json::from_value(json) {
                    Ok(users) => users,
                    Err(_) => return Lookup::Unavailable,
                },
                ApiReply::NotFound => return Lookup::NotFound,
                ApiReply::Unavailable => return Lookup::Unavailable,
            };
        if users.is_empty() {
            return Lookup::NotFound;
        }
        let user = users.remove(0);

        let mut obs = Observed::new();
        obs.set_text("username", user.username);
        obs.set_text_opt("name", user.name);

        let projects_url = format!("{}/users/{}/projects?per_page=100", API_BASE, user.id);
        if let ApiReply::Json(json) =
            fetch_json(ctx, HttpRequest::api(projects_url, ctx.timeouts.official)).await
        {
            if let Ok(projects) = serde_json::from_value::<Vec<ApiProject>>(json) {
                obs.set_int("projects", projects.len() as i64);
                obs.set_int("stars", projects.iter().map(|p| p.star_count).sum());
            }
        }
        Lookup::Found(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_empty_user_list_is_not_found() {
        let mock = all_missing();
        mock.push(
            "https://gitlab.com/api/v4/users?username=ghost",
            HttpResponse::new(200, "[]"),
        );
        assert!(fetch_stats(&ctx_with(&mock), "ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_projects_and_stars() {
        let mock = all_missing();
        mock.push(
            "https://gitlab.com/api/v4/users?username=tanuki",
            HttpResponse::new(200, r#"[{"id":77,"username":"tanuki","name":"Tan Uki"}]"#),
        );
        mock.push(
            "https://gitlab.com/api/v4/users/77/projects?per_page=100",
            HttpResponse::new(200, r#"[{"star_count":4},{"star_count":9},{}]"#),
        );

        let Some(PlatformStats::GitLab(s)) =
            fetch_stats(&ctx_with(&mock), "https://gitlab.com/tanuki").await
        else {
            panic!("expected stats");
        };
        assert_eq!(s.public_projects, 3);
        assert_eq!(s.total_stars, 13);
        assert_eq!(s.name.as_deref(), Some("Tan Uki"));
    }
}
