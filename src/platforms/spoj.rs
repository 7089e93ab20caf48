// SPOJ stats, scraped from the user page

use once_cell::sync::Lazy;

use super::cascade::{PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::SpojStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::Spoj,
    handle_patterns: compile(&[r"(?i)spoj\.com/(?:users|status)/([A-Za-z0-9_]+)"]),
    profile_url: "https://www.spoj.com/users/{handle}/",
    mirrors: vec![],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://www.spoj.com/users/{handle}/",
        not_found: &["user does not exist", "unknown user"],
        unrated: &[],
        profile_markers: &["user-profile-left"],
        rules: vec![
            FieldRule::count(
                "solved",
                &[r"Problems solved\s*(?:<[^>]+>\s*)*(\d+)"],
                0..=10_000,
            ),
            FieldRule::count("world_rank", &[r"World Rank:\s*#([\d,]+)"], 1..=10_000_000),
            FieldRule::decimal("points", &[r"\(([\d.,]+)\s*points\)"], 0.0..=1_000_000.0),
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
    PlatformStats::Spoj(SpojStats {
        username: handle.to_string(),
        problems_solved: obs.count("solved"),
        world_rank: obs.count("world_rank"),
        points: obs.float("points"),
        profile_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_user_page() {
        let mock = all_missing();
        mock.push(
            "https://www.spoj.com/users/xeno/",
            HttpResponse::new(
                200,
                r#"<div id="user-profile-left"><h3>xeno</h3>
                   <p><i class="fa fa-trophy"></i> World Rank: #2,311 (152.4 points)</p></div>
                   <dl><dt>Problems solved</dt><dd>143</dd></dl>"#,
            ),
        );

        let Some(PlatformStats::Spoj(s)) =
            fetch_stats(&ctx_with(&mock), "https://www.spoj.com/users/xeno/").await
        else {
            panic!("expected stats");
        };
        assert_eq!(s.problems_solved, 143);
        assert_eq!(s.world_rank, 2311);
        assert_eq!(s.points, 152.4);
    }

    #[tokio::test]
    async fn test_redirect_to_landing_page_is_not_a_profile() {
        let mock = all_missing();
        mock.push(
            "https://www.spoj.com/users/xeno/",
            HttpResponse::new(200, "<h1>Sphere Online Judge</h1> Problems solved 999"),
        );
        assert!(fetch_stats(&ctx_with(&mock), "xeno").await.is_none());
    }
}
