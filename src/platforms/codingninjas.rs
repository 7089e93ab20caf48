// Coding Ninjas (Code360) stats
// The profile is a single-page app, so the handle is not required on the page

use once_cell::sync::Lazy;

use super::cascade::{PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::CodingNinjasStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::CodingNinjas,
    handle_patterns: compile(&[
        r"(?i)naukri\.com/code360/profile/([A-Za-z0-9_-]+)",
        r"(?i)codingninjas\.com/(?:studio|codestudio)/profile/([A-Za-z0-9_-]+)",
    ]),
    profile_url: "https://www.naukri.com/code360/profile/{handle}",
    mirrors: vec![],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://www.naukri.com/code360/profile/{handle}",
        not_found: &["profile not found", "page not found", "user does not exist"],
        unrated: &[],
        profile_markers: &[],
        rules: vec![
            FieldRule::count(
                "solved",
                &[
                    r#""total_problems_solved"\s*:\s*(\d+)"#,
                    r"Problems solved\s*(?:<[^>]+>\s*)*(\d+)",
                    r"(\d+)\s*(?:<[^>]+>\s*)*Problems solved",
                ],
                0..=10_000,
            ),
            FieldRule::count("score", &[r#""score"\s*:\s*(\d+)"#, r"Score\s*(?:<[^>]+>\s*)*(\d+)"], 0..=10_000_000),
            FieldRule::count(
                "streak",
                &[r#""current_streak"\s*:\s*(\d+)"#, r"Current streak\s*(?:<[^>]+>\s*)*(\d+)"],
                0..=10_000,
            ),
        ],
        handle_must_appear: false,
    }),
    basic_fallback: true,
    build,
});

pub async fn fetch_stats(ctx: &FetchContext, username: &str) -> Option<PlatformStats> {
    SPEC.fetch(ctx, username).await
}

fn build(handle: &str, profile_url: String, obs: &Observed) -> PlatformStats {
    PlatformStats::CodingNinjas(CodingNinjasStats {
        username: handle.to_string(),
        problems_solved: obs.count("solved"),
        score: obs.count("score"),
        streak: obs.count("streak"),
        profile_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    const PAGE: &str = "https://www.naukri.com/code360/profile/ninja42";

    #[tokio::test]
    async fn test_embedded_state() {
        let mock = all_missing();
        mock.push(
            PAGE,
            HttpResponse::new(
                200,
                r#"<script>window.__STATE__={"total_problems_solved":231,"score":1880,"current_streak":6}</script>"#,
            ),
        );

        let Some(PlatformStats::CodingNinjas(s)) = fetch_stats(&ctx_with(&mock), "ninja42").await else {
            panic!("expected stats");
        };
        assert_eq!(s.problems_solved, 231);
        assert_eq!(s.score, 1880);
        assert_eq!(s.streak, 6);
    }

    #[tokio::test]
    async fn test_app_shell_gives_basic_profile() {
        let mock = all_missing();
        mock.push(PAGE, HttpResponse::new(200, "<div id=\"__next\"></div>"));

        let Some(PlatformStats::CodingNinjas(s)) =
            fetch_stats(&ctx_with(&mock), "https://www.naukri.com/code360/profile/ninja42").await
        else {
            panic!("expected basic profile");
        };
        assert_eq!(s.problems_solved, 0);
        assert_eq!(s.profile_url, PAGE);
    }
}
