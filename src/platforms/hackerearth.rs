// HackerEarth stats, scraped; profiles that render client-side get a basic profile

use once_cell::sync::Lazy;

use super::cascade::{PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::HackerEarthStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::HackerEarth,
    handle_patterns: compile(&[r"(?i)hackerearth\.com/(?:@|users/)?([A-Za-z0-9_-]+)"]),
    profile_url: "https://www.hackerearth.com/@{handle}/",
    mirrors: vec![],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://www.hackerearth.com/@{handle}/",
        not_found: &["page not found", "this page doesn't exist", "user not found"],
        unrated: &[],
        profile_markers: &[],
        rules: vec![
            FieldRule::count(
                "solved",
                &[
                    r"Problems Solved\s*(?:<[^>]+>\s*)*(\d+)",
                    r"(\d+)\s*(?:<[^>]+>\s*)*Problems Solved",
                ],
                0..=10_000,
            ),
            FieldRule::count("rating", &[r"Rating\s*(?:<[^>]+>\s*)*(\d+)"], 0..=4000),
            FieldRule::count("points", &[r"Points\s*(?:<[^>]+>\s*)*([\d,]+)"], 0..=10_000_000),
        ],
        handle_must_appear: true,
    }),
    basic_fallback: true,
    build,
});

pub async fn fetch_stats(ctx: &FetchContext, username: &str) -> Option<PlatformStats> {
    SPEC.fetch(ctx, username).await
}

fn build(handle: &str, profile_url: String, obs: &Observed) -> PlatformStats {
    PlatformStats::HackerEarth(HackerEarthStats {
        username: handle.to_string(),
        problems_solved: obs.count("solved"),
        rating: obs.count("rating"),
        points: obs.count("points"),
        profile_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    const PAGE: &str = "https://www.hackerearth.com/@dev_kim/";

    #[tokio::test]
    async fn test_scraped_fields() {
        let mock = all_missing();
        mock.push(
            PAGE,
            HttpResponse::new(
                200,
                r#"<h1>dev_kim</h1><div><span>Problems Solved</span><b>87</b></div>
                   <div><span>Rating</span><b>1450</b></div>"#,
            ),
        );

        let Some(PlatformStats::HackerEarth(s)) = fetch_stats(&ctx_with(&mock), "dev_kim").await else {
            panic!("expected stats");
        };
        assert_eq!(s.problems_solved, 87);
        assert_eq!(s.rating, 1450);
    }

    #[tokio::test]
    async fn test_served_but_unreadable_page_gives_basic_profile() {
        let mock = all_missing();
        mock.push(PAGE, HttpResponse::new(200, "<div id=\"root\" data-user=\"dev_kim\"></div>"));

        let stats = fetch_stats(&ctx_with(&mock), "dev_kim").await;
        assert_eq!(
            stats,
            Some(PlatformStats::HackerEarth(HackerEarthStats {
                username: "dev_kim".to_string(),
                profile_url: PAGE.to_string(),
                ..Default::default()
            }))
        );
    }

    #[tokio::test]
    async fn test_negative_marker_beats_fallback() {
        let mock = all_missing();
        mock.push(PAGE, HttpResponse::new(200, "<h1>Page not found</h1> dev_kim"));
        assert!(fetch_stats(&ctx_with(&mock), "dev_kim").await.is_none());
    }
}
