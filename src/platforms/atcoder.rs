// AtCoder stats, scraped from the profile page

use once_cell::sync::Lazy;

use super::cascade::{PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::AtCoderStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::AtCoder,
    handle_patterns: compile(&[r"(?i)atcoder\.jp/users/([A-Za-z0-9_]+)"]),
    profile_url: "https://atcoder.jp/users/{handle}",
    mirrors: vec![],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://atcoder.jp/users/{handle}",
        not_found: &["user not found"],
        unrated: &["has not competed in a rated contest"],
        profile_markers: &["dl-table mt-2"],
        rules: vec![
            FieldRule::count("rating", &[r"<th[^>]*>Rating</th>\s*(?:<[^>]+>\s*)*(\d+)"], 0..=5000),
            FieldRule::count(
                "highest_rating",
                &[r"<th[^>]*>Highest Rating</th>\s*(?:<[^>]+>\s*)*(\d+)"],
                0..=5000,
            ),
            FieldRule::count(
                "rank",
                &[r"<th[^>]*>Rank</th>\s*(?:<[^>]+>\s*)*(\d+)(?:st|nd|rd|th)"],
                1..=10_000_000,
            ),
            FieldRule::count(
                "rated_matches",
                &[r"<th[^>]*>Rated Matches\s*(?:<[^>]+>\s*)*</th>\s*(?:<[^>]+>\s*)*(\d+)"],
                0..=10_000,
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
    let rank = if obs.is_unrated() || !obs.has("rank") {
        "Unrated".to_string()
    } else {
        obs.count("rank").to_string()
    };

    PlatformStats::AtCoder(AtCoderStats {
        username: handle.to_string(),
        rating,
        highest_rating: obs.count("highest_rating").max(rating),
        rank,
        rated_matches: obs.count("rated_matches"),
        problems_solved: obs.count("solved"),
        profile_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    const PAGE: &str = "https://atcoder.jp/users/";

    #[tokio::test]
    async fn test_unrated_user_gets_zero_stats() {
        let mock = all_missing();
        mock.push(
            format!("{PAGE}newbie"),
            HttpResponse::new(
                200,
                r#"<h3><a class="username" href="/users/newbie">newbie</a></h3>
                   <p>This user has not competed in a rated contest yet.</p>"#,
            ),
        );

        let stats = fetch_stats(&ctx_with(&mock), "newbie").await;
        let Some(PlatformStats::AtCoder(s)) = stats else {
            panic!("expected AtCoder stats, got {:?}", stats);
        };
        assert_eq!(s.rank, "Unrated");
        assert_eq!(s.rating, 0);
        assert_eq!(s.highest_rating, 0);
        assert_eq!(s.rated_matches, 0);
    }

    #[tokio::test]
    async fn test_user_not_found_is_none() {
        let mock = all_missing();
        mock.push(
            format!("{PAGE}ghost"),
            HttpResponse::new(200, "<h1>ghost</h1><p>User not found</p>"),
        );
        assert!(fetch_stats(&ctx_with(&mock), "ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_rated_profile() {
        let mock = all_missing();
        mock.push(
            format!("{PAGE}chokudai"),
            HttpResponse::new(
                200,
                r#"<a class="username">chokudai</a>
                   <table class="dl-table mt-2">
                   <tr><th class="no-break">Rank</th><td>512th</td></tr>
                   <tr><th class="no-break">Rating</th><td><span class="user-yellow">2105</span></td></tr>
                   <tr><th class="no-break">Highest Rating</th><td><span class="user-orange">2450</span></td></tr>
                   <tr><th class="no-break">Rated Matches <span class="glyphicon"></span></th><td>87</td></tr>
                   </table>"#,
            ),
        );

        let Some(PlatformStats::AtCoder(s)) =
            fetch_stats(&ctx_with(&mock), "https://atcoder.jp/users/chokudai").await
        else {
            panic!("expected stats");
        };
        assert_eq!(s.rating, 2105);
        assert_eq!(s.highest_rating, 2450);
        assert_eq!(s.rank, "512");
        assert_eq!(s.rated_matches, 87);
    }
}
