// Fetcher for custom platforms
// Reads whatever a profile page shows; without a base URL only a basic profile is possible

use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

use super::cascade::fill_template;
use super::extract::{contains_any, extract_all, page_title, visible_text, FieldRule, Observed};
use super::handle::{is_valid_handle, normalize_handle};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::CustomStats;
use crate::models::PlatformStats;

const NOT_FOUND: &[&str] = &[
    "user not found",
    "profile not found",
    "page not found",
    "user does not exist",
    "no such user",
];

/// Rules run against the page's visible text, not its markup
static RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::count(
            "solved",
            &[
                r"(?i)(?:problems?|tasks?|challenges?)\s+solved\s*:?\s*([\d,]+)",
                r"(?i)([\d,]+)\s+(?:problems?|tasks?|challenges?)\s+solved",
                r"(?i)\bsolved\s*:?\s*([\d,]+)",
            ],
            0..=100_000,
        ),
        FieldRule::count("rating", &[r"(?i)\brating\s*:?\s*(\d{1,4})\b"], 0..=5000),
        FieldRule::count(
            "score",
            &[r"(?i)\b(?:score|points)\s*:?\s*([\d,]+)"],
            0..=100_000_000,
        ),
        FieldRule::text("rank", &[r"(?i)\brank\s*:?\s*(#?[\d,]+)"]),
    ]
});

/// Clean a custom platform handle
pub fn normalize(raw: &str) -> Option<String> {
    normalize_handle(raw, &[])
}

/// Fetch stats for a platform without a dedicated fetcher.
///
/// `platform_url` is a base URL (`https://judge.example/users`) or a template
/// containing `{handle}`. Returns `None` when the profile is reported missing
/// or cannot be reached.
pub async fn fetch_stats(
    ctx: &FetchContext,
    platform: &str,
    username: &str,
    platform_url: Option<&str>,
) -> Option<PlatformStats> {
    let handle = normalize(username)?;

    let Some(base) = platform_url.map(str::trim).filter(|u| !u.is_empty()) else {
        return basic_profile(platform, &handle, None);
    };

    let url = profile_url(base, &handle);
    let response = match ctx
        .http
        .send(HttpRequest::page(url.clone(), ctx.timeouts.scrape))
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            warn!(platform, url = %url, error = %e, "Custom platform request failed");
            return None;
        }
    };

    if !response.is_success() {
        debug!(platform, url = %url, status = response.status, "Custom profile not served");
        return None;
    }
    if contains_any(&response.body.to_lowercase(), NOT_FOUND) {
        info!(platform, handle = %handle, "Custom platform reports no such user");
        return None;
    }

    let observed = extract_all(&RULES, &visible_text(&response.body));
    if observed.is_empty() {
        return basic_profile(platform, &handle, Some(url));
    }

    info!(platform, handle = %handle, fields = observed.len(), "Fetched custom platform stats");
    Some(build(platform, &handle, Some(url), page_title(&response.body), &observed))
}

fn profile_url(base: &str, handle: &str) -> String {
    if base.contains("{handle}") {
        fill_template(base, handle)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(handle))
    }
}

fn basic_profile(platform: &str, handle: &str, url: Option<String>) -> Option<PlatformStats> {
    if !is_valid_handle(handle) {
        debug!(platform, handle, "Handle not plausible, no basic profile");
        return None;
    }
    Some(build(platform, handle, url, None, &Observed::new()))
}

fn build(
    platform: &str,
    handle: &str,
    profile_url: Option<String>,
    display_name: Option<String>,
    obs: &Observed,
) -> PlatformStats {
    PlatformStats::Custom(CustomStats {
        platform: platform.to_string(),
        username: handle.to_string(),
        display_name,
        problems_solved: obs.count("solved"),
        rating: obs.count("rating"),
        score: obs.count("score"),
        rank: obs.text_or_default("rank"),
        profile_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::{HttpResponse, MockTransport};
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_basic_profile_without_url() {
        let mock = MockTransport::new();
        let ctx = ctx_with(&mock);

        let Some(PlatformStats::Custom(s)) = fetch_stats(&ctx, "myjudge", "@coder_1", None).await else {
            panic!("expected basic profile");
        };
        assert_eq!(s.username, "coder_1");
        assert_eq!(s.problems_solved, 0);
        assert_eq!(s.profile_url, None);
        assert!(mock.urls().is_empty());

        assert!(fetch_stats(&ctx, "myjudge", "not a handle!", None).await.is_none());
    }

    #[tokio::test]
    async fn test_scrape_with_base_url() {
        let mock = all_missing();
        mock.push(
            "https://judge.example.org/users/coder_1",
            HttpResponse::new(
                200,
                r#"<html><head><title>coder_1 - Example Judge</title></head><body>
                   <div>Problems solved: <b>1,204</b></div><div>Rating: 1875</div>
                   <div>Rank: #42</div></body></html>"#,
            ),
        );

        let stats = fetch_stats(
            &ctx_with(&mock),
            "examplejudge",
            "coder_1",
            Some("https://judge.example.org/users/"),
        )
        .await;
        let Some(PlatformStats::Custom(s)) = stats else {
            panic!("expected stats, got {:?}", stats);
        };
        assert_eq!(s.platform, "examplejudge");
        assert_eq!(s.problems_solved, 1204);
        assert_eq!(s.rating, 1875);
        assert_eq!(s.rank, "#42");
        assert_eq!(s.display_name.as_deref(), Some("coder_1 - Example Judge"));
        assert_eq!(s.profile_url.as_deref(), Some("https://judge.example.org/users/coder_1"));
    }

    #[tokio::test]
    async fn test_template_url_and_missing_profile() {
        let mock = all_missing();
        mock.push(
            "https://judge.example.org/p/coder_1?tab=stats",
            HttpResponse::new(200, "<h1>User not found</h1>"),
        );

        let stats = fetch_stats(
            &ctx_with(&mock),
            "examplejudge",
            "coder_1",
            Some("https://judge.example.org/p/{handle}?tab=stats"),
        )
        .await;
        assert!(stats.is_none());
        assert_eq!(mock.urls(), vec!["https://judge.example.org/p/coder_1?tab=stats".to_string()]);
    }

    #[tokio::test]
    async fn test_404_and_transport_failure() {
        let missing = all_missing();
        assert!(
            fetch_stats(&ctx_with(&missing), "x", "coder_1", Some("https://judge.example.org"))
                .await
                .is_none()
        );

        let down = MockTransport::new();
        assert!(
            fetch_stats(&ctx_with(&down), "x", "coder_1", Some("https://judge.example.org"))
                .await
                .is_none()
        );
    }
}
