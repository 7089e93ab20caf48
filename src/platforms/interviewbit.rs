// InterviewBit stats, scraped; basic profile when the page gives nothing away

use once_cell::sync::Lazy;

use super::cascade::{PlatformSpec, ScrapePage};
use super::extract::{compile, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::InterviewBitStats;
use crate::models::{PlatformId, PlatformStats};

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::InterviewBit,
    handle_patterns: compile(&[r"(?i)interviewbit\.com/profile/([A-Za-z0-9_-]+)"]),
    profile_url: "https://www.interviewbit.com/profile/{handle}/",
    mirrors: vec![],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://www.interviewbit.com/profile/{handle}/",
        not_found: &["page not found", "profile not found"],
        unrated: &[],
        profile_markers: &[],
        rules: vec![
            FieldRule::count(
                "solved",
                &[
                    r"Problems Solved\s*(?:<[^>]+>\s*)*(\d+)",
                    r"(\d+)\s*(?:<[^>]+>\s*)*Problems Solved",
                ],
                0..=5_000,
            ),
            FieldRule::count("score", &[r"Score\s*(?:<[^>]+>\s*)*([\d,]+)"], 0..=10_000_000),
            FieldRule::count("global_rank", &[r"Global Rank\s*(?:<[^>]+>\s*)*#?([\d,]+)"], 1..=10_000_000),
            FieldRule::count("streak", &[r"(\d+)\s*(?:<[^>]+>\s*)*Day Streak", r"Streak\s*(?:<[^>]+>\s*)*(\d+)"], 0..=10_000),
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
    PlatformStats::InterviewBit(InterviewBitStats {
        username: handle.to_string(),
        problems_solved: obs.count("solved"),
        score: obs.count("score"),
        global_rank: obs.count("global_rank"),
        streak: obs.count("streak"),
        profile_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_scraped_profile() {
        let mock = all_missing();
        mock.push(
            "https://www.interviewbit.com/profile/sam_k/",
            HttpResponse::new(
                200,
                r#"<h2>sam_k</h2><div class="stat"><span>Score</span><b>4,210</b></div>
                   <div class="stat"><span>Global Rank</span><b>#1,532</b></div>
                   <div><b>64</b><span>Problems Solved</span></div>"#,
            ),
        );

        let Some(PlatformStats::InterviewBit(s)) = fetch_stats(&ctx_with(&mock), "sam_k").await else {
            panic!("expected stats");
        };
        assert_eq!(s.score, 4210);
        assert_eq!(s.global_rank, 1532);
        assert_eq!(s.problems_solved, 64);
    }

    #[tokio::test]
    async fn test_fallback_needs_a_plausible_handle() {
        let mock = all_missing();
        mock.push(
            "https://www.interviewbit.com/profile/sam.k/",
            HttpResponse::new(200, "<div id=\"app\">sam.k</div>"),
        );
        assert!(fetch_stats(&ctx_with(&mock), "sam.k").await.is_none());
    }
}
