// CodeChef stats
// Two mirror APIs, then the profile page

use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use serde_json::Value;

use super::cascade::{in_range, MirrorApi, PlatformSpec, ScrapePage};
use super::extract::{compile, json_int, json_text, parse_int, FieldRule, Observed};
use super::FetchContext;
use crate::models::platform_stats::CodeChefStats;
use crate::models::{PlatformId, PlatformStats};

const RATING: RangeInclusive<i64> = 0..=4000;
const RANK: RangeInclusive<i64> = 1..=10_000_000;
const SOLVED: RangeInclusive<i64> = 0..=20_000;
const CONTESTS: RangeInclusive<i64> = 0..=5_000;

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::CodeChef,
    handle_patterns: compile(&[r"(?i)codechef\.com/users/([A-Za-z0-9_]+)"]),
    profile_url: "https://www.codechef.com/users/{handle}",
    mirrors: vec![
        MirrorApi {
            url: "https://codechef-api.vercel.app/handle/{handle}",
            map: map_mirror,
        },
        MirrorApi {
            url: "https://cp-rating-api.vercel.app/codechef/{handle}",
            map: map_mirror,
        },
    ],
    official: None,
    scrape: Some(ScrapePage {
        url: "https://www.codechef.com/users/{handle}",
        not_found: &["user does not exist", "page not found"],
        unrated: &[],
        profile_markers: &["user-details-container"],
        rules: vec![
            FieldRule::count("rating", &[r#"class="rating-number"[^>]*>\s*(\d+)"#], RATING),
            FieldRule::count(
                "highest_rating",
                &[r"Highest Rating\s*(\d+)", r"\(Highest Rating (\d+)\)"],
                RATING,
            ),
            FieldRule::count("stars", &[r"(\d)\s*(?:&#9733;|★)"], 1..=7),
            FieldRule::count(
                "global_rank",
                &[r"(\d[\d,]*)\s*(?:</[^>]+>\s*)*Global Rank"],
                RANK,
            ),
            FieldRule::count(
                "country_rank",
                &[r"(\d[\d,]*)\s*(?:</[^>]+>\s*)*Country Rank"],
                RANK,
            ),
            FieldRule::count(
                "solved",
                &[r"Total Problems Solved:\s*(\d+)", r"Fully Solved\s*\((\d+)\)"],
                SOLVED,
            ),
            FieldRule::count(
                "contests",
                &[r"Contests Participated:\s*(?:<[^>]+>\s*)*(\d+)"],
                CONTESTS,
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
    let current = obs.count("rating");
    PlatformStats::CodeChef(CodeChefStats {
        username: handle.to_string(),
        current_rating: current,
        highest_rating: obs.count("highest_rating").max(current),
        stars: obs.count("stars"),
        global_rank: obs.count("global_rank"),
        country_rank: obs.count("country_rank"),
        problems_solved: obs.count("solved"),
        contests_participated: obs.count("contests"),
        profile_url,
    })
}

/// Both mirrors share a loose shape; keys differ in casing
fn map_mirror(v: &Value) -> Option<Observed> {
    // An implausible rating means the mirror is serving garbage; try the next source
    let rating = in_range(json_int(v, &["currentRating", "rating", "current_rating"]), &RATING)?;
    let mut obs = Observed::new();
    obs.set_int("rating", rating);
    obs.set_int_opt(
        "highest_rating",
        in_range(json_int(v, &["highestRating", "highest_rating", "max_rating"]), &RATING),
    );
    obs.set_int_opt("stars", stars(v));
    obs.set_int_opt("global_rank", in_range(json_int(v, &["globalRank", "global_rank"]), &RANK));
    obs.set_int_opt("country_rank", in_range(json_int(v, &["countryRank", "country_rank"]), &RANK));
    obs.set_int_opt(
        "solved",
        in_range(
            json_int(v, &["problemsSolved", "problems_solved", "fullySolved"]),
            &SOLVED,
        ),
    );
    if let Some(history) = v.get("ratingData").and_then(Value::as_array) {
        obs.set_int_opt("contests", in_range(Some(history.len() as i64), &CONTESTS));
    }
    Some(obs)
}

/// "4★" or 4
fn stars(v: &Value) -> Option<i64> {
    let raw = json_text(v, &["stars"])?;
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    parse_int(&digits).filter(|s| (1..=7).contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_first_mirror() {
        let mock = all_missing();
        mock.push(
            "https://codechef-api.vercel.app/handle/chef_ada",
            HttpResponse::new(
                200,
                r#"{"success":true,"currentRating":1850,"highestRating":1932,"stars":"4★",
                    "globalRank":4021,"countryRank":2011,"ratingData":[{},{},{},{},{}]}"#,
            ),
        );

        let Some(PlatformStats::CodeChef(s)) = fetch_stats(&ctx_with(&mock), "chef_ada").await else {
            panic!("expected stats");
        };
        assert_eq!(s.current_rating, 1850);
        assert_eq!(s.highest_rating, 1932);
        assert_eq!(s.stars, 4);
        assert_eq!(s.contests_participated, 5);
        assert_eq!(mock.urls().len(), 1);
    }

    #[tokio::test]
    async fn test_mirror_error_falls_through_to_second() {
        let mock = all_missing();
        mock.push(
            "https://codechef-api.vercel.app/handle/chef_ada",
            HttpResponse::new(200, r#"{"success":false}"#),
        );
        mock.push(
            "https://cp-rating-api.vercel.app/codechef/chef_ada",
            HttpResponse::new(200, r#"{"rating":1620,"stars":3}"#),
        );

        let Some(PlatformStats::CodeChef(s)) = fetch_stats(&ctx_with(&mock), "chef_ada").await else {
            panic!("expected stats");
        };
        assert_eq!(s.current_rating, 1620);
        assert_eq!(s.highest_rating, 1620);
        assert_eq!(s.stars, 3);
    }

    #[tokio::test]
    async fn test_scraped_profile() {
        let mock = all_missing();
        mock.push(
            "https://www.codechef.com/users/chef_ada",
            HttpResponse::new(
                200,
                r#"<div class="user-details-container"><h1>chef_ada</h1>
                   <div class="rating-number">1745</div>
                   <small>(Highest Rating 1801)</small>
                   <span>3&#9733;</span>
                   <li><a href="/ratings/all"><strong>5120</strong></a> Global Rank</li>
                   <h3>Total Problems Solved: 212</h3></div>"#,
            ),
        );

        let Some(PlatformStats::CodeChef(s)) = fetch_stats(&ctx_with(&mock), "chef_ada").await else {
            panic!("expected stats");
        };
        assert_eq!(s.current_rating, 1745);
        assert_eq!(s.highest_rating, 1801);
        assert_eq!(s.stars, 3);
        assert_eq!(s.global_rank, 5120);
        assert_eq!(s.problems_solved, 212);
    }

    #[tokio::test]
    async fn test_out_of_range_mirror_rating_falls_through() {
        let mock = all_missing();
        mock.push(
            "https://codechef-api.vercel.app/handle/chef_ada",
            HttpResponse::new(200, r#"{"currentRating":99999,"highestRating":99999,"stars":"7★"}"#),
        );
        mock.push(
            "https://cp-rating-api.vercel.app/codechef/chef_ada",
            HttpResponse::new(200, r#"{"rating":1620,"highest_rating":1700,"stars":3}"#),
        );

        let Some(PlatformStats::CodeChef(s)) = fetch_stats(&ctx_with(&mock), "chef_ada").await else {
            panic!("expected stats");
        };
        assert_eq!(s.current_rating, 1620);
        assert_eq!(s.highest_rating, 1700);
        assert_eq!(mock.urls().len(), 2);
    }
}
