// TopCoder stats from the v5 members API

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::Value;

use super::cascade::{fetch_json, fill_template, ApiReply, Lookup, OfficialApi, PlatformSpec, ScrapePage};
use super::extract::{as_int, compile, json_int, json_text, FieldRule, Observed};
use super::FetchContext;
use crate::api::http::HttpRequest;
use crate::models::platform_stats::TopCoderStats;
use crate::models::{PlatformId, PlatformStats};

const API_BASE: &str = "https://api.topcoder.com/v5/members";

pub static SPEC: Lazy<PlatformSpec> = Lazy::new(|| PlatformSpec {
    platform: PlatformId::TopCoder,
    handle_patterns: compile(&[
        r"(?i)topcoder\.com/members/([A-Za-z0-9_.-]+)",
        r"(?i)profiles\.topcoder\.com/([A-Za-z0-9_.-]+)",
    ]),
    profile_url: "https://profiles.topcoder.com/{handle}",
    mirrors: vec![],
    official: Some(Box::new(MembersApi)),
    scrape: Some(ScrapePage {
        url: "https://profiles.topcoder.com/{handle}",
        not_found: &["member not found", "page not found"],
        unrated: &[],
        profile_markers: &[],
        rules: vec![
            FieldRule::count("rating", &[r"Rating\s*(?:<[^>]+>\s*)*(\d+)"], 0..=4000),
            FieldRule::count("wins", &[r"(\d+)\s*(?:<[^>]+>\s*)*Wins"], 0..=10_000),
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
    PlatformStats::TopCoder(TopCoderStats {
        handle: obs.text("handle").unwrap_or(handle).to_string(),
        rating,
        max_rating: obs.count("max_rating").max(rating),
        competitions: obs.count("competitions"),
        challenges: obs.count("challenges"),
        wins: obs.count("wins"),
        profile_url,
    })
}

struct MembersApi;

#[async_trait]
impl OfficialApi for MembersApi {
    async fn lookup(&self, ctx: &FetchContext, handle: &str) -> Lookup {
        let member_url = fill_template(&format!("{}/{{handle}}", API_BASE), handle);
        let member = match fetch_json(ctx, HttpRequest::api(member_url, ctx.timeouts.official)).await {
            ApiReply::Json(json) if json.is_object() => json,
            ApiReply::Json(_) | ApiReply::Unavailable => return Lookup::Unavailable,
            ApiReply::NotFound => return Lookup::NotFound,
        };

        let mut obs = Observed::new();
        obs.set_text_opt("handle", json_text(&member, &["handle"]));
        obs.set_int_opt(
            "max_rating",
            member.get("maxRating").and_then(|m| json_int(m, &["rating"])),
        );

        let stats_url = fill_template(&format!("{}/{{handle}}/stats", API_BASE), handle);
        if let ApiReply::Json(stats) =
            fetch_json(ctx, HttpRequest::api(stats_url, ctx.timeouts.official)).await
        {
            read_stats(&stats, &mut obs);
        }
        Lookup::Found(obs)
    }
}

/// `/stats` is an array with one entry per group; the public one comes first
fn read_stats(stats: &Value, obs: &mut Observed) {
    let Some(entry) = stats.as_array().and_then(|a| a.first()) else {
        return;
    };
    obs.set_int_opt("challenges", json_int(entry, &["challenges"]));
    obs.set_int_opt("wins", json_int(entry, &["wins"]));

    let srm = entry
        .pointer("/DATA_SCIENCE/SRM/rank")
        .filter(|r| r.is_object());
    if let Some(rank) = srm {
        obs.set_int_opt("rating", rank.get("rating").and_then(as_int));
        obs.set_int_opt("competitions", rank.get("competitions").and_then(as_int));
        if !obs.has("max_rating") {
            obs.set_int_opt("max_rating", rank.get("maximumRating").and_then(as_int));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpResponse;
    use crate::platforms::testing::*;

    #[tokio::test]
    async fn test_member_and_stats() {
        let mock = all_missing();
        mock.push(
            "https://api.topcoder.com/v5/members/Petr",
            HttpResponse::new(200, r#"{"handle":"Petr","maxRating":{"rating":3860}}"#),
        );
        mock.push(
            "https://api.topcoder.com/v5/members/Petr/stats",
            HttpResponse::new(
                200,
                r#"[{"challenges":310,"wins":75,
                     "DATA_SCIENCE":{"SRM":{"rank":{"rating":3520,"competitions":290,"maximumRating":3860}}}}]"#,
            ),
        );

        let Some(PlatformStats::TopCoder(s)) = fetch_stats(&ctx_with(&mock), "Petr").await else {
            panic!("expected stats");
        };
        assert_eq!(s.rating, 3520);
        assert_eq!(s.max_rating, 3860);
        assert_eq!(s.competitions, 290);
        assert_eq!(s.wins, 75);
    }

    #[tokio::test]
    async fn test_member_without_stats() {
        let mock = all_missing();
        mock.push(
            "https://api.topcoder.com/v5/members/newcomer",
            HttpResponse::new(200, r#"{"handle":"newcomer"}"#),
        );

        let Some(PlatformStats::TopCoder(s)) = fetch_stats(&ctx_with(&mock), "newcomer").await else {
            panic!("expected stats");
        };
        assert_eq!(s.rating, 0);
        assert_eq!(s.competitions, 0);
    }
}
