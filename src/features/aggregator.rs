// Cross-platform aggregation
// Fetches every linked platform and folds the results into AggregatedStats

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::models::stats::{ActivityLevel, DifficultyDistribution, OverallRank, PlatformSummary};
use crate::models::{AggregatedStats, PlatformId, PlatformStats, SkillsAnalysis};
use crate::platforms::StatsFetcher;

// --- Thresholds ---

/// Upper bounds (exclusive) for Low, Medium and High activity
const ACTIVITY_THRESHOLDS: [u32; 3] = [50, 200, 500];

/// (problems, rating) upper bounds for Beginner, Intermediate and Advanced.
/// Both must hold for a tier.
const RANK_THRESHOLDS: [(u32, u32); 3] = [(50, 1200), (200, 1600), (500, 2000)];

const GITHUB_TOP_LANGUAGES: usize = 3;
const MAX_PRIMARY_LANGUAGES: usize = 5;

pub struct PlatformAggregator {
    fetcher: Arc<dyn StatsFetcher>,
    concurrency: usize,
}

impl PlatformAggregator {
    pub fn new(fetcher: Arc<dyn StatsFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch every predefined platform in `linked` (platform id -> username)
    /// and fold what comes back. Unknown ids are ignored, keys resolving to the
    /// same platform are fetched once, and a failing platform contributes nothing.
    pub async fn aggregate_user_stats(&self, linked: &BTreeMap<String, String>) -> AggregatedStats {
        let mut seen = HashSet::new();
        let targets: Vec<(PlatformId, &str)> = linked
            .iter()
            .filter_map(|(key, username)| {
                let username = username.trim();
                if username.is_empty() {
                    return None;
                }
                match PlatformId::resolve(key) {
                    Some(platform) => Some((platform, username)),
                    None => {
                        debug!(platform = %key, "Not a predefined platform, skipping");
                        None
                    }
                }
            })
            // Aliased keys ("gfg_old", "GeeksForGeeks") name one account; first key wins
            .filter(|(platform, _)| seen.insert(*platform))
            .collect();

        let fetched: Vec<(PlatformId, PlatformStats)> = stream::iter(targets)
            .map(|(platform, username)| async move {
                match self.fetcher.fetch(platform, username).await {
                    Ok(Some(stats)) => Some((platform, stats)),
                    Ok(None) => {
                        info!(%platform, username, "No verifiable profile");
                        None
                    }
                    Err(e) => {
                        warn!(%platform, username, error = %e, "Fetch failed, platform contributes zero");
                        None
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        let agg = fold_stats(fetched.iter().map(|(platform, stats)| (platform.as_str(), stats)));
        info!(
            platforms = agg.platform_breakdown.len(),
            total_problems = agg.total_problems,
            rating = agg.current_rating,
            activity = agg.skills_analysis.activity_level.label(),
            rank = agg.skills_analysis.overall_rank.label(),
            "Aggregated platform stats"
        );
        agg
    }
}

/// Fold per-platform stats into the aggregate.
///
/// Pure apart from the timestamp; input order does not matter.
pub fn fold_stats<'a, I>(results: I) -> AggregatedStats
where
    I: IntoIterator<Item = (&'a str, &'a PlatformStats)>,
{
    let mut results: Vec<(&str, &PlatformStats)> = results.into_iter().collect();
    results.sort_by(|a, b| a.0.cmp(b.0));

    let mut agg = AggregatedStats::default();
    let mut difficulty = DifficultyDistribution::default();
    let mut breakdown: BTreeMap<String, PlatformSummary> = BTreeMap::new();

    for (key, stats) in &results {
        agg.total_problems = agg.total_problems.saturating_add(stats.problems_solved());
        agg.github_contributions = agg
            .github_contributions
            .saturating_add(stats.github_contributions());
        agg.contests_attended = agg.contests_attended.saturating_add(stats.contests());
        if let Some(rating) = stats.peak_rating() {
            agg.current_rating = agg.current_rating.max(rating);
        }
        if let Some(d) = stats.difficulty() {
            difficulty.easy += d.easy;
            difficulty.medium += d.medium;
            difficulty.hard += d.hard;
        }
        breakdown.insert(key.to_string(), stats.summary());
    }

    agg.skills_analysis = SkillsAnalysis {
        primary_languages: primary_languages(results.iter().map(|(_, s)| *s)),
        difficulty_distribution: difficulty,
        activity_level: activity_level(
            agg.total_problems,
            agg.github_contributions,
            agg.contests_attended,
        ),
        overall_rank: overall_rank(agg.total_problems, agg.current_rating),
    };
    agg.platform_breakdown = breakdown;
    agg.last_updated = Some(Utc::now());
    agg
}

pub fn activity_level(problems: u32, contributions: u32, contests: u32) -> ActivityLevel {
    let score = problems
        .saturating_add(contributions / 10)
        .saturating_add(contests.saturating_mul(5));
    let [low, medium, high] = ACTIVITY_THRESHOLDS;
    if score < low {
        ActivityLevel::Low
    } else if score < medium {
        ActivityLevel::Medium
    } else if score < high {
        ActivityLevel::High
    } else {
        ActivityLevel::VeryHigh
    }
}

pub fn overall_rank(problems: u32, rating: u32) -> OverallRank {
    let tiers = [
        OverallRank::Beginner,
        OverallRank::Intermediate,
        OverallRank::Advanced,
    ];
    tiers
        .into_iter()
        .zip(RANK_THRESHOLDS)
        .find(|(_, (max_problems, max_rating))| problems < *max_problems && rating < *max_rating)
        .map(|(tier, _)| tier)
        .unwrap_or(OverallRank::Expert)
}

/// Top GitHub languages by bytes, then Codewars languages; case-insensitive dedupe
fn primary_languages<'a>(stats: impl Iterator<Item = &'a PlatformStats> + Clone) -> Vec<String> {
    let github = stats.clone().flat_map(|s| match s {
        PlatformStats::GitHub(gh) => gh
            .languages
            .iter()
            .take(GITHUB_TOP_LANGUAGES)
            .map(|l| l.name.clone())
            .collect(),
        _ => Vec::new(),
    });
    let codewars = stats.flat_map(|s| match s {
        PlatformStats::Codewars(cw) => cw.languages.clone(),
        _ => Vec::new(),
    });

    let mut seen = HashSet::new();
    github
        .chain(codewars)
        .filter(|name| !name.trim().is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .take(MAX_PRIMARY_LANGUAGES)
        .collect()
}
