// Cross-platform statistics
// Derived from linked platforms on every sync, cached on the user document

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Solved problems by difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyDistribution {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    #[default]
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl ActivityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "Low",
            ActivityLevel::Medium => "Medium",
            ActivityLevel::High => "High",
            ActivityLevel::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallRank {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl OverallRank {
    pub fn label(&self) -> &'static str {
        match self {
            OverallRank::Beginner => "Beginner",
            OverallRank::Intermediate => "Intermediate",
            OverallRank::Advanced => "Advanced",
            OverallRank::Expert => "Expert",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillsAnalysis {
    pub primary_languages: Vec<String>,
    pub difficulty_distribution: DifficultyDistribution,
    pub activity_level: ActivityLevel,
    pub overall_rank: OverallRank,
}

/// Per-platform entry of the breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformSummary {
    pub problems_solved: u32,
    pub rating: Option<u32>,
    pub max_rating: Option<u32>,
    pub contests: u32,
    pub rank: Option<String>,
    pub profile_url: Option<String>,
}

/// Aggregated stats for a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregatedStats {
    pub total_problems: u32,
    pub github_contributions: u32,
    pub contests_attended: u32,
    /// Highest peak rating across platforms, never a sum
    pub current_rating: u32,
    pub platform_breakdown: BTreeMap<String, PlatformSummary>,
    pub skills_analysis: SkillsAnalysis,
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_level_serializes_with_space() {
        let json = serde_json::to_string(&ActivityLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"Very High\"");
        assert_eq!(ActivityLevel::VeryHigh.label(), "Very High");
    }

    #[test]
    fn test_default_is_zeroed() {
        let stats = AggregatedStats::default();
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["totalProblems"], 0);
        assert_eq!(value["skillsAnalysis"]["overallRank"], "Beginner");
        assert_eq!(value["skillsAnalysis"]["activityLevel"], "Low");
    }
}
