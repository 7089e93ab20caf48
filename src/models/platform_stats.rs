// Per-platform statistics
// One fixed struct per platform, stored under linkedPlatforms.<id>.stats

use serde::{Deserialize, Serialize};

use super::stats::{DifficultyDistribution, PlatformSummary};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeetCodeStats {
    pub username: String,
    pub total_solved: u32,
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    /// Global placement, not a rating
    pub ranking: u32,
    pub acceptance_rate: f64,
    pub contribution_points: u32,
    pub reputation: u32,
    pub contest_rating: u32,
    pub contests_attended: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeforcesStats {
    pub handle: String,
    pub rating: u32,
    pub max_rating: u32,
    pub rank: String,
    pub max_rank: String,
    pub contests_participated: u32,
    pub problems_solved: u32,
    pub contribution: i32,
    pub friend_of_count: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeChefStats {
    pub username: String,
    pub current_rating: u32,
    pub highest_rating: u32,
    pub stars: u32,
    pub global_rank: u32,
    pub country_rank: u32,
    pub problems_solved: u32,
    pub contests_participated: u32,
    pub profile_url: String,
}

/// Bytes of code GitHub attributes to one language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageUsage {
    pub name: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitHubStats {
    pub username: String,
    pub name: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub total_stars: u32,
    pub total_forks: u32,
    /// Contributions in the last year
    pub contributions: u32,
    /// Sorted by bytes, largest first
    pub languages: Vec<LanguageUsage>,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HackerRankStats {
    pub username: String,
    pub problems_solved: u32,
    pub badges: u32,
    pub stars: u32,
    pub badge_names: Vec<String>,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HackerEarthStats {
    pub username: String,
    pub problems_solved: u32,
    pub rating: u32,
    pub points: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeeksforGeeksStats {
    pub username: String,
    pub problems_solved: u32,
    /// GfG's own score, not comparable with contest ratings
    pub coding_score: u32,
    pub institute_rank: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AtCoderStats {
    pub username: String,
    pub rating: u32,
    pub highest_rating: u32,
    /// Global rank, or "Unrated" for users without rated contests
    pub rank: String,
    pub rated_matches: u32,
    pub problems_solved: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopCoderStats {
    pub handle: String,
    pub rating: u32,
    pub max_rating: u32,
    pub competitions: u32,
    pub challenges: u32,
    pub wins: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpojStats {
    pub username: String,
    pub problems_solved: u32,
    pub world_rank: u32,
    pub points: f64,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewBitStats {
    pub username: String,
    pub problems_solved: u32,
    pub score: u32,
    pub global_rank: u32,
    pub streak: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodingNinjasStats {
    pub username: String,
    pub problems_solved: u32,
    pub score: u32,
    pub streak: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KattisStats {
    pub username: String,
    pub score: f64,
    pub rank: u32,
    pub problems_solved: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodewarsStats {
    pub username: String,
    pub honor: u32,
    /// e.g. "4 kyu"
    pub rank_name: String,
    pub score: u32,
    pub leaderboard_position: u32,
    pub completed_katas: u32,
    pub languages: Vec<String>,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsesStats {
    pub user_id: String,
    pub problems_solved: u32,
    pub submissions: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UvaStats {
    pub username: String,
    pub user_id: u32,
    pub problems_solved: u32,
    pub submissions: u32,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitLabStats {
    pub username: String,
    pub name: Option<String>,
    pub public_projects: u32,
    pub total_stars: u32,
    pub profile_url: String,
}

/// Stats for a platform without a dedicated fetcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomStats {
    /// The enum tag already occupies `platform`
    #[serde(rename = "platformName")]
    pub platform: String,
    pub username: String,
    pub display_name: Option<String>,
    pub problems_solved: u32,
    pub rating: u32,
    pub score: u32,
    pub rank: String,
    pub profile_url: Option<String>,
}

/// Stats for any platform, tagged with the platform id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum PlatformStats {
    LeetCode(LeetCodeStats),
    Codeforces(CodeforcesStats),
    CodeChef(CodeChefStats),
    GitHub(GitHubStats),
    HackerRank(HackerRankStats),
    HackerEarth(HackerEarthStats),
    GeeksforGeeks(GeeksforGeeksStats),
    AtCoder(AtCoderStats),
    TopCoder(TopCoderStats),
    Spoj(SpojStats),
    InterviewBit(InterviewBitStats),
    CodingNinjas(CodingNinjasStats),
    Kattis(KattisStats),
    Codewars(CodewarsStats),
    Cses(CsesStats),
    Uva(UvaStats),
    GitLab(GitLabStats),
    Custom(CustomStats),
}

impl PlatformStats {
    /// Problems solved, zero for platforms without the concept
    pub fn problems_solved(&self) -> u32 {
        match self {
            PlatformStats::LeetCode(s) => s.total_solved,
            PlatformStats::Codeforces(s) => s.problems_solved,
            PlatformStats::CodeChef(s) => s.problems_solved,
            PlatformStats::HackerRank(s) => s.problems_solved,
            PlatformStats::HackerEarth(s) => s.problems_solved,
            PlatformStats::GeeksforGeeks(s) => s.problems_solved,
            PlatformStats::AtCoder(s) => s.problems_solved,
            PlatformStats::Spoj(s) => s.problems_solved,
            PlatformStats::InterviewBit(s) => s.problems_solved,
            PlatformStats::CodingNinjas(s) => s.problems_solved,
            PlatformStats::Kattis(s) => s.problems_solved,
            PlatformStats::Codewars(s) => s.completed_katas,
            PlatformStats::Cses(s) => s.problems_solved,
            PlatformStats::Uva(s) => s.problems_solved,
            PlatformStats::Custom(s) => s.problems_solved,
            PlatformStats::GitHub(_) | PlatformStats::TopCoder(_) | PlatformStats::GitLab(_) => 0,
        }
    }

    /// Peak rating on an Elo-like contest scale.
    ///
    /// Only Codeforces, CodeChef and AtCoder report one. LeetCode's ranking is
    /// a placement and GfG's coding score is a points total, neither counts.
    pub fn peak_rating(&self) -> Option<u32> {
        match self {
            PlatformStats::Codeforces(s) => Some(s.max_rating),
            PlatformStats::CodeChef(s) => Some(s.highest_rating),
            PlatformStats::AtCoder(s) => Some(s.highest_rating),
            _ => None,
        }
    }

    /// Contests attended, zero where the platform has no contests
    pub fn contests(&self) -> u32 {
        match self {
            PlatformStats::LeetCode(s) => s.contests_attended,
            PlatformStats::Codeforces(s) => s.contests_participated,
            PlatformStats::CodeChef(s) => s.contests_participated,
            PlatformStats::AtCoder(s) => s.rated_matches,
            PlatformStats::TopCoder(s) => s.competitions,
            _ => 0,
        }
    }

    pub fn github_contributions(&self) -> u32 {
        match self {
            PlatformStats::GitHub(s) => s.contributions,
            _ => 0,
        }
    }

    /// Difficulty split, only LeetCode tags problems by difficulty
    pub fn difficulty(&self) -> Option<DifficultyDistribution> {
        match self {
            PlatformStats::LeetCode(s) => Some(DifficultyDistribution {
                easy: s.easy_solved,
                medium: s.medium_solved,
                hard: s.hard_solved,
            }),
            _ => None,
        }
    }

    pub fn profile_url(&self) -> Option<&str> {
        let url = match self {
            PlatformStats::LeetCode(s) => &s.profile_url,
            PlatformStats::Codeforces(s) => &s.profile_url,
            PlatformStats::CodeChef(s) => &s.profile_url,
            PlatformStats::GitHub(s) => &s.profile_url,
            PlatformStats::HackerRank(s) => &s.profile_url,
            PlatformStats::HackerEarth(s) => &s.profile_url,
            PlatformStats::GeeksforGeeks(s) => &s.profile_url,
            PlatformStats::AtCoder(s) => &s.profile_url,
            PlatformStats::TopCoder(s) => &s.profile_url,
            PlatformStats::Spoj(s) => &s.profile_url,
            PlatformStats::InterviewBit(s) => &s.profile_url,
            PlatformStats::CodingNinjas(s) => &s.profile_url,
            PlatformStats::Kattis(s) => &s.profile_url,
            PlatformStats::Codewars(s) => &s.profile_url,
            PlatformStats::Cses(s) => &s.profile_url,
            PlatformStats::Uva(s) => &s.profile_url,
            PlatformStats::GitLab(s) => &s.profile_url,
            PlatformStats::Custom(s) => return s.profile_url.as_deref(),
        };
        Some(url.as_str())
    }

    /// Compact view for `platformBreakdown`
    pub fn summary(&self) -> PlatformSummary {
        let (rating, rank) = match self {
            PlatformStats::Codeforces(s) => (Some(s.rating), non_empty(&s.rank)),
            PlatformStats::CodeChef(s) => (
                Some(s.current_rating),
                (s.stars > 0).then(|| format!("{}★", s.stars)),
            ),
            PlatformStats::AtCoder(s) => (Some(s.rating), non_empty(&s.rank)),
            PlatformStats::TopCoder(s) => (Some(s.rating), None),
            PlatformStats::LeetCode(s) => (None, (s.ranking > 0).then(|| s.ranking.to_string())),
            PlatformStats::Codewars(s) => (None, non_empty(&s.rank_name)),
            PlatformStats::Custom(s) => ((s.rating > 0).then_some(s.rating), non_empty(&s.rank)),
            _ => (None, None),
        };

        PlatformSummary {
            problems_solved: self.problems_solved(),
            rating,
            max_rating: self.peak_rating(),
            contests: self.contests(),
            rank,
            profile_url: self.profile_url().map(str::to_string),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_with_platform_tag() {
        let stats = PlatformStats::Codeforces(CodeforcesStats {
            handle: "tourist".to_string(),
            rating: 3500,
            max_rating: 3800,
            ..Default::default()
        });
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["platform"], "codeforces");
        assert_eq!(value["maxRating"], 3800);

        let back: PlatformStats = serde_json::from_value(value).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn test_leetcode_ranking_is_not_a_rating() {
        let stats = PlatformStats::LeetCode(LeetCodeStats {
            total_solved: 300,
            ranking: 12000,
            ..Default::default()
        });
        assert_eq!(stats.peak_rating(), None);
        assert_eq!(stats.problems_solved(), 300);
    }

    #[test]
    fn test_codechef_summary_uses_stars() {
        let stats = PlatformStats::CodeChef(CodeChefStats {
            current_rating: 1850,
            highest_rating: 1900,
            stars: 4,
            ..Default::default()
        });
        let summary = stats.summary();
        assert_eq!(summary.rating, Some(1850));
        assert_eq!(summary.max_rating, Some(1900));
        assert_eq!(summary.rank.as_deref(), Some("4★"));
    }
}
