// Predefined coding platforms

use serde::{Deserialize, Serialize};

/// Platforms with a dedicated fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    LeetCode,
    Codeforces,
    CodeChef,
    GitHub,
    HackerRank,
    HackerEarth,
    GeeksforGeeks,
    AtCoder,
    TopCoder,
    Spoj,
    InterviewBit,
    CodingNinjas,
    Kattis,
    Codewars,
    Cses,
    Uva,
    GitLab,
}

impl PlatformId {
    pub const ALL: [PlatformId; 17] = [
        PlatformId::LeetCode,
        PlatformId::Codeforces,
        PlatformId::CodeChef,
        PlatformId::GitHub,
        PlatformId::HackerRank,
        PlatformId::HackerEarth,
        PlatformId::GeeksforGeeks,
        PlatformId::AtCoder,
        PlatformId::TopCoder,
        PlatformId::Spoj,
        PlatformId::InterviewBit,
        PlatformId::CodingNinjas,
        PlatformId::Kattis,
        PlatformId::Codewars,
        PlatformId::Cses,
        PlatformId::Uva,
        PlatformId::GitLab,
    ];

    /// Key used in `linkedPlatforms`
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::LeetCode => "leetcode",
            PlatformId::Codeforces => "codeforces",
            PlatformId::CodeChef => "codechef",
            PlatformId::GitHub => "github",
            PlatformId::HackerRank => "hackerrank",
            PlatformId::HackerEarth => "hackerearth",
            PlatformId::GeeksforGeeks => "geeksforgeeks",
            PlatformId::AtCoder => "atcoder",
            PlatformId::TopCoder => "topcoder",
            PlatformId::Spoj => "spoj",
            PlatformId::InterviewBit => "interviewbit",
            PlatformId::CodingNinjas => "codingninjas",
            PlatformId::Kattis => "kattis",
            PlatformId::Codewars => "codewars",
            PlatformId::Cses => "cses",
            PlatformId::Uva => "uva",
            PlatformId::GitLab => "gitlab",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlatformId::LeetCode => "LeetCode",
            PlatformId::Codeforces => "Codeforces",
            PlatformId::CodeChef => "CodeChef",
            PlatformId::GitHub => "GitHub",
            PlatformId::HackerRank => "HackerRank",
            PlatformId::HackerEarth => "HackerEarth",
            PlatformId::GeeksforGeeks => "GeeksforGeeks",
            PlatformId::AtCoder => "AtCoder",
            PlatformId::TopCoder => "TopCoder",
            PlatformId::Spoj => "SPOJ",
            PlatformId::InterviewBit => "InterviewBit",
            PlatformId::CodingNinjas => "Coding Ninjas",
            PlatformId::Kattis => "Kattis",
            PlatformId::Codewars => "Codewars",
            PlatformId::Cses => "CSES",
            PlatformId::Uva => "UVa Online Judge",
            PlatformId::GitLab => "GitLab",
        }
    }

    /// Route a stored platform key to a predefined fetcher.
    ///
    /// Case-insensitive. Any key containing "geek" goes to GeeksforGeeks,
    /// older records used several spellings for it.
    pub fn resolve(key: &str) -> Option<PlatformId> {
        let key = key.trim().to_lowercase();
        if key.contains("geek") {
            return Some(PlatformId::GeeksforGeeks);
        }
        PlatformId::ALL.iter().copied().find(|p| p.as_str() == key)
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlatformId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlatformId::resolve(s).ok_or_else(|| format!("Unknown platform: {}", s))
    }
}

/// Normalize a platform key for use as a dotted-path segment
pub fn normalize_platform_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(PlatformId::resolve("LeetCode"), Some(PlatformId::LeetCode));
        assert_eq!(PlatformId::resolve(" CODEFORCES "), Some(PlatformId::Codeforces));
        assert_eq!(PlatformId::resolve("myjudge"), None);
    }

    #[test]
    fn test_geek_keys_route_to_gfg() {
        assert_eq!(PlatformId::resolve("geeks"), Some(PlatformId::GeeksforGeeks));
        assert_eq!(PlatformId::resolve("GeeksForGeeks"), Some(PlatformId::GeeksforGeeks));
        assert_eq!(PlatformId::resolve("geek_for_geek"), Some(PlatformId::GeeksforGeeks));
    }

    #[test]
    fn test_all_ids_round_trip() {
        for p in PlatformId::ALL {
            assert_eq!(PlatformId::resolve(p.as_str()), Some(p));
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
    }

    #[test]
    fn test_normalize_platform_key() {
        assert_eq!(normalize_platform_key(" My Judge "), "my_judge");
        assert_eq!(normalize_platform_key("code-360"), "code_360");
    }
}
