// Username / profile URL normalization

use once_cell::sync::Lazy;
use regex::Regex;

/// Handles accepted by the basic-profile fallback
static VALID_HANDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid regex"));

/// Path prefixes left over when a partial URL is pasted
const KNOWN_PREFIXES: [&str; 5] = ["u/", "profile/", "users/", "user/", "@"];

/// Extract a clean handle from a bare handle or a profile URL.
///
/// `patterns` are tried first against the raw input; each must capture the
/// handle in group 1. When none matches, the trimmed input is treated as a
/// handle and stripped of `@`, query strings, trailing slashes and known path
/// prefixes. Returns `None` for empty input.
pub fn normalize_handle(raw: &str, patterns: &[Regex]) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let from_url = patterns.iter().find_map(|p| {
        p.captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    });

    let candidate = match from_url {
        Some(handle) => handle,
        None => strip_decorations(trimmed),
    };

    let cleaned = strip_decorations(&candidate);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn strip_decorations(input: &str) -> String {
    let mut s = input.trim();

    // Query strings and fragments never belong to a handle
    if let Some(idx) = s.find(|c: char| c == '?' || c == '#') {
        s = &s[..idx];
    }
    s = s.trim_end_matches('/');

    // Bare URL without a platform pattern: keep the last path segment
    if s.contains("://") {
        s = s.rsplit('/').next().unwrap_or(s);
    }

    let mut changed = true;
    while changed {
        changed = false;
        for prefix in KNOWN_PREFIXES {
            if let Some(rest) = s.strip_prefix(prefix) {
                s = rest;
                changed = true;
            }
        }
    }

    s.trim_matches('/').trim().to_string()
}

/// Whether a handle is plausible enough for the basic-profile fallback
pub fn is_valid_handle(handle: &str) -> bool {
    VALID_HANDLE.is_match(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::extract::compile;

    fn leetcode_patterns() -> Vec<Regex> {
        compile(&[r"(?i)leetcode\.com/(?:u/)?([A-Za-z0-9_-]+)"])
    }

    #[test]
    fn test_url_and_bare_handle_are_equivalent() {
        let patterns = leetcode_patterns();
        let inputs = [
            "https://leetcode.com/u/alice/",
            "alice",
            "u/alice",
            "@alice",
            " leetcode.com/alice?tab=submissions ",
        ];
        for input in inputs {
            assert_eq!(
                normalize_handle(input, &patterns).as_deref(),
                Some("alice"),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_unknown_url_keeps_last_segment() {
        assert_eq!(
            normalize_handle("https://judge.example.org/people/bob/", &[]).as_deref(),
            Some("bob")
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_handle("   ", &[]), None);
        assert_eq!(normalize_handle("@", &[]), None);
    }

    #[test]
    fn test_valid_handle() {
        assert!(is_valid_handle("user_01-x"));
        assert!(!is_valid_handle("bad handle"));
        assert!(!is_valid_handle("../etc"));
    }
}
