// Field extraction helpers
// Regex cascades for HTML pages and tolerant readers for mirror JSON

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

/// A value observed on a remote source
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    /// Names with a weight, e.g. bytes per language
    Weighted(Vec<(String, u64)>),
}

/// Everything one source yielded for one profile.
///
/// Builders read fields with zero/empty defaults, so a missing field can only
/// ever become zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observed {
    fields: BTreeMap<&'static str, FieldValue>,
    unrated: bool,
}

impl Observed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile exists but has never been rated
    pub fn unrated() -> Self {
        Self {
            fields: BTreeMap::new(),
            unrated: true,
        }
    }

    pub fn is_unrated(&self) -> bool {
        self.unrated
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn set(&mut self, field: &'static str, value: FieldValue) {
        self.fields.insert(field, value);
    }

    pub fn set_int(&mut self, field: &'static str, value: i64) {
        self.set(field, FieldValue::Int(value));
    }

    pub fn set_text(&mut self, field: &'static str, value: impl Into<String>) {
        self.set(field, FieldValue::Text(value.into()));
    }

    pub fn set_list(&mut self, field: &'static str, value: Vec<String>) {
        self.set(field, FieldValue::List(value));
    }

    pub fn set_weighted(&mut self, field: &'static str, value: Vec<(String, u64)>) {
        self.set(field, FieldValue::Weighted(value));
    }

    /// Set only when the source actually had a value
    pub fn set_int_opt(&mut self, field: &'static str, value: Option<i64>) {
        if let Some(v) = value {
            self.set_int(field, v);
        }
    }

    pub fn set_float_opt(&mut self, field: &'static str, value: Option<f64>) {
        if let Some(v) = value {
            self.set(field, FieldValue::Float(v));
        }
    }

    pub fn set_text_opt(&mut self, field: &'static str, value: Option<String>) {
        if let Some(v) = value.filter(|s| !s.trim().is_empty()) {
            self.set_text(field, v);
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Non-negative count, zero when absent
    pub fn count(&self, field: &str) -> u32 {
        match self.fields.get(field) {
            Some(FieldValue::Int(v)) => (*v).clamp(0, u32::MAX as i64) as u32,
            Some(FieldValue::Float(v)) if *v > 0.0 => v.round().min(u32::MAX as f64) as u32,
            _ => 0,
        }
    }

    pub fn signed(&self, field: &str) -> i32 {
        match self.fields.get(field) {
            Some(FieldValue::Int(v)) => (*v).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            Some(FieldValue::Float(v)) => v.round() as i32,
            _ => 0,
        }
    }

    pub fn float(&self, field: &str) -> f64 {
        match self.fields.get(field) {
            Some(FieldValue::Float(v)) => *v,
            Some(FieldValue::Int(v)) => *v as f64,
            _ => 0.0,
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn text_or_default(&self, field: &str) -> String {
        self.text(field).unwrap_or_default().to_string()
    }

    pub fn list(&self, field: &str) -> Vec<String> {
        match self.fields.get(field) {
            Some(FieldValue::List(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub fn weighted(&self, field: &str) -> Vec<(String, u64)> {
        match self.fields.get(field) {
            Some(FieldValue::Weighted(items)) => items.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Whole number within a plausible range
    Count(RangeInclusive<i64>),
    /// Decimal within a plausible range
    Decimal(RangeInclusive<f64>),
    Text,
}

/// Ordered regex candidates for one field; the first in-range match wins
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub patterns: Vec<Regex>,
    pub kind: FieldKind,
}

impl FieldRule {
    pub fn count(field: &'static str, patterns: &[&str], range: RangeInclusive<i64>) -> Self {
        Self {
            field,
            patterns: compile(patterns),
            kind: FieldKind::Count(range),
        }
    }

    pub fn decimal(field: &'static str, patterns: &[&str], range: RangeInclusive<f64>) -> Self {
        Self {
            field,
            patterns: compile(patterns),
            kind: FieldKind::Decimal(range),
        }
    }

    pub fn text(field: &'static str, patterns: &[&str]) -> Self {
        Self {
            field,
            patterns: compile(patterns),
            kind: FieldKind::Text,
        }
    }

    /// Try each pattern in order; a match outside the range falls through
    pub fn extract(&self, haystack: &str) -> Option<FieldValue> {
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(haystack) {
                let Some(raw) = caps.get(1).map(|m| m.as_str().trim()) else {
                    continue;
                };
                let accepted = match &self.kind {
                    FieldKind::Count(range) => parse_int(raw)
                        .filter(|v| range.contains(v))
                        .map(FieldValue::Int),
                    FieldKind::Decimal(range) => parse_float(raw)
                        .filter(|v| range.contains(v))
                        .map(FieldValue::Float),
                    FieldKind::Text => {
                        let decoded = html_escape::decode_html_entities(raw).trim().to_string();
                        (!decoded.is_empty()).then_some(FieldValue::Text(decoded))
                    }
                };
                if accepted.is_some() {
                    return accepted;
                }
            }
        }
        None
    }
}

/// Compile a static pattern table.
///
/// Patterns are compile-time constants of this crate; an invalid one is a bug
/// that every test touching the platform would surface.
pub fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid pattern {p:?}: {e}")))
        .collect()
}

/// Run every rule against the page
pub fn extract_all(rules: &[FieldRule], haystack: &str) -> Observed {
    let mut observed = Observed::new();
    for rule in rules {
        if let Some(value) = rule.extract(haystack) {
            observed.set(rule.field, value);
        }
    }
    observed
}

/// Integer with thousands separators tolerated ("1,234")
pub fn parse_int(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != ' ').collect();
    cleaned.parse::<i64>().ok()
}

pub fn parse_float(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != ' ').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Case-insensitive marker search
pub fn contains_any(haystack_lower: &str, markers: &[&str]) -> bool {
    markers
        .iter()
        .any(|m| haystack_lower.contains(&m.to_lowercase()))
}

/// Page text with tags stripped, whitespace collapsed
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let text: Vec<&str> = doc
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect();
    text.join(" ")
}

/// Contents of `<title>`, falling back to `og:title`
pub fn page_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| doc.select(&sel).next().map(|t| t.text().collect::<String>()))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if title.is_some() {
        return title;
    }
    Selector::parse(r#"meta[property="og:title"]"#)
        .ok()
        .and_then(|sel| doc.select(&sel).next()?.value().attr("content").map(str::to_string))
        .filter(|t| !t.trim().is_empty())
}

// ============ JSON readers ============

/// First present numeric field among `keys`, accepting numeric strings
pub fn json_int(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|k| as_int(value.get(*k)?))
}

pub fn json_float(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| {
        let v = value.get(*k)?;
        v.as_f64().or_else(|| v.as_str().and_then(parse_float))
    })
}

pub fn json_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        let v = value.get(*k)?;
        match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}

pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => parse_int(s.trim()),
        _ => None,
    }
}

/// Explicit failure markers used by mirror APIs
pub fn json_reports_error(value: &Value) -> bool {
    let has_error = value
        .get("error")
        .map(|e| !e.is_null() && e != &Value::Bool(false))
        .unwrap_or(false);
    let success_false = value.get("success") == Some(&Value::Bool(false));
    let status_error = value
        .get("status")
        .and_then(|s| s.as_str())
        .map(|s| matches!(s.to_lowercase().as_str(), "error" | "failed" | "fail"))
        .unwrap_or(false);
    has_error || success_false || status_error
}
