// User persistence boundary
// The sync service only needs get-by-id and targeted nested-path writes

pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::User;

pub use memory::MemoryUserStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("invalid user document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One write against a dotted field path
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    Set(Value),
    /// Remove the field entirely
    Delete,
}

/// A set of dotted-path writes applied atomically to one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    writes: Vec<(String, FieldWrite)>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<String>, value: Value) -> Self {
        self.writes.push((path.into(), FieldWrite::Set(value)));
        self
    }

    pub fn delete(mut self, path: impl Into<String>) -> Self {
        self.writes.push((path.into(), FieldWrite::Delete));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[(String, FieldWrite)] {
        &self.writes
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(p, _)| p.as_str())
    }

    /// Apply the writes to an in-memory JSON document
    pub fn apply_to(&self, doc: &mut Value) {
        for (path, write) in &self.writes {
            apply_one(doc, path, write);
        }
    }

    /// Nested object containing only the `Set` values, keyed by path segments
    pub fn nested_body(&self) -> Value {
        let mut body = Value::Object(Map::new());
        for (path, write) in &self.writes {
            if let FieldWrite::Set(_) = write {
                apply_one(&mut body, path, write);
            }
        }
        body
    }
}

fn apply_one(doc: &mut Value, path: &str, write: &FieldWrite) {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = doc;
    for segment in parents {
        if !current.is_object() {
            if matches!(write, FieldWrite::Delete) {
                return;
            }
            *current = Value::Object(Map::new());
        }
        let Some(obj) = current.as_object_mut() else {
            return;
        };
        current = obj
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        if matches!(write, FieldWrite::Delete) {
            return;
        }
        *current = Value::Object(Map::new());
    }
    if let Some(obj) = current.as_object_mut() {
        match write {
            FieldWrite::Set(value) => {
                obj.insert(last.to_string(), value.clone());
            }
            FieldWrite::Delete => {
                obj.remove(*last);
            }
        }
    }
}

/// User lookup and nested-field updates.
///
/// `update` must apply the whole `FieldUpdates` atomically and must not touch
/// fields outside the listed paths; concurrent platform writes for one user
/// target disjoint paths and rely on this.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn update(&self, user_id: &str, updates: FieldUpdates) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_creates_intermediate_maps() {
        let mut doc = json!({ "name": "alice" });
        FieldUpdates::new()
            .set("linkedPlatforms.codeforces.stats", json!({ "rating": 1500 }))
            .apply_to(&mut doc);
        assert_eq!(doc["linkedPlatforms"]["codeforces"]["stats"]["rating"], 1500);
        assert_eq!(doc["name"], "alice");
    }

    #[test]
    fn test_set_null_keeps_key() {
        let mut doc = json!({ "a": { "stats": { "rating": 1 } } });
        FieldUpdates::new().set("a.stats", Value::Null).apply_to(&mut doc);
        assert!(doc["a"].as_object().unwrap().contains_key("stats"));
        assert!(doc["a"]["stats"].is_null());
    }

    #[test]
    fn test_delete_removes_key_and_ignores_missing() {
        let mut doc = json!({ "linkedPlatforms": { "leetcode": {}, "github": {} } });
        FieldUpdates::new()
            .delete("linkedPlatforms.leetcode")
            .delete("missing.path")
            .apply_to(&mut doc);
        assert_eq!(doc, json!({ "linkedPlatforms": { "github": {} } }));
    }

    #[test]
    fn test_nested_body_skips_deletes() {
        let updates = FieldUpdates::new()
            .set("linkedPlatforms.cf.lastSync", json!("2026-01-01T00:00:00Z"))
            .set("linkedPlatforms.cf.stats", Value::Null)
            .delete("linkedPlatforms.lc");
        assert_eq!(
            updates.nested_body(),
            json!({ "linkedPlatforms": { "cf": { "lastSync": "2026-01-01T00:00:00Z", "stats": null } } })
        );
        assert_eq!(updates.paths().count(), 3);
    }
}
