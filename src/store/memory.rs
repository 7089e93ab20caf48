// In-process user store
// Documents live as JSON; each update holds the shard lock for the whole write set

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{FieldUpdates, StoreError, UserStore};
use crate::models::User;

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    docs: DashMap<String, Value>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a raw user document
    pub fn insert(&self, user_id: &str, doc: Value) {
        self.docs.insert(user_id.to_string(), doc);
    }

    /// Raw document snapshot
    pub fn document(&self, user_id: &str) -> Option<Value> {
        self.docs.get(user_id).map(|d| d.value().clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let Some(doc) = self.document(user_id) else {
            return Ok(None);
        };
        let mut user: User = serde_json::from_value(doc)?;
        if user.id.is_empty() {
            user.id = user_id.to_string();
        }
        Ok(Some(user))
    }

    async fn update(&self, user_id: &str, updates: FieldUpdates) -> Result<(), StoreError> {
        let mut doc = self
            .docs
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        updates.apply_to(doc.value_mut());
        Ok(())
    }
}
