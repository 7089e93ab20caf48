// Firebase Firestore REST API client
// Using service account JWT authentication

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::models::User;
use crate::store::{FieldUpdates, StoreError, UserStore};
use crate::utils::config::USERS_COLLECTION;

/// Firebase service account credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub private_key: String,
    pub client_email: String,
}

/// JWT claims for Google OAuth2
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    sub: String,
    aud: String,
    iat: u64,
    exp: u64,
    scope: String,
}

/// Cached access token
struct CachedToken {
    token: String,
    expires_at: u64,
}

/// Firebase REST API client
pub struct FirebaseClient {
    client: Client,
    service_account: ServiceAccount,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl FirebaseClient {
    /// Create a new Firebase client from service account JSON file
    pub fn from_file(client: Client, path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let service_account: ServiceAccount = serde_json::from_str(&content)?;

        Ok(Self {
            client,
            service_account,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Get access token (with caching)
    async fn get_access_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                // Return cached token if still valid (with 60s buffer)
                if cached.expires_at > now_secs() + 60 {
                    return Ok(cached.token.clone());
                }
            }
        }

        let token = self.generate_access_token().await?;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at: now_secs() + 3600, // 1 hour
            });
        }

        Ok(token)
    }

    /// Generate a new access token using JWT
    async fn generate_access_token(&self) -> Result<String> {
        let now = now_secs();

        let claims = Claims {
            iss: self.service_account.client_email.clone(),
            sub: self.service_account.client_email.clone(),
            aud: "https://oauth2.googleapis.com/token".to_string(),
            iat: now,
            exp: now + 3600,
            scope: "https://www.googleapis.com/auth/datastore".to_string(),
        };

        let key = EncodingKey::from_rsa_pem(self.service_account.private_key.as_bytes())?;
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        // Exchange JWT for access token
        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await?;
            error!("Failed to get access token: {}", body);
            return Err(anyhow!("Failed to get access token"));
        }

        let data: Value = response.json().await?;
        let token = data["access_token"]
            .as_str()
            .ok_or_else(|| anyhow!("No access_token in response"))?;

        Ok(token.to_string())
    }

    /// Base URL for Firestore REST API
    fn base_url(&self) -> String {
        format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
            self.service_account.project_id
        )
    }

    /// Get a document by path
    pub async fn get_document(&self, collection: &str, doc_id: &str) -> Result<Option<Value>> {
        let token = self.get_access_token().await?;
        let url = format!("{}/{}/{}", self.base_url(), collection, doc_id);

        let response = self.client.get(&url).bearer_auth(&token).send().await?;

        if response.status() == 404 {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            debug!("Firebase error: {}", body);
            return Err(anyhow!("Firebase error: {}", status));
        }

        let doc: Value = response.json().await?;
        Ok(Some(from_firestore_document(&doc)))
    }

    /// Patch nested fields of an existing document.
    ///
    /// Every path goes into `updateMask`; paths absent from the body are
    /// deleted by Firestore, which is how `FieldWrite::Delete` is expressed.
    pub async fn update_fields(
        &self,
        collection: &str,
        doc_id: &str,
        updates: &FieldUpdates,
    ) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let token = self.get_access_token().await?;

        let url = format!(
            "{}/{}/{}?{}",
            self.base_url(),
            collection,
            doc_id,
            update_mask_query(updates)
        );

        let firestore_doc = to_firestore_document(&updates.nested_body());

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&token)
            .json(&firestore_doc)
            .send()
            .await?;

        if response.status() == 404 {
            return Err(anyhow!("Document {}/{} does not exist", collection, doc_id));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            debug!("Firebase error: {}", body);
            return Err(anyhow!("Firebase error: {}", status));
        }

        Ok(())
    }
}

#[async_trait]
impl UserStore for FirebaseClient {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let doc = self
            .get_document(USERS_COLLECTION, user_id)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let Some(doc) = doc else {
            return Ok(None);
        };
        let mut user: User = serde_json::from_value(doc)?;
        user.id = user_id.to_string();
        Ok(Some(user))
    }

    async fn update(&self, user_id: &str, updates: FieldUpdates) -> Result<(), StoreError> {
        self.update_fields(USERS_COLLECTION, user_id, &updates)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Query string for a PATCH: mask every path, refuse to create new documents
fn update_mask_query(updates: &FieldUpdates) -> String {
    let mut parts: Vec<String> = updates
        .paths()
        .map(|p| {
            format!(
                "updateMask.fieldPaths={}",
                urlencoding::encode(&quote_field_path(p))
            )
        })
        .collect();
    parts.push("currentDocument.exists=true".to_string());
    parts.join("&")
}

/// Backtick-quote segments that are not simple identifiers
fn quote_field_path(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            let simple = segment
                .chars()
                .next()
                .map(|c| c.is_ascii_alphabetic() || c == '_')
                .unwrap_or(false)
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if simple {
                segment.to_string()
            } else {
                format!("`{}`", segment.replace('`', "\\`"))
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Convert Firestore document to regular JSON
fn from_firestore_document(doc: &Value) -> Value {
    if let Some(fields) = doc.get("fields") {
        from_firestore_value(&json!({ "mapValue": { "fields": fields } }))
    } else {
        Value::Null
    }
}

/// Convert Firestore value to regular JSON value
fn from_firestore_value(value: &Value) -> Value {
    if let Some(s) = value.get("stringValue") {
        return s.clone();
    }
    if let Some(n) = value.get("integerValue") {
        if let Some(s) = n.as_str() {
            return Value::Number(s.parse().unwrap_or(0.into()));
        }
        return n.clone();
    }
    if let Some(n) = value.get("doubleValue") {
        return n.clone();
    }
    if let Some(b) = value.get("booleanValue") {
        return b.clone();
    }
    if let Some(ts) = value.get("timestampValue") {
        return ts.clone();
    }
    if value.get("nullValue").is_some() {
        return Value::Null;
    }
    if let Some(arr) = value.get("arrayValue") {
        let values = arr
            .get("values")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().map(from_firestore_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(map) = value.get("mapValue") {
        let obj: serde_json::Map<String, Value> = map
            .get("fields")
            .and_then(|f| f.as_object())
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), from_firestore_value(v)))
                    .collect()
            })
            .unwrap_or_default();
        return Value::Object(obj);
    }
    Value::Null
}

/// Convert regular JSON to Firestore document format
fn to_firestore_document(data: &Value) -> Value {
    json!({
        "fields": to_firestore_fields(data)
    })
}

/// Convert JSON object to Firestore fields
fn to_firestore_fields(data: &Value) -> Value {
    if let Some(obj) = data.as_object() {
        let fields: serde_json::Map<String, Value> = obj
            .iter()
            .map(|(k, v)| (k.clone(), to_firestore_value(v)))
            .collect();
        Value::Object(fields)
    } else {
        json!({})
    }
}

/// Convert JSON value to Firestore value format
fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::String(s) => json!({ "stringValue": s }),
        Value::Number(n) => {
            if n.is_f64() {
                json!({ "doubleValue": n })
            } else {
                json!({ "integerValue": n.to_string() })
            }
        }
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Array(arr) => {
            let values: Vec<Value> = arr.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(obj) => {
            let fields: serde_json::Map<String, Value> = obj
                .iter()
                .map(|(k, v)| (k.clone(), to_firestore_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
        Value::Null => json!({ "nullValue": null }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_mask_lists_every_path() {
        let updates = FieldUpdates::new()
            .set("linkedPlatforms.codeforces.stats", Value::Null)
            .delete("linkedPlatforms.leetcode");
        let query = update_mask_query(&updates);
        assert_eq!(
            query,
            "updateMask.fieldPaths=linkedPlatforms.codeforces.stats\
             &updateMask.fieldPaths=linkedPlatforms.leetcode\
             &currentDocument.exists=true"
        );
    }

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("linkedPlatforms.github"), "linkedPlatforms.github");
        assert_eq!(quote_field_path("linkedPlatforms.360judge"), "linkedPlatforms.`360judge`");
    }

    #[test]
    fn test_firestore_round_trip_keeps_nulls_and_nesting() {
        let data = json!({
            "linkedPlatforms": {
                "codeforces": { "lastSync": "2026-01-01T00:00:00Z", "stats": null, "rating": 1500 }
            }
        });
        let doc = to_firestore_document(&data);
        assert_eq!(
            doc["fields"]["linkedPlatforms"]["mapValue"]["fields"]["codeforces"]["mapValue"]["fields"]
                ["rating"]["integerValue"],
            "1500"
        );
        assert_eq!(from_firestore_document(&doc), data);
    }

    #[test]
    fn test_empty_array_and_map_decode() {
        let value = json!({ "arrayValue": {} });
        assert_eq!(from_firestore_value(&value), json!([]));
        let value = json!({ "mapValue": {} });
        assert_eq!(from_firestore_value(&value), json!({}));
    }
}
