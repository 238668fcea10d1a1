/*
 * Responsibility
 * - HTTP client for the Supabase backend: GoTrue token verification and
 *   admin user management, PostgREST location upsert and readiness probe
 * - Anon key for request-scoped calls, service-role key for admin calls
 */
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;
use url::Url;
use uuid::Uuid;

use crate::config::Config;

const PROBE_TABLE: &str = "_test_connection_";

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("supabase request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("supabase returned {status}: {body}")]
    Api { status: u16, body: String },
}

impl SupabaseError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// Provider-supplied message, for 4xx responses that are safe to relay.
    pub fn api_message(&self) -> Option<String> {
        match self {
            Self::Api { body, .. } => serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| {
                    v.get("msg")
                        .or_else(|| v.get("message"))
                        .or_else(|| v.get("error_description"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .or_else(|| Some(body.clone())),
            Self::Transport(_) => None,
        }
    }
}

/// Verified user identity, attached to the request for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub app_metadata: Value,
}

/// User record as returned by the GoTrue admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<AdminUser>,
    pub total: u64,
}

/// Result of the readiness probe against PostgREST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Connected,
    /// The probe table does not exist. The connection itself is fine; the
    /// environment is just not provisioned.
    SchemaMissing,
    Failed(String),
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, SupabaseError> {
        self.base_url.join(path).map_err(|e| SupabaseError::Api {
            status: 0,
            body: format!("invalid path {path}: {e}"),
        })
    }

    fn anon_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", v);
        }
        headers
    }

    fn admin_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&self.service_role_key) {
            headers.insert("apikey", v);
        }
        if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", self.service_role_key)) {
            headers.insert(AUTHORIZATION, v);
        }
        headers
    }

    async fn into_api_error(response: reqwest::Response) -> SupabaseError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        SupabaseError::Api { status, body }
    }

    /// Validate a bearer token against GoTrue and return the user it belongs
    /// to. Any failure here means the token is not acceptable; callers must
    /// not relay the provider detail to the client.
    pub async fn get_user(&self, token: &str) -> Result<Identity, SupabaseError> {
        let response = self
            .http
            .get(self.url("/auth/v1/user")?)
            .headers(self.anon_headers())
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }
        Ok(response.json::<Identity>().await?)
    }

    /// Upsert the user's location row, keyed by user id.
    pub async fn upsert_location(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
        location_type: &str,
    ) -> Result<Value, SupabaseError> {
        let mut url = self.url("/rest/v1/user_locations")?;
        url.query_pairs_mut().append_pair("on_conflict", "user_id");

        // PostGIS point, longitude first.
        let point = format!("POINT({longitude} {latitude})");

        let response = self
            .http
            .post(url)
            .headers(self.anon_headers())
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&json!({
                "user_id": user_id,
                "location": point,
                "accuracy": accuracy,
                "location_type": location_type,
                "updated_at": chrono::Utc::now().to_rfc3339(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }
        Ok(response.json::<Value>().await.unwrap_or(Value::Null))
    }

    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AdminUser, SupabaseError> {
        let response = self
            .http
            .post(self.url("/auth/v1/admin/users")?)
            .headers(self.admin_headers())
            .json(&json!({
                "email": email,
                "password": password,
                "user_metadata": { "displayName": display_name },
                "email_confirm": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }
        Ok(response.json::<AdminUser>().await?)
    }

    pub async fn list_users(&self, page: u32, limit: u32) -> Result<UserPage, SupabaseError> {
        let mut url = self.url("/auth/v1/admin/users")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &limit.to_string());

        let response = self
            .http
            .get(url)
            .headers(self.admin_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        let total = response
            .headers()
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ListBody {
            #[serde(default)]
            users: Vec<AdminUser>,
        }
        let body: ListBody = response.json().await?;
        let total = total.unwrap_or(body.users.len() as u64);

        Ok(UserPage {
            users: body.users,
            total,
        })
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<AdminUser, SupabaseError> {
        let response = self
            .http
            .get(self.url(&format!("/auth/v1/admin/users/{id}"))?)
            .headers(self.admin_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }
        Ok(response.json::<AdminUser>().await?)
    }

    pub async fn update_user_by_id(
        &self,
        id: Uuid,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<AdminUser, SupabaseError> {
        let mut update = serde_json::Map::new();
        if let Some(email) = email {
            update.insert("email".into(), json!(email));
        }
        if let Some(display_name) = display_name {
            update.insert("user_metadata".into(), json!({ "displayName": display_name }));
        }

        let response = self
            .http
            .put(self.url(&format!("/auth/v1/admin/users/{id}"))?)
            .headers(self.admin_headers())
            .json(&Value::Object(update))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }
        Ok(response.json::<AdminUser>().await?)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), SupabaseError> {
        let response = self
            .http
            .delete(self.url(&format!("/auth/v1/admin/users/{id}"))?)
            .headers(self.admin_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }
        Ok(())
    }

    /// Cheap connectivity check for the readiness endpoint. A missing probe
    /// table is reported separately so the caller can decide whether an
    /// unprovisioned schema counts as unhealthy.
    pub async fn probe(&self) -> ProbeOutcome {
        let url = match self.url(&format!("/rest/v1/{PROBE_TABLE}?select=*&limit=1")) {
            Ok(url) => url,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };

        let response = match self
            .http
            .get(url)
            .headers(self.anon_headers())
            .bearer_auth(&self.anon_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };

        if response.status().is_success() {
            return ProbeOutcome::Connected;
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        if body.contains("does not exist") || body.contains("42P01") {
            ProbeOutcome::SchemaMissing
        } else {
            error!(status, body = %body, "supabase readiness probe failed");
            ProbeOutcome::Failed(format!("supabase returned {status}"))
        }
    }
}
