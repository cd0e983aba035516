//! Supabase REST adapter - the primary tier
//!
//! Talks to PostgREST at `<SUPABASE_URL>/rest/v1`. Every call that takes a
//! user id checks the UUID format first and returns a validation error
//! without touching the network if it is malformed.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SupabaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::intent::QueryIntent;
use crate::models::{ensure_uuid, Favorite, Profile, ProfileUpdate, QueryResult, ValidationError};
use crate::redact::user_tag;
use crate::store::{FavoritesStore, Tier};

const FAVORITES: &str = "favorites";
const PROFILES: &str = "profiles";

/// Error bodies are cut to this many chars before they reach a log line
const MAX_ERROR_BODY: usize = 200;

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("invalid table name regex"));

/// Subset of the PostgREST error body
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
}

pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            key: config.key.clone(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    /// All favorites for `user_id`, oldest first.
    pub async fn get_favorites(&self, user_id: &str) -> StoreResult<Vec<Favorite>> {
        ensure_uuid(user_id)?;

        let response = self
            .request(Method::GET, FAVORITES)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "id.asc".to_string()),
            ])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn add_favorite(
        &self,
        user_id: &str,
        prompt: &str,
        categories: &[String],
    ) -> StoreResult<Favorite> {
        ensure_uuid(user_id)?;

        let response = self
            .request(Method::POST, FAVORITES)
            .header("Prefer", "return=representation")
            .json(&json!({
                "user_id": user_id,
                "prompt": prompt,
                "categories": categories,
            }))
            .send()
            .await?;

        let rows: Vec<Favorite> = check(response).await?.json().await?;
        let favorite = rows.into_iter().next().ok_or_else(|| StoreError::Api {
            status: 200,
            message: "insert returned no rows".to_string(),
        })?;

        tracing::info!(user = %user_tag(user_id), id = favorite.id, "supabase: favorite added");
        Ok(favorite)
    }

    /// Delete favorite `id` only if it belongs to `user_id`.
    pub async fn remove_favorite(&self, id: i64, user_id: &str) -> StoreResult<u64> {
        ensure_uuid(user_id)?;

        // Both filters are required: a guessed id alone must not delete
        // another user's row.
        let response = self
            .request(Method::DELETE, FAVORITES)
            .header("Prefer", "return=representation")
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", user_id)),
                ("select", "id".to_string()),
            ])
            .send()
            .await?;

        let deleted: Vec<Value> = check(response).await?.json().await?;
        tracing::info!(user = %user_tag(user_id), id, removed = deleted.len(), "supabase: favorite delete");
        Ok(deleted.len() as u64)
    }

    pub async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<Profile>> {
        ensure_uuid(id)?;

        let response = self
            .request(Method::GET, PROFILES)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))])
            .send()
            .await?;

        let rows: Vec<Profile> = check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    pub async fn update_user_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> StoreResult<Option<Profile>> {
        ensure_uuid(id)?;
        if update.is_empty() {
            return self.get_user_by_id(id).await;
        }

        let mut body = serde_json::to_value(update)?;
        if let Value::Object(map) = &mut body {
            map.insert("updated_at".into(), json!(chrono::Utc::now()));
        }

        let response = self
            .request(Method::PATCH, PROFILES)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .json(&body)
            .send()
            .await?;

        let rows: Vec<Profile> = check(response).await?.json().await?;
        tracing::info!(user = %user_tag(id), "supabase: profile updated");
        Ok(rows.into_iter().next())
    }

    /// Whether `table` is exposed through the REST API.
    async fn table_exists(&self, table: &str) -> StoreResult<bool> {
        if !TABLE_NAME_RE.is_match(table) {
            return Err(ValidationError::InvalidParameter {
                index: 0,
                expected: "a table name",
            }
            .into());
        }

        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*"), ("limit", "0")])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(response).await?;
        Ok(true)
    }
}

/// Turn a non-2xx response into `StoreError::Api`.
async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(ApiErrorBody {
            message: Some(message),
            code,
        }) => match code {
            Some(code) => format!("{} ({})", message, code),
            None => message,
        },
        _ => body,
    };

    Err(StoreError::Api {
        status: status.as_u16(),
        message: message.chars().take(MAX_ERROR_BODY).collect(),
    })
}

#[async_trait]
impl FavoritesStore for SupabaseStore {
    fn tier(&self) -> Tier {
        Tier::Primary
    }

    async fn probe(&self) -> StoreResult<()> {
        let response = self
            .request(Method::GET, FAVORITES)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn execute(&self, intent: &QueryIntent) -> StoreResult<QueryResult> {
        match intent {
            QueryIntent::InsertFavorite {
                user_id,
                prompt,
                categories,
            } => Ok(QueryResult::inserted(
                self.add_favorite(user_id, prompt, categories).await?,
            )),
            QueryIntent::SelectByUser { user_id } => {
                Ok(QueryResult::selected(self.get_favorites(user_id).await?))
            }
            QueryIntent::DeleteById { id, user_id } => {
                Ok(QueryResult::deleted(self.remove_favorite(*id, user_id).await?))
            }
            QueryIntent::TableExists { table } => {
                Ok(QueryResult::exists(self.table_exists(table).await?))
            }
        }
    }

    async fn get_profile(&self, id: &str) -> StoreResult<Option<Profile>> {
        self.get_user_by_id(id).await
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<Option<Profile>> {
        self.update_user_profile(id, update).await
    }
}
