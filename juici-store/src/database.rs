//! Unified query facade over the storage tiers
//!
//! ```text
//! caller ──► guard ──► Supabase ──(fail)──► Postgres ──(fail)──► memory
//!                        │ timeout            │ timeout            │
//!                        └──── QueryResult { rows, rowCount, command } ◄┘
//! ```
//!
//! Tiers are tried in order. A validation error stops the walk and goes
//! straight back to the caller; timeouts and backend errors are logged and
//! the next tier is tried. The memory tier is always last and never fails,
//! so callers get a result whenever their input is valid.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::connectivity::{Connectivity, TierStatus};
use crate::error::{StoreError, StoreResult};
use crate::guard;
use crate::intent::QueryIntent;
use crate::memory::MemoryStore;
use crate::models::{Favorite, Profile, ProfileUpdate, QueryResult};
use crate::postgres::PostgresStore;
use crate::redact::user_tag;
use crate::store::{FavoritesStore, Tier};
use crate::supabase::SupabaseStore;

#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

struct DatabaseInner {
    stores: Vec<Arc<dyn FavoritesStore>>,
    connectivity: Arc<Connectivity>,
    request_timeout: Duration,
}

impl Database {
    /// Build the tier chain from `config` and start probing in the
    /// background.
    ///
    /// Tiers whose configuration is missing or unusable are left out. The
    /// memory tier is always present. Zero timeouts or pool sizes are
    /// replaced with defaults.
    pub async fn connect(config: &StoreConfig) -> Self {
        let config = &config.clone().normalized();
        let mut stores: Vec<Arc<dyn FavoritesStore>> = Vec::new();

        match &config.supabase {
            Some(supabase) => match SupabaseStore::new(supabase, config.request_timeout()) {
                Ok(store) => stores.push(Arc::new(store)),
                Err(e) => tracing::warn!(error = %e, "supabase client unavailable, skipping tier"),
            },
            None => tracing::info!("supabase not configured"),
        }

        match &config.database_url {
            Some(url) => match PostgresStore::new(url, config) {
                Ok(store) => stores.push(Arc::new(store)),
                // sqlx URL errors can echo the URL, so log the tier only
                Err(_) => tracing::warn!("DATABASE_URL is invalid, skipping postgres tier"),
            },
            None => tracing::info!("DATABASE_URL not configured"),
        }

        let memory = MemoryStore::open(&config.data_file).await;
        tracing::info!(path = %memory.path().display(), "memory tier ready");
        stores.push(Arc::new(memory));

        let db = Self::from_stores(
            stores,
            Arc::new(Connectivity::new(config.reprobe_after())),
            config.request_timeout(),
        );

        let probe = db.clone();
        tokio::spawn(async move {
            probe.probe().await;
        });

        db
    }

    /// Assemble a facade from explicit stores, in preference order.
    pub fn from_stores(
        stores: Vec<Arc<dyn FavoritesStore>>,
        connectivity: Arc<Connectivity>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                stores,
                connectivity,
                request_timeout,
            }),
        }
    }

    /// Shared health state. Tests and operators can pin a tier with
    /// [`Connectivity::force`].
    pub fn connectivity(&self) -> &Arc<Connectivity> {
        &self.inner.connectivity
    }

    pub fn tiers(&self) -> Vec<Tier> {
        self.inner.stores.iter().map(|s| s.tier()).collect()
    }

    pub fn status(&self) -> Vec<TierStatus> {
        self.inner.connectivity.snapshot(&self.tiers())
    }

    /// Probe every remote tier once and record the outcome.
    pub async fn probe(&self) -> Vec<TierStatus> {
        for store in &self.inner.stores {
            let tier = store.tier();
            if !tier.is_remote() {
                continue;
            }

            let outcome = tokio::time::timeout(self.inner.request_timeout, store.probe()).await;
            match outcome {
                Ok(Ok(())) => {
                    tracing::info!(tier = %tier, "probe ok");
                    self.inner.connectivity.mark_healthy(tier);
                }
                Ok(Err(e)) => {
                    tracing::warn!(tier = %tier, error = %e, "probe failed");
                    self.inner.connectivity.mark_unhealthy(tier);
                }
                Err(_) => {
                    tracing::warn!(tier = %tier, timeout_ms = self.timeout_ms(), "probe timed out");
                    self.inner.connectivity.mark_unhealthy(tier);
                }
            }
        }
        self.status()
    }

    /// Run a raw statement.
    ///
    /// `text` must be one of the canonical statements understood by
    /// [`QueryIntent::recognize`]. Denied fragments or parameter characters
    /// fail with a validation error before any tier is touched.
    pub async fn query(&self, text: &str, params: &[Value]) -> StoreResult<QueryResult> {
        guard::check_statement(text)?;
        guard::check_params(params)?;
        let intent = QueryIntent::recognize(text, params)?;
        self.execute(intent).await
    }

    /// Run a typed intent through the tier chain.
    ///
    /// Values are bound as parameters in every tier, so prompt text may
    /// contain quotes or semicolons; only raw [`Database::query`] text is
    /// screened by the guard.
    pub async fn execute(&self, intent: QueryIntent) -> StoreResult<QueryResult> {
        let op = intent.canonical_sql();
        if let Some(user) = intent.user_id() {
            tracing::debug!(user = %user_tag(user), op, "routing query");
        }
        self.route(op, |store| {
            let intent = intent.clone();
            Box::pin(async move { store.execute(&intent).await })
        })
        .await
    }

    pub async fn get_favorites(&self, user_id: &str) -> StoreResult<Vec<Favorite>> {
        let result = self
            .execute(QueryIntent::SelectByUser {
                user_id: user_id.to_owned(),
            })
            .await?;
        Ok(result.into_favorites())
    }

    pub async fn add_favorite(
        &self,
        user_id: &str,
        prompt: &str,
        categories: Option<Vec<String>>,
    ) -> StoreResult<Favorite> {
        let result = self
            .execute(QueryIntent::InsertFavorite {
                user_id: user_id.to_owned(),
                prompt: prompt.to_owned(),
                categories: categories.unwrap_or_default(),
            })
            .await?;
        result.into_favorites().into_iter().next().ok_or(StoreError::Exhausted)
    }

    /// Returns whether a row was removed. Never removes another user's row.
    pub async fn remove_favorite(&self, id: i64, user_id: &str) -> StoreResult<bool> {
        let result = self
            .execute(QueryIntent::DeleteById {
                id,
                user_id: user_id.to_owned(),
            })
            .await?;
        Ok(result.row_count > 0)
    }

    pub async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<Profile>> {
        let id = id.to_owned();
        self.route("get profile", |store| {
            let id = id.clone();
            Box::pin(async move { store.get_profile(&id).await })
        })
        .await
    }

    pub async fn update_user_profile(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> StoreResult<Option<Profile>> {
        let id = id.to_owned();
        tracing::debug!(user = %user_tag(&id), "profile update requested");
        self.route("update profile", |store| {
            let id = id.clone();
            let update = update.clone();
            Box::pin(async move { store.update_profile(&id, &update).await })
        })
        .await
    }

    /// Close the pool and flush the memory tier. Call before exit.
    pub async fn disconnect(&self) {
        for store in &self.inner.stores {
            if let Err(e) = store.close().await {
                tracing::warn!(tier = %store.tier(), error = %e, "error while closing tier");
            }
        }
        tracing::info!("database disconnected");
    }

    /// Walk the tiers until one answers.
    async fn route<T, F>(&self, op: &str, call: F) -> StoreResult<T>
    where
        F: for<'a> Fn(&'a dyn FavoritesStore) -> BoxFuture<'a, StoreResult<T>>,
    {
        let connectivity = &self.inner.connectivity;

        for store in &self.inner.stores {
            let tier = store.tier();
            if !connectivity.should_attempt(tier) {
                tracing::debug!(tier = %tier, op, "skipping unhealthy tier");
                continue;
            }

            let outcome = if tier.is_remote() {
                match tokio::time::timeout(self.inner.request_timeout, call(store.as_ref())).await {
                    Ok(result) => result,
                    Err(_) => Err(StoreError::Timeout {
                        tier,
                        millis: self.timeout_ms(),
                    }),
                }
            } else {
                call(store.as_ref()).await
            };

            match outcome {
                Ok(value) => {
                    connectivity.mark_healthy(tier);
                    return Ok(value);
                }
                Err(e) if e.is_validation() => return Err(e),
                Err(e) => {
                    tracing::warn!(tier = %tier, op, error = %e, "tier failed, falling through");
                    if e.is_connection_loss() {
                        connectivity.mark_unhealthy(tier);
                    }
                }
            }
        }

        tracing::error!(op, "every storage tier failed");
        Err(StoreError::Exhausted)
    }

    fn timeout_ms(&self) -> u64 {
        self.inner.request_timeout.as_millis() as u64
    }
}
