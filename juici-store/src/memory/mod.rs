//! In-memory query emulator - the last tier
//!
//! Serves the four query intents against a `Vec<Favorite>` and a counter,
//! persisting through [`FileStore`] after every mutation. Mutations hold the
//! state lock across the write, so concurrent requests cannot interleave
//! their read-modify-write cycles.
//!
//! This tier never fails a request. A failed write is logged and the
//! in-memory state stays authoritative until the next successful save.

pub mod file;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::StoreResult;
use crate::intent::QueryIntent;
use crate::models::{Favorite, Profile, ProfileUpdate, QueryResult};
use crate::redact::user_tag;
use crate::store::{FavoritesStore, Tier};

pub use file::{FavoritesFile, FileStore};

pub struct MemoryStore {
    file: FileStore,
    state: Mutex<FavoritesFile>,
    profiles: Mutex<HashMap<String, Profile>>,
    /// Set once this tier has served any request
    active: AtomicBool,
    /// Set when the last save failed
    dirty: AtomicBool,
}

impl MemoryStore {
    /// Load state from `path` (missing file = empty store).
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let file = FileStore::new(path.as_ref());
        let state = file.load().await;
        Self {
            file,
            state: Mutex::new(state),
            profiles: Mutex::new(HashMap::new()),
            active: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Copy of the current document.
    pub async fn snapshot(&self) -> FavoritesFile {
        self.state.lock().await.clone()
    }

    /// Write current state to disk.
    pub async fn flush(&self) -> StoreResult<()> {
        let state = self.state.lock().await;
        self.file.save(&state).await?;
        self.dirty.store(false, Ordering::Relaxed);
        Ok(())
    }

    /// Save while the caller still holds the state lock.
    async fn persist(&self, state: &FavoritesFile) {
        match self.file.save(state).await {
            Ok(()) => self.dirty.store(false, Ordering::Relaxed),
            Err(e) => {
                self.dirty.store(true, Ordering::Relaxed);
                tracing::warn!(
                    path = %self.file.path().display(),
                    error = %e,
                    "failed to persist fallback file; keeping in-memory state"
                );
            }
        }
    }

    async fn insert(&self, user_id: &str, prompt: &str, categories: &[String]) -> Favorite {
        let mut state = self.state.lock().await;
        let favorite = Favorite {
            id: state.next_id,
            user_id: user_id.to_owned(),
            prompt: prompt.to_owned(),
            categories: categories.to_vec(),
            created_at: Utc::now(),
        };
        state.next_id += 1;
        state.favorites.push(favorite.clone());
        self.persist(&state).await;

        tracing::debug!(user = %user_tag(user_id), id = favorite.id, "memory: favorite added");
        favorite
    }

    async fn select(&self, user_id: &str) -> Vec<Favorite> {
        let state = self.state.lock().await;
        state
            .favorites
            .iter()
            .filter(|f| f.is_owned_by(user_id))
            .cloned()
            .collect()
    }

    async fn delete(&self, id: i64, user_id: &str) -> u64 {
        let mut state = self.state.lock().await;
        let before = state.favorites.len();
        state
            .favorites
            .retain(|f| !(f.id == id && f.is_owned_by(user_id)));
        let removed = (before - state.favorites.len()) as u64;

        if removed > 0 {
            self.persist(&state).await;
        }

        tracing::debug!(user = %user_tag(user_id), id, removed, "memory: favorite delete");
        removed
    }
}

#[async_trait]
impl FavoritesStore for MemoryStore {
    fn tier(&self) -> Tier {
        Tier::Memory
    }

    async fn probe(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn execute(&self, intent: &QueryIntent) -> StoreResult<QueryResult> {
        self.active.store(true, Ordering::Relaxed);

        let result = match intent {
            QueryIntent::InsertFavorite {
                user_id,
                prompt,
                categories,
            } => QueryResult::inserted(self.insert(user_id, prompt, categories).await),
            QueryIntent::SelectByUser { user_id } => QueryResult::selected(self.select(user_id).await),
            QueryIntent::DeleteById { id, user_id } => QueryResult::deleted(self.delete(*id, user_id).await),
            // No schema here; the table always "exists"
            QueryIntent::TableExists { .. } => QueryResult::exists(true),
        };
        Ok(result)
    }

    async fn get_profile(&self, id: &str) -> StoreResult<Option<Profile>> {
        self.active.store(true, Ordering::Relaxed);
        Ok(self.profiles.lock().await.get(id).cloned())
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<Option<Profile>> {
        self.active.store(true, Ordering::Relaxed);
        let mut profiles = self.profiles.lock().await;
        let profile = profiles
            .entry(id.to_owned())
            .or_insert_with(|| Profile::new(id));
        profile.apply(update);
        Ok(Some(profile.clone()))
    }

    /// Flush if this tier was used or a previous save failed.
    async fn close(&self) -> StoreResult<()> {
        if self.is_active() || self.dirty.load(Ordering::Relaxed) {
            self.flush().await?;
            tracing::info!(path = %self.file.path().display(), "fallback file flushed");
        }
        Ok(())
    }
}
