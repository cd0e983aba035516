//! Storage tier abstraction
//!
//! Each backend (Supabase, Postgres, memory) implements [`FavoritesStore`].
//! [`crate::Database`] holds them in preference order and walks the list
//! until one answers.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreResult;
use crate::intent::QueryIntent;
use crate::models::{Profile, ProfileUpdate, QueryResult};

/// Position of a store in the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    /// Supabase REST
    #[serde(rename = "supabase")]
    Primary,
    /// Direct pooled Postgres
    #[serde(rename = "postgres")]
    Secondary,
    /// JSON-file-backed in-memory store
    #[serde(rename = "memory")]
    Memory,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "supabase",
            Self::Secondary => "postgres",
            Self::Memory => "memory",
        }
    }

    /// Remote tiers go over the network and run under the request timeout.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Memory)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One storage backend for favorites and profiles
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    fn tier(&self) -> Tier;

    /// Cheap round trip proving the backend is reachable.
    async fn probe(&self) -> StoreResult<()>;

    async fn execute(&self, intent: &QueryIntent) -> StoreResult<QueryResult>;

    async fn get_profile(&self, id: &str) -> StoreResult<Option<Profile>>;

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<Option<Profile>>;

    /// Release connections or flush state before shutdown.
    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
