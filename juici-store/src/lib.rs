//! juici-store: tiered favorites storage for Juici
//!
//! One facade, [`Database`], in front of three backends tried in order:
//!
//! 1. Supabase REST (`SUPABASE_URL` + key)
//! 2. Direct pooled Postgres (`DATABASE_URL`)
//! 3. An in-memory store persisted to `data/favorites.json`
//!
//! Unconfigured or failing tiers are skipped. The memory tier always
//! answers, so a valid request always gets a
//! `{ rows, rowCount, command }` result.
//!
//! ```ignore
//! let db = Database::connect(&StoreConfig::from_env()).await;
//! let fav = db.add_favorite(user_id, "Build a widget", Some(vec!["web".into()])).await?;
//! let all = db.get_favorites(user_id).await?;
//! db.disconnect().await;
//! ```

pub mod config;
pub mod connectivity;
pub mod database;
pub mod error;
pub mod guard;
pub mod intent;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod redact;
pub mod shutdown;
pub mod store;
pub mod supabase;

pub use config::{Environment, StoreConfig, SupabaseConfig};
pub use connectivity::{Connectivity, TierHealth, TierStatus};
pub use database::Database;
pub use error::{StoreError, StoreResult};
pub use intent::QueryIntent;
pub use models::{Command, Favorite, Profile, ProfileUpdate, QueryResult, Row, ValidationError};
pub use store::{FavoritesStore, Tier};
