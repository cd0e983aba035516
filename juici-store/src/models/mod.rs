//! Domain models
//!
//! Records are plain serde structs so every tier (REST JSON, Postgres rows,
//! the JSON fallback file) shares one shape.

pub mod validation;
pub mod user_id;
pub mod favorite;
pub mod profile;
pub mod result;

pub use validation::ValidationError;
pub use user_id::ensure_uuid;
pub use favorite::Favorite;
pub use profile::{Profile, ProfileUpdate};
pub use result::{Command, QueryResult, Row};
