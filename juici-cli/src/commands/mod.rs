//! Command implementations for the juici CLI

pub mod favorites;
pub mod profile;
pub mod query;
pub mod status;

use anyhow::{anyhow, Result};
use juici_store::StoreError;
use serde::Serialize;

// Re-export dispatchers for flat access from main.rs
pub use favorites::run_favorites;
pub use profile::run_profile;
pub use query::run_query;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Convert a store error into what the operator sees.
///
/// Full detail was already logged by the store; only the public message is
/// printed.
pub(crate) fn public(err: StoreError) -> anyhow::Error {
    anyhow!(err.public_message())
}
