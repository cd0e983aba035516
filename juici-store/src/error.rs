//! Error types for juici-store

use thiserror::Error;

use crate::models::ValidationError;
use crate::store::Tier;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("supabase returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{tier} did not answer within {millis} ms")]
    Timeout { tier: Tier, millis: u64 },

    #[error("no storage tier could serve the request")]
    Exhausted,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Caller mistake; returned as-is, never retried on another tier.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the error means the backing connection is gone or the pool is
    /// exhausted, as opposed to a one-off query failure.
    pub fn is_connection_loss(&self) -> bool {
        match self {
            Self::Sqlx(e) => is_sqlx_connection_loss(e),
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Message safe to hand to an end user.
    ///
    /// Validation text is returned verbatim. Everything else collapses to a
    /// generic message so hosts, keys and SQL never leak.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            _ => "an internal error occurred".to_string(),
        }
    }
}

/// SQLSTATE classes and sqlx variants that mean the pool can't serve queries.
fn is_sqlx_connection_loss(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| is_connection_loss_code(&code)),
        _ => false,
    }
}

/// 53300 too_many_connections, 57P0x server shutdown, 08xxx connection exception
fn is_connection_loss_code(code: &str) -> bool {
    code == "53300" || code.starts_with("57P0") || code.starts_with("08")
}
