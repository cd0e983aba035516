//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use crate::config::Environment;

/// Parse `database_url` and apply the TLS policy for `environment`.
///
/// Production always verifies the server certificate and hostname,
/// whatever `sslmode` the URL asks for. Other environments keep the URL's
/// setting (sqlx defaults to `prefer`).
pub fn connect_options(
    database_url: &str,
    environment: Environment,
) -> Result<PgConnectOptions, sqlx::Error> {
    let options: PgConnectOptions = database_url.parse()?;
    if environment.is_production() {
        Ok(options.ssl_mode(PgSslMode::VerifyFull))
    } else {
        Ok(options)
    }
}

/// Create a PostgreSQL connection pool.
///
/// `acquire_timeout` bounds both the initial connect and every later
/// checkout, so an exhausted pool surfaces as `PoolTimedOut` instead of
/// hanging.
pub async fn create_pool(
    options: PgConnectOptions,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await
}
