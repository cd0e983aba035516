//! Store configuration - environment and TOML loading
//!
//! Every setting is optional. A missing Supabase URL/key or `DATABASE_URL`
//! drops that tier from the chain instead of failing startup.
//!
//! Environment variables:
//! - `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY` (or `SUPABASE_ANON_KEY`)
//! - `DATABASE_URL`
//! - `JUICI_ENV`: `production` or `development` (default)
//! - `REQUEST_TIMEOUT`: remote call timeout in ms (default 30000)
//! - `JUICI_DATA_FILE`: fallback file (default `data/favorites.json`)
//! - `JUICI_REPROBE_SECS`: retry an unhealthy tier after this many seconds
//! - `JUICI_DB_MAX_CONNECTIONS`: Postgres pool size (default 5)

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_DATA_FILE: &str = "data/favorites.json";

/// Kept low; the fallback pool only serves when Supabase is down.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Clone, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub supabase: Option<SupabaseConfig>,
    pub database_url: Option<String>,
    pub environment: Environment,
    pub request_timeout_ms: u64,
    pub data_file: PathBuf,
    pub reprobe_after_secs: Option<u64>,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            supabase: None,
            database_url: None,
            environment: Environment::default(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            reprobe_after_secs: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("supabase", &self.supabase)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("environment", &self.environment)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("data_file", &self.data_file)
            .field("reprobe_after_secs", &self.reprobe_after_secs)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl StoreConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Read a TOML file, then apply environment overrides on top.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = config.normalized();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Replace values that cannot work (a zero timeout or pool size) with
    /// the defaults, logging each one.
    pub fn normalized(mut self) -> Self {
        if self.request_timeout_ms == 0 {
            tracing::warn!(
                default = DEFAULT_REQUEST_TIMEOUT_MS,
                "request_timeout_ms must be positive, using default"
            );
            self.request_timeout_ms = DEFAULT_REQUEST_TIMEOUT_MS;
        }
        if self.max_connections == 0 {
            tracing::warn!(
                default = DEFAULT_MAX_CONNECTIONS,
                "max_connections must be positive, using default"
            );
            self.max_connections = DEFAULT_MAX_CONNECTIONS;
        }
        self
    }

    /// Apply overrides from `lookup`. Empty and unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get("SUPABASE_URL");
        let key = get("SUPABASE_SERVICE_ROLE_KEY").or_else(|| get("SUPABASE_ANON_KEY"));
        match (url, key) {
            (Some(url), Some(key)) => self.supabase = Some(SupabaseConfig { url, key }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("Supabase URL and key must both be set; ignoring partial config");
            }
            (None, None) => {}
        }

        if let Some(url) = get("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(env) = get("JUICI_ENV") {
            self.environment = Environment::parse(&env);
        }
        if let Some(ms) = get("REQUEST_TIMEOUT") {
            match ms.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.request_timeout_ms = ms,
                _ => tracing::warn!(value = %ms, "ignoring invalid REQUEST_TIMEOUT"),
            }
        }
        if let Some(path) = get("JUICI_DATA_FILE") {
            self.data_file = PathBuf::from(path);
        }
        if let Some(secs) = get("JUICI_REPROBE_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.reprobe_after_secs = Some(secs),
                Err(_) => tracing::warn!(value = %secs, "ignoring invalid JUICI_REPROBE_SECS"),
            }
        }
        if let Some(n) = get("JUICI_DB_MAX_CONNECTIONS") {
            match n.trim().parse::<u32>() {
                Ok(n) if n > 0 => self.max_connections = n,
                _ => tracing::warn!(value = %n, "ignoring invalid JUICI_DB_MAX_CONNECTIONS"),
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reprobe_after(&self) -> Option<Duration> {
        self.reprobe_after_secs.map(Duration::from_secs)
    }
}
