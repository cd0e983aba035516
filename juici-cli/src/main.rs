//! juici CLI - operator access to Juici's favorites storage
//!
//! Every command goes through the same tier chain the app uses:
//! Supabase, then direct Postgres, then the local JSON fallback file.
//! Results are printed as pretty JSON on stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use juici_store::shutdown::shutdown_signal;
use juici_store::{Database, StoreConfig};

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "juici",
    author,
    version,
    about = "Inspect and manage Juici favorites across Supabase, Postgres and the local fallback",
    long_about = "Routes every request through the tiered storage layer. Unreachable tiers are \
                  skipped, and the local JSON file answers when nothing else does."
)]
struct Cli {
    /// TOML config file (environment variables still override it)
    #[arg(long, env = "JUICI_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show configured tiers and their last known health
    ///
    /// Does not wait for the startup probe, so remote tiers usually show
    /// `unknown`. Use `juici probe` to check reachability now.
    Status,
    /// Probe every remote tier now and report health
    Probe,
    /// Favorite prompts (list, add, remove)
    Favorites(commands::favorites::FavoritesArgs),
    /// User profiles (get, update)
    Profile(commands::profile::ProfileArgs),
    /// Run one of the supported SQL statements with JSON parameters
    Query(commands::query::QueryArgs),
}

/// Load `.env` from the working directory, then `~/.juici/.env`.
///
/// Variables already set in the process environment win.
fn load_env_files() {
    dotenvy::dotenv().ok();
    if let Some(home) = dirs::home_dir() {
        let env_file = home.join(".juici").join(".env");
        if env_file.exists() {
            dotenvy::from_path(&env_file).ok();
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    match path {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(StoreConfig::from_env()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so clap's `env` fallbacks see values from .env files
    load_env_files();
    let cli = Cli::parse();

    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    let db = Database::connect(&config).await;

    let outcome = tokio::select! {
        result = run(&db, cli.command) => result,
        _ = shutdown_signal() => Err(anyhow!("interrupted")),
    };

    db.disconnect().await;
    outcome
}

async fn run(db: &Database, command: Commands) -> Result<()> {
    match command {
        Commands::Status => commands::status::run_status(db),
        Commands::Probe => commands::status::run_probe(db).await,
        Commands::Favorites(args) => commands::run_favorites(db, args).await,
        Commands::Profile(args) => commands::run_profile(db, args).await,
        Commands::Query(args) => commands::run_query(db, args).await,
    }
}
