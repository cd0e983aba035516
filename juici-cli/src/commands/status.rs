//! Status and probe commands

use anyhow::Result;
use juici_store::Database;

use super::print_json;

/// Print the tier chain with its current health, without touching the network.
///
/// The startup probe runs in the background and has usually not finished
/// yet, so remote tiers read `unknown` here; `run_probe` gives a fresh answer.
pub fn run_status(db: &Database) -> Result<()> {
    print_json(&db.status())
}

/// Probe every remote tier, then print the updated health.
pub async fn run_probe(db: &Database) -> Result<()> {
    let status = db.probe().await;
    print_json(&status)
}
