//! Profile commands - get, update

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use juici_store::{Database, ProfileUpdate};

use super::{print_json, public};

#[derive(Parser, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show a user's profile
    Get {
        /// User ID (UUID)
        id: String,
    },
    /// Update profile fields; unset fields are left alone
    Update {
        /// User ID (UUID)
        id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
}

pub async fn run_profile(db: &Database, args: ProfileArgs) -> Result<()> {
    match args.command {
        ProfileCommands::Get { id } => {
            let profile = db.get_user_by_id(&id).await.map_err(public)?;
            print_json(&profile)
        }
        ProfileCommands::Update {
            id,
            username,
            full_name,
            avatar_url,
        } => {
            let update = ProfileUpdate {
                username,
                full_name,
                avatar_url,
            };
            if update.is_empty() {
                bail!("Nothing to update: pass --username, --full-name or --avatar-url");
            }
            let profile = db.update_user_profile(&id, update).await.map_err(public)?;
            print_json(&profile)
        }
    }
}
