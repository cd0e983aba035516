//! Favorites commands - list, add, remove
//!
//! ```bash
//! juici favorites add --user $USER_ID --prompt "Build a widget" --category web
//! juici favorites list --user $USER_ID | jq '.[].prompt'
//! juici favorites remove --user $USER_ID 3
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use juici_store::Database;
use serde_json::json;

use super::{print_json, public};

#[derive(Parser, Debug)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommands,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommands {
    /// List a user's favorites, oldest first
    List {
        /// Owner's user ID (UUID)
        #[arg(long, short = 'u')]
        user: String,
    },
    /// Save a prompt as a favorite
    Add {
        /// Owner's user ID (UUID)
        #[arg(long, short = 'u')]
        user: String,
        /// Prompt text to save
        #[arg(long, short = 'p')]
        prompt: String,
        /// Category tag (repeatable)
        #[arg(long = "category", short = 'c')]
        categories: Vec<String>,
    },
    /// Remove a favorite owned by the user
    Remove {
        /// Owner's user ID (UUID)
        #[arg(long, short = 'u')]
        user: String,
        /// Favorite ID
        id: i64,
    },
}

pub async fn run_favorites(db: &Database, args: FavoritesArgs) -> Result<()> {
    match args.command {
        FavoritesCommands::List { user } => {
            let favorites = db.get_favorites(&user).await.map_err(public)?;
            print_json(&favorites)
        }
        FavoritesCommands::Add {
            user,
            prompt,
            categories,
        } => {
            let favorite = db
                .add_favorite(&user, &prompt, Some(categories))
                .await
                .map_err(public)?;
            print_json(&favorite)
        }
        FavoritesCommands::Remove { user, id } => {
            let removed = db.remove_favorite(id, &user).await.map_err(public)?;
            print_json(&json!({ "id": id, "removed": removed }))
        }
    }
}
