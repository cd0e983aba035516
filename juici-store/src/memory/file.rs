//! JSON file persistence for the memory tier
//!
//! The whole document is rewritten on every save: serialize, write a
//! sibling temp file, rename over the original.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::models::Favorite;

/// On-disk document: `{ "favorites": [...], "nextId": n }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesFile {
    #[serde(default)]
    pub favorites: Vec<Favorite>,
    #[serde(default = "first_id")]
    pub next_id: i64,
}

fn first_id() -> i64 {
    1
}

impl Default for FavoritesFile {
    fn default() -> Self {
        Self {
            favorites: Vec::new(),
            next_id: first_id(),
        }
    }
}

impl FavoritesFile {
    /// Bump `next_id` past the largest stored id if a hand-edited or
    /// truncated file left it too low. Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        let floor = self.favorites.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let floor = floor.max(first_id());
        if self.next_id < floor {
            self.next_id = floor;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file is an empty store. An unreadable or
    /// corrupt one is moved aside to `<name>.corrupt-<timestamp>` and the
    /// store starts empty, so the next save cannot overwrite it.
    pub async fn load(&self) -> FavoritesFile {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no fallback file yet, starting empty");
                return FavoritesFile::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read fallback file, starting empty");
                self.quarantine().await;
                return FavoritesFile::default();
            }
        };

        let mut file: FavoritesFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt fallback file, starting empty");
                self.quarantine().await;
                return FavoritesFile::default();
            }
        };

        if file.repair() {
            tracing::warn!(path = %self.path.display(), next_id = file.next_id, "repaired nextId in fallback file");
        }

        tracing::info!(
            path = %self.path.display(),
            favorites = file.favorites.len(),
            "loaded fallback file"
        );
        file
    }

    /// Rename the current file to `<name>.corrupt-<timestamp>`.
    async fn quarantine(&self) {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3f")));
        let target = self.path.with_file_name(name);

        match fs::rename(&self.path, &target).await {
            Ok(()) => {
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %target.display(),
                    "moved unreadable fallback file aside"
                );
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "could not move unreadable fallback file aside; next save will replace it"
                );
            }
        }
    }

    /// Persist the full document.
    pub async fn save(&self, file: &FavoritesFile) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(file)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn favorite(id: i64) -> Favorite {
        Favorite {
            id,
            user_id: "dev-user".into(),
            prompt: format!("prompt {}", id),
            categories: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("favorites.json"));
        assert_eq!(store.load().await, FavoritesFile::default());
    }

    #[tokio::test]
    async fn save_creates_parent_dirs_and_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("data").join("favorites.json"));

        let file = FavoritesFile {
            favorites: vec![favorite(1), favorite(2)],
            next_id: 3,
        };
        store.save(&file).await.unwrap();

        assert!(store.path().exists());
        assert_eq!(store.load().await, file);
    }

    #[tokio::test]
    async fn writes_camel_case_next_id() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("favorites.json"));
        store.save(&FavoritesFile::default()).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["nextId"], 1);
        assert!(value["favorites"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("favorites.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::new(path);
        assert_eq!(store.load().await, FavoritesFile::default());
    }

    #[tokio::test]
    async fn corrupt_file_is_moved_aside() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("favorites.json");
        let original = r#"{"favorites":[{"id":1,"user_id":"u","prompt":"precious","categories":[],"created_at":"2024-01-01T00:00:00Z"}],"nextId":"2"}"#;
        std::fs::write(&path, original).unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.load().await, FavoritesFile::default());
        assert!(!path.exists());

        let backups: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("favorites.json.corrupt-"))
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read_to_string(&backups[0]).unwrap(), original);
    }

    #[tokio::test]
    async fn load_repairs_low_next_id() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("favorites.json");
        let file = FavoritesFile {
            favorites: vec![favorite(5), favorite(9)],
            next_id: 2,
        };
        std::fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();

        let loaded = FileStore::new(path).load().await;
        assert_eq!(loaded.next_id, 10);
    }

    #[test]
    fn repair_leaves_valid_counter() {
        let mut file = FavoritesFile {
            favorites: vec![favorite(1)],
            next_id: 7,
        };
        assert!(!file.repair());
        assert_eq!(file.next_id, 7);
    }
}
