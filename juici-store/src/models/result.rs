//! Normalized query result shared by every tier

use serde::{Deserialize, Serialize};

use super::Favorite;

/// Statement kind reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Insert,
    Select,
    Delete,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Select => "SELECT",
            Self::Delete => "DELETE",
        }
    }
}

/// One result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Row {
    Favorite(Favorite),
    Exists { exists: bool },
}

/// `{ rows, rowCount, command }`, identical whichever tier served it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub row_count: u64,
    pub command: Command,
}

impl QueryResult {
    pub fn inserted(favorite: Favorite) -> Self {
        Self {
            rows: vec![Row::Favorite(favorite)],
            row_count: 1,
            command: Command::Insert,
        }
    }

    pub fn selected(favorites: Vec<Favorite>) -> Self {
        Self {
            row_count: favorites.len() as u64,
            rows: favorites.into_iter().map(Row::Favorite).collect(),
            command: Command::Select,
        }
    }

    pub fn deleted(count: u64) -> Self {
        Self {
            rows: Vec::new(),
            row_count: count,
            command: Command::Delete,
        }
    }

    pub fn exists(exists: bool) -> Self {
        Self {
            rows: vec![Row::Exists { exists }],
            row_count: 1,
            command: Command::Select,
        }
    }

    /// Favorite rows, in order. Other row kinds are skipped.
    pub fn into_favorites(self) -> Vec<Favorite> {
        self.rows
            .into_iter()
            .filter_map(|row| match row {
                Row::Favorite(f) => Some(f),
                Row::Exists { .. } => None,
            })
            .collect()
    }
}
