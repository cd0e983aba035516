//! Closed set of query shapes the data layer understands
//!
//! Callers either build a [`QueryIntent`] directly or hand `Database::query`
//! one of the canonical statements below, which is recognised back into an
//! intent. Anything else is rejected; this is not a general SQL executor.

use serde_json::{json, Value};

use crate::models::ValidationError;

const INSERT_FAVORITE_SQL: &str =
    "INSERT INTO favorites (user_id, prompt, categories) VALUES ($1, $2, $3) RETURNING *";
const SELECT_BY_USER_SQL: &str = "SELECT * FROM favorites WHERE user_id = $1 ORDER BY id";
const DELETE_BY_ID_SQL: &str = "DELETE FROM favorites WHERE id = $1 AND user_id = $2";
pub(crate) const TABLE_EXISTS_SQL: &str =
    "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    InsertFavorite {
        user_id: String,
        prompt: String,
        categories: Vec<String>,
    },
    SelectByUser {
        user_id: String,
    },
    /// Owner-scoped: only removes the row if `user_id` also matches.
    DeleteById {
        id: i64,
        user_id: String,
    },
    TableExists {
        table: String,
    },
}

impl QueryIntent {
    /// Parameterised SQL for this intent.
    pub fn canonical_sql(&self) -> &'static str {
        match self {
            Self::InsertFavorite { .. } => INSERT_FAVORITE_SQL,
            Self::SelectByUser { .. } => SELECT_BY_USER_SQL,
            Self::DeleteById { .. } => DELETE_BY_ID_SQL,
            Self::TableExists { .. } => TABLE_EXISTS_SQL,
        }
    }

    /// Bind values in `$n` order.
    pub fn params(&self) -> Vec<Value> {
        match self {
            Self::InsertFavorite {
                user_id,
                prompt,
                categories,
            } => vec![json!(user_id), json!(prompt), json!(categories)],
            Self::SelectByUser { user_id } => vec![json!(user_id)],
            Self::DeleteById { id, user_id } => vec![json!(id), json!(user_id)],
            Self::TableExists { table } => vec![json!(table)],
        }
    }

    /// User the intent acts for, if any.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::InsertFavorite { user_id, .. }
            | Self::SelectByUser { user_id }
            | Self::DeleteById { user_id, .. } => Some(user_id),
            Self::TableExists { .. } => None,
        }
    }

    /// Match `text` against the canonical statements and decode `params`.
    ///
    /// Comparison ignores case and runs of whitespace.
    pub fn recognize(text: &str, params: &[Value]) -> Result<Self, ValidationError> {
        let normalized = normalize(text);

        if normalized == normalize(INSERT_FAVORITE_SQL) {
            Ok(Self::InsertFavorite {
                user_id: string_param(params, 0)?,
                prompt: string_param(params, 1)?,
                categories: categories_param(params, 2)?,
            })
        } else if normalized == normalize(SELECT_BY_USER_SQL) {
            Ok(Self::SelectByUser {
                user_id: string_param(params, 0)?,
            })
        } else if normalized == normalize(DELETE_BY_ID_SQL) {
            Ok(Self::DeleteById {
                id: id_param(params, 0)?,
                user_id: string_param(params, 1)?,
            })
        } else if normalized == normalize(TABLE_EXISTS_SQL) {
            Ok(Self::TableExists {
                table: string_param(params, 0)?,
            })
        } else {
            Err(ValidationError::UnrecognizedQuery)
        }
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn string_param(params: &[Value], index: usize) -> Result<String, ValidationError> {
    match params.get(index) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(ValidationError::InvalidParameter {
            index,
            expected: "a string",
        }),
    }
}

/// Accepts an integer or a numeric string, since ids often arrive from URLs.
fn id_param(params: &[Value], index: usize) -> Result<i64, ValidationError> {
    let invalid = ValidationError::InvalidParameter {
        index,
        expected: "an integer id",
    };
    match params.get(index) {
        Some(Value::Number(n)) => n.as_i64().ok_or(invalid),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid),
        _ => Err(invalid),
    }
}

/// Missing or null means no categories.
fn categories_param(params: &[Value], index: usize) -> Result<Vec<String>, ValidationError> {
    let invalid = ValidationError::InvalidParameter {
        index,
        expected: "an array of strings",
    };
    match params.get(index) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned).ok_or(invalid.clone()))
            .collect(),
        Some(_) => Err(invalid),
    }
}
