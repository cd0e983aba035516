//! Pre-flight query filter
//!
//! A denylist over statement text and string parameters. Values are always
//! bound as parameters downstream; this only catches callers building SQL
//! by hand.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::ValidationError;

/// Fragments never allowed in statement text
const DENIED_FRAGMENTS: &[(&str, &str)] = &[
    (";", "statement separators are not allowed"),
    ("--", "comments are not allowed"),
    ("/*", "comments are not allowed"),
    ("*/", "comments are not allowed"),
];

/// Sequences never allowed inside a string parameter
const DENIED_PARAM_SEQUENCES: &[&str] = &["'", "\"", ";", "--", "/*", "*/"];

static DROP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bdrop\b").expect("invalid drop regex"));

static TRUNCATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btruncate\b").expect("invalid truncate regex"));

static DELETE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bdelete\s+from\b").expect("invalid delete regex"));

static WHERE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bwhere\b").expect("invalid where regex"));

/// Reject statement text containing separators, comments, `DROP`,
/// `TRUNCATE`, or a `DELETE FROM` with no `WHERE`.
pub fn check_statement(text: &str) -> Result<(), ValidationError> {
    for (fragment, reason) in DENIED_FRAGMENTS {
        if text.contains(fragment) {
            return Err(ValidationError::DisallowedStatement { reason });
        }
    }

    if DROP_RE.is_match(text) {
        return Err(ValidationError::DisallowedStatement {
            reason: "DROP is not allowed",
        });
    }

    if TRUNCATE_RE.is_match(text) {
        return Err(ValidationError::DisallowedStatement {
            reason: "TRUNCATE is not allowed",
        });
    }

    if DELETE_RE.is_match(text) && !WHERE_RE.is_match(text) {
        return Err(ValidationError::DisallowedStatement {
            reason: "DELETE requires a WHERE clause",
        });
    }

    Ok(())
}

/// Reject any string parameter (top level or nested in an array/object)
/// containing quotes, separators or comment markers.
pub fn check_params(params: &[Value]) -> Result<(), ValidationError> {
    for (index, param) in params.iter().enumerate() {
        if !value_is_clean(param) {
            return Err(ValidationError::DisallowedParameter { index });
        }
    }
    Ok(())
}

fn value_is_clean(value: &Value) -> bool {
    match value {
        Value::String(s) => !DENIED_PARAM_SEQUENCES.iter().any(|seq| s.contains(seq)),
        Value::Array(items) => items.iter().all(value_is_clean),
        Value::Object(map) => map.values().all(value_is_clean),
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
    }
}
