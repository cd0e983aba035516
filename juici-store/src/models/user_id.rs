//! User id validation
//!
//! Supabase and Postgres key favorites by auth user UUID. The memory tier
//! accepts any string so local development works without an auth backend.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// 8-4-4-4-12 hex groups, any case
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("invalid uuid regex")
});

/// Check that `user_id` is a well-formed UUID.
///
/// # Example
/// ```
/// use juici_store::models::ensure_uuid;
///
/// assert!(ensure_uuid("11111111-1111-1111-1111-111111111111").is_ok());
/// assert!(ensure_uuid("not-a-uuid").is_err());
/// ```
pub fn ensure_uuid(user_id: &str) -> Result<(), ValidationError> {
    if UUID_RE.is_match(user_id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUserId)
    }
}
