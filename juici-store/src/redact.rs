//! Log-safe identifiers

/// Short stable tag for a user id, for log fields.
///
/// First 8 hex chars of the MD5 digest. Enough to correlate log lines for
/// one user without writing the id itself.
pub fn user_tag(user_id: &str) -> String {
    let digest = format!("{:x}", md5::compute(user_id.as_bytes()));
    digest[..8].to_string()
}
