//! Validation error types

use std::fmt;

/// Input rejected before any store is touched.
///
/// These never trigger tier fallthrough: they describe a caller mistake,
/// not an infrastructure fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// User id is not an 8-4-4-4-12 hex UUID
    InvalidUserId,

    /// Statement text contains a denied fragment
    DisallowedStatement { reason: &'static str },

    /// A string parameter contains a denied character sequence
    DisallowedParameter { index: usize },

    /// Statement text is not one of the recognised query shapes
    UnrecognizedQuery,

    /// Parameter at `index` is missing or has the wrong type
    InvalidParameter { index: usize, expected: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUserId => write!(f, "Invalid user ID format"),
            Self::DisallowedStatement { reason } => write!(f, "invalid query: {}", reason),
            Self::DisallowedParameter { index } => {
                write!(f, "invalid query: parameter {} contains disallowed characters", index + 1)
            }
            Self::UnrecognizedQuery => write!(f, "invalid query: unsupported statement"),
            Self::InvalidParameter { index, expected } => {
                write!(f, "invalid query: parameter {} must be {}", index + 1, expected)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
