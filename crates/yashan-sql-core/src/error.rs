//! Error types for SQL generation.

/// Errors raised while translating a schema operation into SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The dialect cannot express the requested operation safely.
    ///
    /// Raised before any SQL is produced, so callers never receive a
    /// partial statement list.
    #[error("Unsupported operation on table '{table}': {operation}")]
    UnsupportedOperation {
        /// What was requested (e.g. "add column \"email\"").
        operation: String,
        /// The table the operation targeted.
        table: String,
    },

    /// An identifier that must be non-empty was empty.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl PlatformError {
    /// Creates a [`PlatformError::UnsupportedOperation`].
    #[must_use]
    pub fn unsupported(table: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            table: table.into(),
        }
    }
}

/// Result type for SQL generation.
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = PlatformError::unsupported("users", "drop column \"email\"");
        assert_eq!(
            err.to_string(),
            "Unsupported operation on table 'users': drop column \"email\""
        );
    }
}
