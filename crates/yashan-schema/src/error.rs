//! Error types for schema operations.

use yashan_sql_core::PlatformError;

/// Errors that can occur while managing a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The platform refused to generate SQL.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The database rejected a statement. The message is the driver's,
    /// passed through unchanged.
    #[error("Database error executing '{sql}': {message}")]
    Execution {
        /// The statement that failed.
        sql: String,
        /// Driver error message.
        message: String,
    },

    /// A query returned a row without a column the caller relies on.
    #[error("Query '{sql}' returned a row without column '{column}'")]
    UnexpectedRow {
        /// The query.
        sql: String,
        /// The missing column.
        column: String,
    },

    /// Could not open a connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (reading configuration or schema files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Multiple errors occurred.
    #[error("Multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<SchemaError>),
}

impl SchemaError {
    /// Creates a [`SchemaError::Execution`].
    #[must_use]
    pub fn execution(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            sql: sql.into(),
            message: message.into(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_is_transparent() {
        let err: SchemaError = PlatformError::unsupported("t", "drop column 'x'").into();
        assert_eq!(
            err.to_string(),
            "Unsupported operation on table 't': drop column 'x'"
        );
    }

    #[test]
    fn test_multiple() {
        let err = SchemaError::Multiple(vec![
            SchemaError::Config("a".into()),
            SchemaError::execution("DROP TABLE \"t\"", "ORA-00942"),
        ]);
        assert_eq!(
            err.to_string(),
            "Multiple errors occurred:\n  - Configuration error: a\n  - Database error executing 'DROP TABLE \"t\"': ORA-00942"
        );
    }
}
