use thiserror::Error;

/// Error type for rowbind operations
#[derive(Debug, Error)]
pub enum RowBindError {
    #[error("No executor attached to context")]
    NoExecutor,

    #[error("Statement execution failed: {0}")]
    StatementExecution(String),

    #[error("Column enumeration failed: {0}")]
    ColumnEnumeration(String),

    #[error("Can not get destinations for result type {0}")]
    UnscannableResultType(&'static str),

    #[error("No rows in result set")]
    NoRows,

    #[error("Failed to scan column {column}: {reason}")]
    RowScan { column: String, reason: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for rowbind operations
pub type Result<T> = std::result::Result<T, RowBindError>;
