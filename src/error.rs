use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlRecordsError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "mysql")]
    #[error(transparent)]
    MysqlError(#[from] ::mysql::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Scan error on column '{column}': {reason}")]
    ScanError { column: String, reason: String },

    #[error("Column count mismatch: expected {expected} columns, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// A single-row lookup matched nothing.
    #[error("No result")]
    NoResult,

    #[error("Cursor is closed")]
    CursorClosed,
}

impl SqlRecordsError {
    /// True when this is the "no result" outcome of a single-row lookup.
    #[must_use]
    pub fn is_no_result(&self) -> bool {
        matches!(self, Self::NoResult)
    }
}
