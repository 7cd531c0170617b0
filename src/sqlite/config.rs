use rusqlite::Connection;

use crate::config::Configs;
use crate::error::SqlRecordsError;

use super::connection::SqliteConnection;

/// In-memory database path accepted in the `database` field.
pub const MEMORY_PATH: &str = ":memory:";

/// Schema name used to qualify tables on `SQLite`.
pub const MAIN_SCHEMA: &str = "main";

/// Open the `SQLite` database named by `configs.database`.
///
/// Schemaless mode, and the `:memory:` path, open a private in-memory
/// database. Host, port and credentials do not apply to `SQLite`.
///
/// # Errors
///
/// Returns `SqlRecordsError::ConnectionError` if the file cannot be opened.
pub fn open(configs: &Configs, schemaless: bool) -> Result<SqliteConnection, SqlRecordsError> {
    let path = configs.database.as_str();
    let conn = if schemaless || path == MEMORY_PATH {
        Connection::open_in_memory()
    } else {
        Connection::open(path)
    }
    .map_err(|e| {
        SqlRecordsError::ConnectionError(format!("Failed to open SQLite database '{path}': {e}"))
    })?;
    Ok(SqliteConnection::new(conn))
}
