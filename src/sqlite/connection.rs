use tracing::debug;

use crate::cursor::Cursor;
use crate::error::SqlRecordsError;
use crate::results::ExecOutcome;
use crate::types::{ParamConverter, RowValues};

use super::params::Params;
use super::query::{SqliteCursor, describe_columns};

/// One open `SQLite` connection.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub(crate) fn new(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Run one statement and report its effect.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::SqliteError` if preparing or executing fails.
    pub fn execute(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecOutcome, SqlRecordsError> {
        let params = Params::convert_sql_params(params)?;
        let mut stmt = self.conn.prepare(query)?;
        let affected = stmt.execute(&params.as_refs()[..])?;
        let outcome = ExecOutcome {
            rows_affected: u64::try_from(affected).map_err(|e| {
                SqlRecordsError::ExecutionError(format!(
                    "sqlite affected rows conversion error: {e}"
                ))
            })?,
            last_insert_id: self.conn.last_insert_rowid(),
        };
        debug!(rows_affected = outcome.rows_affected, "sqlite execute");
        Ok(outcome)
    }

    /// Run several `;`-separated statements without parameters.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::SqliteError` on the first failing statement.
    pub fn execute_batch(&mut self, query: &str) -> Result<(), SqlRecordsError> {
        self.conn
            .execute_batch(query)
            .map_err(SqlRecordsError::SqliteError)
    }

    /// Run a query and lend its cursor to `func`.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::SqliteError` if the statement fails to start,
    /// otherwise whatever `func` returns.
    pub fn query_with<T, F>(
        &mut self,
        query: &str,
        params: &[RowValues],
        func: F,
    ) -> Result<T, SqlRecordsError>
    where
        F: FnOnce(&mut dyn Cursor) -> Result<T, SqlRecordsError>,
    {
        let params = Params::convert_sql_params(params)?;
        let mut stmt = self.conn.prepare(query)?;
        let columns = describe_columns(&stmt);
        let refs = params.as_refs();
        let rows = stmt.query(&refs[..])?;
        let mut cursor = SqliteCursor::new(rows, columns);
        func(&mut cursor)
    }

    /// # Errors
    ///
    /// Returns `SqlRecordsError::SqliteError` if `SQLite` refuses to close.
    pub fn close(self) -> Result<(), SqlRecordsError> {
        self.conn
            .close()
            .map_err(|(_, e)| SqlRecordsError::SqliteError(e))
    }
}
