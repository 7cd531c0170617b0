use ::mysql::Conn;
use ::mysql::prelude::Queryable;
use tracing::debug;

use crate::cursor::Cursor;
use crate::error::SqlRecordsError;
use crate::results::ExecOutcome;
use crate::types::{ParamConverter, RowValues};

use super::params::Params;
use super::query::MysqlCursor;

/// One open `MySQL` connection.
pub struct MysqlConnection {
    conn: Conn,
}

impl MysqlConnection {
    pub(crate) fn new(conn: Conn) -> Self {
        Self { conn }
    }

    /// Run one statement and report its effect.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::MysqlError` if the server rejects it.
    pub fn execute(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecOutcome, SqlRecordsError> {
        let params = Params::convert_sql_params(params)?;
        self.conn.exec_drop(query, params.into_mysql())?;
        let last_insert_id = i64::try_from(self.conn.last_insert_id()).map_err(|e| {
            SqlRecordsError::ExecutionError(format!("mysql last insert id conversion error: {e}"))
        })?;
        let outcome = ExecOutcome {
            rows_affected: self.conn.affected_rows(),
            last_insert_id,
        };
        debug!(rows_affected = outcome.rows_affected, "mysql execute");
        Ok(outcome)
    }

    /// Run statements through the text protocol, without parameters.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::MysqlError` on the first failing statement.
    pub fn execute_batch(&mut self, query: &str) -> Result<(), SqlRecordsError> {
        self.conn.query_drop(query)?;
        Ok(())
    }

    /// Run a query and lend its cursor to `func`.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::MysqlError` if the statement fails to start,
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
        let result = self.conn.exec_iter(query, params.into_mysql())?;
        let mut cursor = MysqlCursor::new(result);
        func(&mut cursor)
    }

    /// Close the connection. The driver sends `COM_QUIT` on drop.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature matches the other backends.
    #[allow(clippy::unnecessary_wraps)]
    pub fn close(self) -> Result<(), SqlRecordsError> {
        drop(self.conn);
        Ok(())
    }
}
