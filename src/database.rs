//! The connection façade: one open connection plus the settings it was made
//! from.

use tracing::{debug, info, warn};

use crate::config::{Configs, EnvSource, ProcessEnv};
use crate::cursor::Cursor;
use crate::error::SqlRecordsError;
use crate::record::RecordWriter;
use crate::results::{ExecOutcome, Record, ResultSet};
use crate::types::{DatabaseType, RowValues};
use crate::walker::{fetch_one, walk};

#[cfg(feature = "mysql")]
use crate::mysql::MysqlConnection;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteConnection;

enum Connection {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteConnection),
    #[cfg(feature = "mysql")]
    Mysql(MysqlConnection),
}

impl Connection {
    fn open(
        db_type: DatabaseType,
        configs: &Configs,
        schemaless: bool,
    ) -> Result<Self, SqlRecordsError> {
        match db_type {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => crate::sqlite::open(configs, schemaless).map(Connection::Sqlite),
            #[cfg(feature = "mysql")]
            DatabaseType::Mysql => crate::mysql::open(configs, schemaless).map(Connection::Mysql),
        }
    }

    fn close(self) -> Result<(), SqlRecordsError> {
        match self {
            #[cfg(feature = "sqlite")]
            Connection::Sqlite(conn) => conn.close(),
            #[cfg(feature = "mysql")]
            Connection::Mysql(conn) => conn.close(),
        }
    }
}

/// A single database connection with query and record helpers.
///
/// ```rust,no_run
/// use sql_records::prelude::*;
///
/// # fn main() -> Result<(), SqlRecordsError> {
/// let configs = Configs::new().with_driver("sqlite").with_database("widgets.db");
/// let mut db = Database::make(configs)?;
/// let widget = db.row_by_field("SELECT * FROM widgets WHERE sku = ?", "WIDG2")?;
/// println!("{:?}", widget.get("weight"));
/// # Ok(())
/// # }
/// ```
pub struct Database {
    conn: Connection,
    configs: Configs,
    schemaless: bool,
    db_type: DatabaseType,
}

impl Database {
    /// Connect to the schema named in `configs`, filling gaps from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` for missing or invalid settings
    /// and `SqlRecordsError::ConnectionError` if the connection fails.
    pub fn make(configs: Configs) -> Result<Self, SqlRecordsError> {
        Self::connect(configs, &ProcessEnv, false)
    }

    /// Connect without binding a schema, filling gaps from the process
    /// environment. `DB_DATABASE` is not consulted.
    ///
    /// # Errors
    ///
    /// Same as [`Database::make`].
    pub fn make_schemaless(configs: Configs) -> Result<Self, SqlRecordsError> {
        Self::connect(configs, &ProcessEnv, true)
    }

    /// [`Database::make`] with an explicit environment.
    ///
    /// # Errors
    ///
    /// Same as [`Database::make`].
    pub fn make_with_env<E: EnvSource + ?Sized>(
        configs: Configs,
        env: &E,
    ) -> Result<Self, SqlRecordsError> {
        Self::connect(configs, env, false)
    }

    /// [`Database::make_schemaless`] with an explicit environment.
    ///
    /// # Errors
    ///
    /// Same as [`Database::make`].
    pub fn make_schemaless_with_env<E: EnvSource + ?Sized>(
        configs: Configs,
        env: &E,
    ) -> Result<Self, SqlRecordsError> {
        Self::connect(configs, env, true)
    }

    fn connect<E: EnvSource + ?Sized>(
        mut configs: Configs,
        env: &E,
        schemaless: bool,
    ) -> Result<Self, SqlRecordsError> {
        configs.supplement_from(env, schemaless);
        let db_type = configs.validate(schemaless)?;
        let conn = Connection::open(db_type, &configs, schemaless)?;
        info!(
            dsn = %configs.redacted_connection_string(schemaless),
            driver = ?db_type,
            schemaless,
            "database connected"
        );
        Ok(Self {
            conn,
            configs,
            schemaless,
            db_type,
        })
    }

    /// Run a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the statement fails.
    pub fn execute(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ExecOutcome, SqlRecordsError> {
        debug!(sql, params = params.len(), "execute");
        match &mut self.conn {
            #[cfg(feature = "sqlite")]
            Connection::Sqlite(conn) => conn.execute(sql, params),
            #[cfg(feature = "mysql")]
            Connection::Mysql(conn) => conn.execute(sql, params),
        }
    }

    /// Run several parameterless statements in one call.
    ///
    /// # Errors
    ///
    /// Returns the backend error of the first failing statement.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), SqlRecordsError> {
        debug!(sql, "execute batch");
        match &mut self.conn {
            #[cfg(feature = "sqlite")]
            Connection::Sqlite(conn) => conn.execute_batch(sql),
            #[cfg(feature = "mysql")]
            Connection::Mysql(conn) => conn.execute_batch(sql),
        }
    }

    /// Run a query and hand its live cursor to `func`.
    ///
    /// The cursor only lives for the call; it is released before this
    /// returns, whatever `func` did with it.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the query cannot start, otherwise
    /// whatever `func` returns.
    pub fn rows<T, F>(
        &mut self,
        sql: &str,
        params: &[RowValues],
        func: F,
    ) -> Result<T, SqlRecordsError>
    where
        F: FnOnce(&mut dyn Cursor) -> Result<T, SqlRecordsError>,
    {
        debug!(sql, params = params.len(), "query");
        match &mut self.conn {
            #[cfg(feature = "sqlite")]
            Connection::Sqlite(conn) => conn.query_with(sql, params, func),
            #[cfg(feature = "mysql")]
            Connection::Mysql(conn) => conn.query_with(sql, params, func),
        }
    }

    /// Run a query and materialize every row.
    ///
    /// # Errors
    ///
    /// Returns the first query, scan or iteration error; no partial result.
    pub fn query_all(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlRecordsError> {
        self.rows(sql, params, |cursor| walk(cursor))
    }

    /// Run a query and materialize its first row.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::NoResult` when the query returns no rows.
    pub fn row(&mut self, sql: &str, params: &[RowValues]) -> Result<Record, SqlRecordsError> {
        self.rows(sql, params, |cursor| fetch_one(cursor))
    }

    /// [`Database::row`] with a single integer parameter.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::NoResult` when nothing matches.
    pub fn row_by_id(&mut self, sql: &str, id: i64) -> Result<Record, SqlRecordsError> {
        self.row(sql, &[RowValues::Int(id)])
    }

    /// [`Database::row`] with a single text parameter.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::NoResult` when nothing matches.
    pub fn row_by_field(&mut self, sql: &str, value: &str) -> Result<Record, SqlRecordsError> {
        self.row(sql, &[RowValues::Text(value.to_string())])
    }

    /// Bind to `name` for good: the settings are updated, schemaless mode
    /// ends and the connection is reopened.
    ///
    /// On failure the current connection and settings are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` for an empty name, or the
    /// connection error of the reconnect.
    pub fn set_schema(&mut self, name: &str) -> Result<(), SqlRecordsError> {
        if name.trim().is_empty() {
            return Err(SqlRecordsError::ConfigError(
                "schema name is required".to_string(),
            ));
        }
        let configs = self.configs.clone().with_database(name);
        let db_type = configs.validate(false)?;
        let conn = Connection::open(db_type, &configs, false)?;
        let old = std::mem::replace(&mut self.conn, conn);
        if let Err(e) = old.close() {
            warn!(error = %e, "closing the previous connection failed");
        }
        info!(
            dsn = %configs.redacted_connection_string(false),
            "schema bound"
        );
        self.configs = configs;
        self.schemaless = false;
        self.db_type = db_type;
        Ok(())
    }

    /// The bound schema; empty while schemaless.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.schemaless {
            ""
        } else {
            &self.configs.database
        }
    }

    #[must_use]
    pub fn is_schemaless(&self) -> bool {
        self.schemaless
    }

    #[must_use]
    pub fn driver(&self) -> DatabaseType {
        self.db_type
    }

    /// The settings in effect, after environment supplementation.
    #[must_use]
    pub fn configs(&self) -> &Configs {
        &self.configs
    }

    /// Schema that record helpers qualify table names with.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` when no schema is bound on a
    /// server database.
    pub fn schema_qualifier(&self) -> Result<String, SqlRecordsError> {
        match self.db_type {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => Ok(crate::sqlite::MAIN_SCHEMA.to_string()),
            #[cfg(feature = "mysql")]
            DatabaseType::Mysql => {
                let name = self.name();
                if name.is_empty() {
                    Err(SqlRecordsError::ConfigError(
                        "record helpers need a bound schema".to_string(),
                    ))
                } else {
                    Ok(name.to_string())
                }
            }
        }
    }

    /// Whether `table` exists in the bound schema.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` when no schema is bound on a
    /// server database, or the backend error of the lookup.
    pub fn has_table(&mut self, table: &str) -> Result<bool, SqlRecordsError> {
        match self.db_type {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => {
                let tables = self.query_all(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
                    &[RowValues::Text(table.to_string())],
                )?;
                Ok(!tables.is_empty())
            }
            #[cfg(feature = "mysql")]
            DatabaseType::Mysql => {
                let key = format!("Tables_in_{}", self.schema_qualifier()?);
                let tables = self.query_all("SHOW TABLES", &[])?;
                Ok(tables
                    .iter()
                    .any(|t| t.get(&key).and_then(crate::types::Value::as_text) == Some(table)))
            }
        }
    }

    /// Start a create/update helper for one row of `table`.
    ///
    /// Columns keep the order `values` yields them in; a repeated column
    /// keeps its first position and its last value.
    pub fn make_record<I, K, V>(&mut self, values: I, table: &str) -> RecordWriter<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        RecordWriter::new(self, table, values)
    }

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the connection does not close cleanly.
    pub fn close(self) -> Result<(), SqlRecordsError> {
        self.conn.close()
    }
}
