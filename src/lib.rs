//! Blocking SQL convenience layer: one connection, parameterized SQL, and
//! rows materialized into generic name-to-value records.
//!
//! Column types are resolved at runtime from what the driver reports, so
//! numeric columns come back as numbers and everything else as text:
//!
//! ```rust
//! use sql_records::prelude::*;
//!
//! # fn main() -> Result<(), SqlRecordsError> {
//! let configs = Configs::new().with_driver("sqlite").with_database(":memory:");
//! let mut db = Database::make_with_env(configs, &std::collections::HashMap::<String, String>::new())?;
//! db.execute_batch(
//!     "CREATE TABLE widgets (id INTEGER PRIMARY KEY, sku VARCHAR(16), weight FLOAT);
//!      INSERT INTO widgets (sku, weight) VALUES ('WIDG1', 12.5);",
//! )?;
//! let rows = db.query_all("SELECT sku, weight FROM widgets", &[])?;
//! assert_eq!(rows.results[0].get("weight"), Some(&Value::Float(12.5)));
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod config;
pub mod cursor;
pub mod database;
pub mod error;
pub mod materialize;
pub mod record;
pub mod resolver;
pub mod results;
pub mod types;
pub mod walker;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{ConfigField, Configs, EnvSource, ProcessEnv};
pub use cursor::{ColumnDescriptor, Cursor, CursorGuard, CursorState};
pub use database::Database;
pub use error::SqlRecordsError;
pub use record::RecordWriter;
pub use resolver::{ScanKind, resolve_scan_kind};
pub use results::{ExecOutcome, Record, ResultSet};
pub use types::{DatabaseType, RowValues, Value};
pub use walker::{fetch_one, walk};
