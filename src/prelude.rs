//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{Configs, EnvSource, ProcessEnv};
pub use crate::cursor::{ColumnDescriptor, Cursor};
pub use crate::database::Database;
pub use crate::error::SqlRecordsError;
pub use crate::record::RecordWriter;
pub use crate::results::{ExecOutcome, Record, ResultSet};
pub use crate::types::{DatabaseType, RowValues, Value};
pub use crate::walker::{fetch_one, walk};
