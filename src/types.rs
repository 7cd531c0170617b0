use std::fmt;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::SqlRecordsError;

/// Values that can be bound as positional query parameters.
///
/// The same enum is used for every backend so calling code never branches on
/// driver types:
/// ```rust
/// use sql_records::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("WIDG1".into()),
///     RowValues::Float(12.3),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value, bound as 0/1
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value, bound as its text form
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// A materialized column value of a [`crate::results::Record`].
///
/// Every value a query returns collapses into one of these four shapes; which
/// one is decided by the column's reported type (see [`crate::resolver`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Database NULL
    Null,
    /// Integer family columns
    Int(i64),
    /// Floating point and decimal columns
    Float(f64),
    /// Character, binary, temporal and unknown columns
    Text(String),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_int() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        }
    }

    /// Parse a temporal column's text back into a timestamp.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        let s = self.as_text()?;
        // Try "YYYY-MM-DD HH:MM:SS"
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Some(dt);
        }
        // Try "YYYY-MM-DD HH:MM:SS.ffffff"
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Fetched values can be bound straight back as parameters.
impl From<Value> for RowValues {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RowValues::Null,
            Value::Int(i) => RowValues::Int(i),
            Value::Float(x) => RowValues::Float(x),
            Value::Text(s) => RowValues::Text(s),
        }
    }
}

/// Convert a slice of `RowValues` into a backend's positional parameters.
pub trait ParamConverter: Sized {
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ParameterError` if a value has no
    /// representation in the backend.
    fn convert_sql_params(params: &[RowValues]) -> Result<Self, SqlRecordsError>;
}

/// The database drivers this crate can connect with.
///
/// Parsed from the `driver` configuration field (`DB_CONNECTION`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DatabaseType {
    /// `MySQL` / `MariaDB` over TCP
    #[cfg(feature = "mysql")]
    Mysql,
    /// `SQLite` database file
    #[cfg(feature = "sqlite")]
    #[value(alias = "sqlite3")]
    Sqlite,
}

impl DatabaseType {
    /// Parse a driver name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` if the name is empty or names a
    /// driver that is not compiled in.
    pub fn from_driver_name(name: &str) -> Result<Self, SqlRecordsError> {
        if name.trim().is_empty() {
            return Err(SqlRecordsError::ConfigError(
                "driver is required".to_string(),
            ));
        }
        <Self as ValueEnum>::from_str(name.trim(), true).map_err(|_| {
            SqlRecordsError::ConfigError(format!("unsupported driver '{name}'"))
        })
    }
}
