use lazy_static::lazy_static;
use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Rows, Statement};

use crate::cursor::{ColumnDescriptor, Cursor};
use crate::error::SqlRecordsError;
use crate::materialize::{NativeValue, ScanTarget, scan_into};

lazy_static! {
    static ref LEADING_TYPE_WORD: Regex = Regex::new(r"^\s*([A-Za-z_]+)").expect("valid regex");
}

/// Reduce a declared column type to the name the resolver understands.
///
/// `INT(6) UNSIGNED` becomes `INT`, `VARCHAR (2500)` becomes `VARCHAR`, and
/// SQLite's own affinity spellings map onto their MySQL equivalents. Columns
/// without a declared type (expressions) report an empty name.
#[must_use]
pub fn declared_type_name(decl_type: Option<&str>) -> String {
    let Some(word) = decl_type
        .and_then(|decl| LEADING_TYPE_WORD.captures(decl))
        .and_then(|caps| caps.get(1))
    else {
        return String::new();
    };
    let upper = word.as_str().to_ascii_uppercase();
    match upper.as_str() {
        "REAL" => "DOUBLE".to_string(),
        "NUMERIC" => "DECIMAL".to_string(),
        _ => upper,
    }
}

/// Column metadata of a prepared statement.
#[must_use]
pub fn describe_columns(stmt: &Statement<'_>) -> Vec<ColumnDescriptor> {
    stmt.columns()
        .iter()
        .map(|col| ColumnDescriptor::new(col.name(), declared_type_name(col.decl_type())))
        .collect()
}

fn native_value(value: ValueRef<'_>) -> NativeValue {
    match value {
        ValueRef::Null => NativeValue::Null,
        ValueRef::Integer(i) => NativeValue::Int(i),
        ValueRef::Real(f) => NativeValue::Float(f),
        ValueRef::Text(t) => NativeValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => NativeValue::Bytes(b.to_vec()),
    }
}

/// Cursor over the rows of one executed `SQLite` statement.
///
/// The current row's values are copied out on `advance`, so `scan` works
/// on owned data.
pub struct SqliteCursor<'stmt> {
    rows: Option<Rows<'stmt>>,
    columns: Vec<ColumnDescriptor>,
    current: Option<Vec<NativeValue>>,
}

impl<'stmt> SqliteCursor<'stmt> {
    #[must_use]
    pub fn new(rows: Rows<'stmt>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            rows: Some(rows),
            columns,
            current: None,
        }
    }
}

impl Cursor for SqliteCursor<'_> {
    fn columns(&self) -> Result<Vec<ColumnDescriptor>, SqlRecordsError> {
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> Result<bool, SqlRecordsError> {
        let rows = self.rows.as_mut().ok_or(SqlRecordsError::CursorClosed)?;
        self.current = None;
        let Some(row) = rows.next()? else {
            return Ok(false);
        };
        let mut values = Vec::with_capacity(self.columns.len());
        for idx in 0..self.columns.len() {
            values.push(native_value(row.get_ref(idx)?));
        }
        self.current = Some(values);
        Ok(true)
    }

    fn scan(&mut self, targets: &mut [ScanTarget]) -> Result<(), SqlRecordsError> {
        let values = self.current.take().ok_or_else(|| {
            SqlRecordsError::ExecutionError("scan called without a current row".to_string())
        })?;
        scan_into(values, &self.columns, targets)
    }

    fn close(&mut self) -> Result<(), SqlRecordsError> {
        // Dropping the rows resets the statement.
        self.rows = None;
        self.current = None;
        Ok(())
    }
}
