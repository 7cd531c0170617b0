//! Row materialization: fresh typed scan targets per row, populated from the
//! cursor in one call, then unwrapped into plain [`Value`]s.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cursor::{ColumnDescriptor, Cursor};
use crate::error::SqlRecordsError;
use crate::resolver::{ScanKind, resolve_scan_kinds};
use crate::results::Record;
use crate::types::Value;

/// A driver value as a backend hands it over, before any target conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// A nullable typed holder for one column of one row.
///
/// `None` is the holder's "not valid" state, i.e. database NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanTarget {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
}

impl ScanTarget {
    #[must_use]
    pub fn new(kind: ScanKind) -> Self {
        match kind {
            ScanKind::NullInt => ScanTarget::Int(None),
            ScanKind::NullFloat => ScanTarget::Float(None),
            ScanKind::NullString => ScanTarget::Text(None),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ScanKind {
        match self {
            ScanTarget::Int(_) => ScanKind::NullInt,
            ScanTarget::Float(_) => ScanKind::NullFloat,
            ScanTarget::Text(_) => ScanKind::NullString,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            ScanTarget::Int(v) => v.is_some(),
            ScanTarget::Float(v) => v.is_some(),
            ScanTarget::Text(v) => v.is_some(),
        }
    }

    /// Place a driver value into this holder, converting it to the holder's kind.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ScanError` naming `column` when the value cannot
    /// be represented in the holder's kind.
    pub fn populate(&mut self, value: NativeValue, column: &str) -> Result<(), SqlRecordsError> {
        match self {
            ScanTarget::Int(slot) => *slot = to_int(value, column)?,
            ScanTarget::Float(slot) => *slot = to_float(value, column)?,
            ScanTarget::Text(slot) => *slot = to_text(value),
        }
        Ok(())
    }

    /// Unwrap into a generic value; an invalid holder becomes `Value::Null`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            ScanTarget::Int(Some(i)) => Value::Int(i),
            ScanTarget::Float(Some(f)) => Value::Float(f),
            ScanTarget::Text(Some(s)) => Value::Text(s),
            ScanTarget::Int(None) | ScanTarget::Float(None) | ScanTarget::Text(None) => Value::Null,
        }
    }
}

fn scan_error(column: &str, reason: String) -> SqlRecordsError {
    SqlRecordsError::ScanError {
        column: column.to_string(),
        reason,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn to_int(value: NativeValue, column: &str) -> Result<Option<i64>, SqlRecordsError> {
    match value {
        NativeValue::Null => Ok(None),
        NativeValue::Int(i) => Ok(Some(i)),
        NativeValue::UInt(u) => i64::try_from(u)
            .map(Some)
            .map_err(|_| scan_error(column, format!("value {u} overflows a 64-bit integer"))),
        NativeValue::Float(f) => {
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Ok(Some(f as i64))
            } else {
                Err(scan_error(
                    column,
                    format!("converting float {f} to an integer loses precision"),
                ))
            }
        }
        NativeValue::Text(s) => parse_int(&s, column),
        NativeValue::Bytes(b) => parse_int(&String::from_utf8_lossy(&b), column),
    }
}

fn parse_int(s: &str, column: &str) -> Result<Option<i64>, SqlRecordsError> {
    s.trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|e| scan_error(column, format!("converting {s:?} to an integer: {e}")))
}

#[allow(clippy::cast_precision_loss)]
fn to_float(value: NativeValue, column: &str) -> Result<Option<f64>, SqlRecordsError> {
    match value {
        NativeValue::Null => Ok(None),
        NativeValue::Int(i) => Ok(Some(i as f64)),
        NativeValue::UInt(u) => Ok(Some(u as f64)),
        NativeValue::Float(f) => Ok(Some(f)),
        NativeValue::Text(s) => parse_float(&s, column),
        NativeValue::Bytes(b) => parse_float(&String::from_utf8_lossy(&b), column),
    }
}

fn parse_float(s: &str, column: &str) -> Result<Option<f64>, SqlRecordsError> {
    s.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| scan_error(column, format!("converting {s:?} to a float: {e}")))
}

fn to_text(value: NativeValue) -> Option<String> {
    match value {
        NativeValue::Null => None,
        NativeValue::Int(i) => Some(i.to_string()),
        NativeValue::UInt(u) => Some(u.to_string()),
        NativeValue::Float(f) => Some(f.to_string()),
        NativeValue::Text(s) => Some(s),
        NativeValue::Bytes(b) => Some(
            String::from_utf8(b)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
        ),
    }
}

/// Populate `targets` from one row of driver values.
///
/// Backends call this from [`Cursor::scan`]. Widths must match exactly; a
/// failing column fails the whole row.
///
/// # Errors
///
/// Returns `SqlRecordsError::ColumnCountMismatch` when the row and target
/// widths differ, or the first `ScanError` raised by a column.
pub fn scan_into(
    values: Vec<NativeValue>,
    columns: &[ColumnDescriptor],
    targets: &mut [ScanTarget],
) -> Result<(), SqlRecordsError> {
    if values.len() != targets.len() {
        return Err(SqlRecordsError::ColumnCountMismatch {
            expected: targets.len(),
            actual: values.len(),
        });
    }
    for (idx, (value, target)) in values.into_iter().zip(targets.iter_mut()).enumerate() {
        let name = columns.get(idx).map_or("?", |c| c.name.as_str());
        target.populate(value, name)?;
    }
    Ok(())
}

/// Per-query column layout shared by every row of a walk.
#[derive(Debug, Clone)]
pub struct RowLayout {
    names: Arc<Vec<String>>,
    index: Arc<HashMap<String, usize>>,
    kinds: Vec<ScanKind>,
}

impl RowLayout {
    /// Resolve the scan kinds of a query's columns.
    #[must_use]
    pub fn from_columns(columns: &[ColumnDescriptor]) -> Self {
        let names = columns.iter().map(|c| c.name.clone()).collect();
        let kinds = resolve_scan_kinds(columns.iter().map(|c| c.type_name.as_str()));
        Self::new(names, kinds)
    }

    #[must_use]
    pub fn new(names: Vec<String>, kinds: Vec<ScanKind>) -> Self {
        let index = Arc::new(Record::build_index(&names));
        Self {
            names: Arc::new(names),
            index,
            kinds,
        }
    }

    #[must_use]
    pub fn names(&self) -> &Arc<Vec<String>> {
        &self.names
    }

    #[must_use]
    pub fn kinds(&self) -> &[ScanKind] {
        &self.kinds
    }
}

/// Produce one record from the row the cursor is positioned on.
///
/// # Errors
///
/// Returns `SqlRecordsError::ColumnCountMismatch` if the layout's names and
/// kinds disagree, or whatever the cursor's `scan` raised.
pub fn materialize_row<C: Cursor + ?Sized>(
    layout: &RowLayout,
    cursor: &mut C,
) -> Result<Record, SqlRecordsError> {
    if layout.names.len() != layout.kinds.len() {
        return Err(SqlRecordsError::ColumnCountMismatch {
            expected: layout.names.len(),
            actual: layout.kinds.len(),
        });
    }
    let mut targets: Vec<ScanTarget> = layout.kinds.iter().copied().map(ScanTarget::new).collect();
    cursor.scan(&mut targets)?;
    let values = targets.into_iter().map(ScanTarget::into_value).collect();
    Ok(Record::with_index(
        Arc::clone(&layout.names),
        Arc::clone(&layout.index),
        values,
    ))
}
