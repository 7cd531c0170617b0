use ::mysql::consts::ColumnType;
use ::mysql::{Binary, Column, QueryResult, Value as MysqlValue};

use crate::cursor::{ColumnDescriptor, Cursor};
use crate::error::SqlRecordsError;
use crate::materialize::{NativeValue, ScanTarget, scan_into};

/// Collation id MySQL reports for binary strings.
const BINARY_COLLATION: u16 = 63;

/// The type name MySQL itself would print for a column of this wire type.
///
/// String and blob families split on `binary`: `VARCHAR`/`VARBINARY`,
/// `TEXT`/`BLOB` and so on. Unknown wire types report an empty name.
#[must_use]
pub fn type_name_for(column_type: ColumnType, binary: bool) -> &'static str {
    use ColumnType::*;
    match column_type {
        MYSQL_TYPE_DECIMAL | MYSQL_TYPE_NEWDECIMAL => "DECIMAL",
        MYSQL_TYPE_TINY => "TINYINT",
        MYSQL_TYPE_SHORT => "SMALLINT",
        MYSQL_TYPE_INT24 => "MEDIUMINT",
        MYSQL_TYPE_LONG => "INT",
        MYSQL_TYPE_LONGLONG => "BIGINT",
        MYSQL_TYPE_FLOAT => "FLOAT",
        MYSQL_TYPE_DOUBLE => "DOUBLE",
        MYSQL_TYPE_NULL => "NULL",
        MYSQL_TYPE_TIMESTAMP | MYSQL_TYPE_TIMESTAMP2 => "TIMESTAMP",
        MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => "DATE",
        MYSQL_TYPE_TIME | MYSQL_TYPE_TIME2 => "TIME",
        MYSQL_TYPE_DATETIME | MYSQL_TYPE_DATETIME2 => "DATETIME",
        MYSQL_TYPE_YEAR => "YEAR",
        MYSQL_TYPE_BIT => "BIT",
        MYSQL_TYPE_JSON => "JSON",
        MYSQL_TYPE_ENUM => "ENUM",
        MYSQL_TYPE_SET => "SET",
        MYSQL_TYPE_GEOMETRY => "GEOMETRY",
        MYSQL_TYPE_VARCHAR => "VARCHAR",
        MYSQL_TYPE_VAR_STRING if binary => "VARBINARY",
        MYSQL_TYPE_VAR_STRING => "VARCHAR",
        MYSQL_TYPE_STRING if binary => "BINARY",
        MYSQL_TYPE_STRING => "CHAR",
        MYSQL_TYPE_TINY_BLOB if binary => "TINYBLOB",
        MYSQL_TYPE_TINY_BLOB => "TINYTEXT",
        MYSQL_TYPE_MEDIUM_BLOB if binary => "MEDIUMBLOB",
        MYSQL_TYPE_MEDIUM_BLOB => "MEDIUMTEXT",
        MYSQL_TYPE_LONG_BLOB if binary => "LONGBLOB",
        MYSQL_TYPE_LONG_BLOB => "LONGTEXT",
        MYSQL_TYPE_BLOB if binary => "BLOB",
        MYSQL_TYPE_BLOB => "TEXT",
        _ => "",
    }
}

/// Column metadata of a result set.
#[must_use]
pub fn describe_columns(columns: &[Column]) -> Vec<ColumnDescriptor> {
    columns
        .iter()
        .map(|col| {
            let binary = col.character_set() == BINARY_COLLATION;
            ColumnDescriptor::new(
                col.name_str().into_owned(),
                type_name_for(col.column_type(), binary),
            )
        })
        .collect()
}

fn format_date(value: &MysqlValue, column_type: ColumnType) -> String {
    let MysqlValue::Date(year, month, day, hour, minute, second, micros) = *value else {
        return String::new();
    };
    let date = format!("{year:04}-{month:02}-{day:02}");
    if matches!(
        column_type,
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE
    ) {
        return date;
    }
    if micros == 0 {
        format!("{date} {hour:02}:{minute:02}:{second:02}")
    } else {
        format!("{date} {hour:02}:{minute:02}:{second:02}.{micros:06}")
    }
}

fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let sign = if negative { "-" } else { "" };
    let hours = days * 24 + u32::from(hours);
    if micros == 0 {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}

/// Translate one protocol value, using the column's wire type where the
/// value alone is ambiguous.
pub(crate) fn native_value(value: MysqlValue, column_type: ColumnType) -> NativeValue {
    match value {
        MysqlValue::NULL => NativeValue::Null,
        MysqlValue::Int(i) => NativeValue::Int(i),
        MysqlValue::UInt(u) => NativeValue::UInt(u),
        // Through the decimal form, so FLOAT 1.23 stays 1.23.
        MysqlValue::Float(f) => NativeValue::Float(
            f.to_string()
                .parse::<f64>()
                .unwrap_or_else(|_| f64::from(f)),
        ),
        MysqlValue::Double(d) => NativeValue::Float(d),
        MysqlValue::Bytes(bytes) if column_type == ColumnType::MYSQL_TYPE_BIT => NativeValue::UInt(
            bytes
                .iter()
                .fold(0_u64, |acc, b| (acc << 8) | u64::from(*b)),
        ),
        MysqlValue::Bytes(bytes) => NativeValue::Bytes(bytes),
        date @ MysqlValue::Date(..) => NativeValue::Text(format_date(&date, column_type)),
        MysqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            NativeValue::Text(format_time(negative, days, hours, minutes, seconds, micros))
        }
    }
}

/// Translate a whole row, keeping its real width. Values past the known
/// columns are read without a wire type.
pub(crate) fn native_row(values: Vec<MysqlValue>, column_types: &[ColumnType]) -> Vec<NativeValue> {
    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            let column_type = column_types
                .get(idx)
                .copied()
                .unwrap_or(ColumnType::MYSQL_TYPE_NULL);
            native_value(value, column_type)
        })
        .collect()
}

/// Cursor over the first result set of one executed `MySQL` statement.
pub struct MysqlCursor<'c> {
    result: Option<QueryResult<'c, 'c, 'c, Binary>>,
    columns: Vec<ColumnDescriptor>,
    column_types: Vec<ColumnType>,
    current: Option<Vec<NativeValue>>,
}

impl<'c> MysqlCursor<'c> {
    #[must_use]
    pub fn new(result: QueryResult<'c, 'c, 'c, Binary>) -> Self {
        let (columns, column_types) = {
            let set_columns = result.columns();
            let raw: &[Column] = set_columns.as_ref();
            (
                describe_columns(raw),
                raw.iter().map(Column::column_type).collect(),
            )
        };
        Self {
            result: Some(result),
            columns,
            column_types,
            current: None,
        }
    }
}

impl Cursor for MysqlCursor<'_> {
    fn columns(&self) -> Result<Vec<ColumnDescriptor>, SqlRecordsError> {
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> Result<bool, SqlRecordsError> {
        let result = self.result.as_mut().ok_or(SqlRecordsError::CursorClosed)?;
        self.current = None;
        let Some(row) = result.next() else {
            return Ok(false);
        };
        let row = row?;
        self.current = Some(native_row(row.unwrap(), &self.column_types));
        Ok(true)
    }

    fn scan(&mut self, targets: &mut [ScanTarget]) -> Result<(), SqlRecordsError> {
        let values = self.current.take().ok_or_else(|| {
            SqlRecordsError::ExecutionError("scan called without a current row".to_string())
        })?;
        scan_into(values, &self.columns, targets)
    }

    fn close(&mut self) -> Result<(), SqlRecordsError> {
        // Dropping the result drains what is left of it from the wire.
        self.result = None;
        self.current = None;
        Ok(())
    }
}
