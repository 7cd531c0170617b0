use rusqlite::types::Value as SqliteValue;

use crate::error::SqlRecordsError;
use crate::types::{ParamConverter, RowValues};

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> SqliteValue {
    match value {
        RowValues::Int(i) => SqliteValue::Integer(*i),
        RowValues::Float(f) => SqliteValue::Real(*f),
        RowValues::Text(s) => SqliteValue::Text(s.clone()),
        RowValues::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => SqliteValue::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => SqliteValue::Null,
        RowValues::JSON(jval) => SqliteValue::Text(jval.to_string()),
        RowValues::Blob(bytes) => SqliteValue::Blob(bytes.clone()),
    }
}

/// `SQLite` positional parameters.
pub struct Params(pub Vec<SqliteValue>);

impl Params {
    /// Build a borrowed params slice suitable for rusqlite execution.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.0.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
    }
}

impl ParamConverter for Params {
    fn convert_sql_params(params: &[RowValues]) -> Result<Self, SqlRecordsError> {
        Ok(Params(params.iter().map(row_value_to_sqlite_value).collect()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn booleans_and_timestamps_bind_as_sqlite_natives() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 1))
            .unwrap();
        let params = Params::convert_sql_params(&[
            RowValues::Bool(true),
            RowValues::Timestamp(ts),
            RowValues::Null,
        ])
        .unwrap();
        assert_eq!(
            params.0,
            vec![
                SqliteValue::Integer(1),
                SqliteValue::Text("2024-01-01 08:00:01".into()),
                SqliteValue::Null,
            ]
        );
    }
}
