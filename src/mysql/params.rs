use chrono::{Datelike, Timelike};
use ::mysql::Value as MysqlValue;

use crate::error::SqlRecordsError;
use crate::types::{ParamConverter, RowValues};

/// Convert a single `RowValues` to a `mysql` protocol value.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn row_value_to_mysql_value(value: &RowValues) -> MysqlValue {
    match value {
        RowValues::Int(i) => MysqlValue::Int(*i),
        RowValues::Float(f) => MysqlValue::Double(*f),
        RowValues::Text(s) => MysqlValue::Bytes(s.as_bytes().to_vec()),
        RowValues::Bool(b) => MysqlValue::Int(i64::from(*b)),
        RowValues::Timestamp(dt) => {
            // Years outside u16 cannot be stored by MySQL anyway.
            let year = dt.year().clamp(0, i32::from(u16::MAX)) as u16;
            MysqlValue::Date(
                year,
                dt.month() as u8,
                dt.day() as u8,
                dt.hour() as u8,
                dt.minute() as u8,
                dt.second() as u8,
                dt.nanosecond() / 1_000,
            )
        }
        RowValues::Null => MysqlValue::NULL,
        RowValues::JSON(jval) => MysqlValue::Bytes(jval.to_string().into_bytes()),
        RowValues::Blob(bytes) => MysqlValue::Bytes(bytes.clone()),
    }
}

/// `MySQL` positional parameters.
pub struct Params(pub Vec<MysqlValue>);

impl Params {
    /// The driver's parameter form; no values means no placeholders.
    #[must_use]
    pub fn into_mysql(self) -> ::mysql::Params {
        if self.0.is_empty() {
            ::mysql::Params::Empty
        } else {
            ::mysql::Params::Positional(self.0)
        }
    }
}

impl ParamConverter for Params {
    fn convert_sql_params(params: &[RowValues]) -> Result<Self, SqlRecordsError> {
        Ok(Params(params.iter().map(row_value_to_mysql_value).collect()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn timestamps_bind_as_protocol_dates() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 3)
            .and_then(|d| d.and_hms_micro_opt(4, 5, 6, 700))
            .unwrap();
        assert_eq!(
            row_value_to_mysql_value(&RowValues::Timestamp(ts)),
            MysqlValue::Date(2024, 2, 3, 4, 5, 6, 700)
        );
    }

    #[test]
    fn empty_params_are_empty() {
        let params = Params::convert_sql_params(&[]).unwrap();
        assert!(matches!(params.into_mysql(), ::mysql::Params::Empty));
    }
}
