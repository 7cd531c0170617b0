//! Single-row create/update helpers for one table.

use tracing::debug;

use crate::database::Database;
use crate::error::SqlRecordsError;
use crate::types::RowValues;

/// Key column used by [`RecordWriter::update`] when none is given.
pub const DEFAULT_KEY: &str = "id";

/// Quote an identifier with back-ticks, doubling any embedded back-tick.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(table))
}

/// `INSERT INTO `schema`.`table` (`c1`, ...) VALUES (?, ...)`.
///
/// # Errors
///
/// Returns `SqlRecordsError::ParameterError` when `columns` is empty.
pub fn build_insert(schema: &str, table: &str, columns: &[&str]) -> Result<String, SqlRecordsError> {
    if columns.is_empty() {
        return Err(SqlRecordsError::ParameterError(
            "a record needs at least one column".to_string(),
        ));
    }
    let names: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    let placeholders = vec!["?"; columns.len()];
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_table(schema, table),
        names.join(", "),
        placeholders.join(", ")
    ))
}

/// `UPDATE `schema`.`table` SET `c` = ?, ... WHERE `key` = ?`.
///
/// `columns` are the columns to set and must not include `key`.
///
/// # Errors
///
/// Returns `SqlRecordsError::ParameterError` when there is nothing to set.
pub fn build_update(
    schema: &str,
    table: &str,
    columns: &[&str],
    key: &str,
) -> Result<String, SqlRecordsError> {
    if columns.is_empty() {
        return Err(SqlRecordsError::ParameterError(format!(
            "update of {table} has no columns besides the key {key}"
        )));
    }
    let assignments: Vec<String> = columns
        .iter()
        .map(|c| format!("{} = ?", quote_identifier(c)))
        .collect();
    Ok(format!(
        "UPDATE {} SET {} WHERE {} = ?",
        qualified_table(schema, table),
        assignments.join(", "),
        quote_identifier(key)
    ))
}

/// Column values for one row of one table, bound to the database that
/// writes them.
///
/// Created by [`Database::make_record`].
pub struct RecordWriter<'db> {
    db: &'db mut Database,
    table: String,
    values: Vec<(String, RowValues)>,
}

impl<'db> RecordWriter<'db> {
    pub(crate) fn new<I, K, V>(db: &'db mut Database, table: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        let mut writer = Self {
            db,
            table: table.to_string(),
            values: Vec::new(),
        };
        for (column, value) in values {
            writer.put(column.into(), value.into());
        }
        writer
    }

    fn put(&mut self, column: String, value: RowValues) {
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
    }

    /// Set one column, replacing an earlier value for it.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<RowValues>) -> Self {
        self.put(column.into(), value.into());
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column values in insertion order.
    #[must_use]
    pub fn values(&self) -> &[(String, RowValues)] {
        &self.values
    }

    /// Insert the row and return the id the database assigned it.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ParameterError` with no values,
    /// `SqlRecordsError::ConfigError` without a bound schema, or the backend
    /// error of the insert.
    pub fn create(&mut self) -> Result<i64, SqlRecordsError> {
        let schema = self.db.schema_qualifier()?;
        let columns: Vec<&str> = self.values.iter().map(|(c, _)| c.as_str()).collect();
        let sql = build_insert(&schema, &self.table, &columns)?;
        let params: Vec<RowValues> = self.values.iter().map(|(_, v)| v.clone()).collect();
        let outcome = self.db.execute(&sql, &params)?;
        debug!(table = %self.table, id = outcome.last_insert_id, "record created");
        Ok(outcome.last_insert_id)
    }

    /// Update the rows whose `key` column equals this record's `key` value,
    /// setting every other column. An empty `key` means [`DEFAULT_KEY`].
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ParameterError` when the key column has no
    /// value or nothing else is set, `SqlRecordsError::ConfigError` without a
    /// bound schema, or the backend error of the update.
    pub fn update(&mut self, key: &str) -> Result<u64, SqlRecordsError> {
        let key = if key.is_empty() { DEFAULT_KEY } else { key };
        let key_value = self
            .values
            .iter()
            .find(|(c, _)| c == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                SqlRecordsError::ParameterError(format!(
                    "update of {} needs a value for key column {key}",
                    self.table
                ))
            })?;
        let schema = self.db.schema_qualifier()?;
        let (columns, mut params): (Vec<&str>, Vec<RowValues>) = self
            .values
            .iter()
            .filter(|(c, _)| c != key)
            .map(|(c, v)| (c.as_str(), v.clone()))
            .unzip();
        let sql = build_update(&schema, &self.table, &columns, key)?;
        params.push(key_value);
        let outcome = self.db.execute(&sql, &params)?;
        debug!(table = %self.table, rows = outcome.rows_affected, "record updated");
        Ok(outcome.rows_affected)
    }
}
