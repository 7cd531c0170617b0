use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as JsonValue;

use crate::error::SqlRecordsError;
use crate::types::Value;

/// What a non-query statement did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    /// Rows changed, with the driver's own counting rules
    pub rows_affected: u64,
    /// Identifier of the last inserted row on this connection
    pub last_insert_id: i64,
}

/// One materialized row: a mapping from column name to [`Value`].
///
/// Every column the query reported is present, NULLs included. If a query
/// reports the same name twice, lookups by name see the last one.
#[derive(Debug, Clone)]
pub struct Record {
    /// The column names for this record (shared across a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values, in column order
    pub values: Vec<Value>,
    // name -> index, shared across a result set
    column_index: Arc<HashMap<String, usize>>,
}

impl Record {
    /// Create a record, building its own column index.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        let column_index = Arc::new(Self::build_index(&column_names));
        Self {
            column_names,
            values,
            column_index,
        }
    }

    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        column_index: Arc<HashMap<String, usize>>,
        values: Vec<Value>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    pub(crate) fn build_index(column_names: &[String]) -> HashMap<String, usize> {
        column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect()
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value by column name; `None` only when the column does not exist.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn contains_key(&self, column_name: &str) -> bool {
        self.column_index.contains_key(column_name)
    }

    /// Number of distinct column names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.column_index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.column_index.is_empty()
    }

    /// Iterate `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Convert into an owned map.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, Value> {
        let mut map = HashMap::with_capacity(self.values.len());
        for (name, value) in self.column_names.iter().zip(self.values) {
            map.insert(name.clone(), value);
        }
        map
    }

    /// Render as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ExecutionError` if serialization fails.
    pub fn to_json(&self) -> Result<JsonValue, SqlRecordsError> {
        serde_json::to_value(self).map_err(|e| {
            SqlRecordsError::ExecutionError(format!("record serialization error: {e}"))
        })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, &idx) in self.column_index.iter() {
            match self.values.get(idx) {
                Some(value) => map.serialize_entry(name, value)?,
                None => map.serialize_entry(name, &Option::<()>::None)?,
            }
        }
        map.end()
    }
}

/// The rows of one query, in cursor order.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The records returned by the query
    pub results: Vec<Record>,
    /// Column names shared by all records
    column_names: Option<Arc<Vec<String>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
        }
    }

    /// Set the column names for this result set
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    pub fn add_row(&mut self, row: Record) {
        if self.column_names.is_none() {
            self.column_names = Some(Arc::clone(&row.column_names));
        }
        self.results.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Record> {
        self.results.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.results.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new(
            Arc::new(vec!["sku".into(), "weight".into(), "note".into()]),
            vec![Value::Text("WIDG1".into()), Value::Float(12.3), Value::Null],
        )
    }

    #[test]
    fn lookup_by_name_and_index() {
        let r = record();
        assert_eq!(r.get("sku"), Some(&Value::Text("WIDG1".into())));
        assert_eq!(r.get_by_index(1), Some(&Value::Float(12.3)));
        assert_eq!(r.get("note"), Some(&Value::Null));
        assert_eq!(r.get("missing"), None);
        assert!(r.contains_key("note"));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn duplicate_names_resolve_to_last_column() {
        let r = Record::new(
            Arc::new(vec!["id".into(), "id".into()]),
            vec![Value::Int(1), Value::Int(2)],
        );
        assert_eq!(r.get("id"), Some(&Value::Int(2)));
        assert_eq!(r.len(), 1);
        assert_eq!(r.clone().into_map().get("id"), Some(&Value::Int(2)));
    }

    #[test]
    fn json_object_has_every_column() {
        let json = record().to_json().unwrap();
        assert_eq!(json["sku"], "WIDG1");
        assert_eq!(json["weight"], 12.3);
        assert!(json["note"].is_null());
        assert_eq!(json.as_object().map(serde_json::Map::len), Some(3));
    }

    #[test]
    fn result_set_keeps_order() {
        let mut rs = ResultSet::with_capacity(2);
        rs.add_row(record());
        rs.add_row(Record::new(
            Arc::new(vec!["sku".into()]),
            vec![Value::Text("WIDG2".into())],
        ));
        assert_eq!(rs.len(), 2);
        let skus: Vec<_> = rs.iter().filter_map(|r| r.get("sku")?.as_text()).collect();
        assert_eq!(skus, ["WIDG1", "WIDG2"]);
        assert_eq!(rs.get_column_names().map(|c| c.len()), Some(3));
    }
}
