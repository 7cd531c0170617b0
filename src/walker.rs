//! Drives a cursor to completion, one materialized record per row.

use tracing::debug;

use crate::cursor::{Cursor, CursorGuard};
use crate::error::SqlRecordsError;
use crate::materialize::{RowLayout, materialize_row};
use crate::results::{Record, ResultSet};

/// Read every row of `cursor` into a [`ResultSet`].
///
/// Column kinds are resolved once up front. Any row error or iteration fault
/// aborts the walk and no partial rows are returned. The cursor is closed
/// exactly once on every path; a close failure is only reported when nothing
/// else failed first.
///
/// # Errors
///
/// Returns the metadata, scan or iteration error that stopped the walk, or the
/// close error of an otherwise successful walk.
pub fn walk<C: Cursor>(cursor: C) -> Result<ResultSet, SqlRecordsError> {
    let mut guard = CursorGuard::new(cursor);
    match collect_rows(&mut guard) {
        Ok(result_set) => {
            guard.close()?;
            debug!(rows = result_set.len(), "result walk complete");
            Ok(result_set)
        }
        Err(e) => Err(guard.close_after(e)),
    }
}

fn collect_rows<C: Cursor>(guard: &mut CursorGuard<C>) -> Result<ResultSet, SqlRecordsError> {
    let layout = RowLayout::from_columns(&guard.columns()?);
    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(layout.names().clone());

    while guard.advance()? {
        let record = materialize_row(&layout, guard.current()?)?;
        result_set.add_row(record);
    }

    Ok(result_set)
}

/// Read the first row of `cursor`; remaining rows are left unread.
///
/// # Errors
///
/// Returns `SqlRecordsError::NoResult` when the cursor has no rows, otherwise
/// the same errors as [`walk`].
pub fn fetch_one<C: Cursor>(cursor: C) -> Result<Record, SqlRecordsError> {
    let mut guard = CursorGuard::new(cursor);
    match first_row(&mut guard) {
        Ok(record) => {
            guard.close()?;
            Ok(record)
        }
        Err(e) => Err(guard.close_after(e)),
    }
}

fn first_row<C: Cursor>(guard: &mut CursorGuard<C>) -> Result<Record, SqlRecordsError> {
    let layout = RowLayout::from_columns(&guard.columns()?);
    if !guard.advance()? {
        return Err(SqlRecordsError::NoResult);
    }
    materialize_row(&layout, guard.current()?)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::cursor::ColumnDescriptor;
    use crate::materialize::{NativeValue, ScanTarget, scan_into};
    use crate::types::Value;

    enum Step {
        Row(Vec<NativeValue>),
        Fault(&'static str),
    }

    struct ScriptedCursor {
        columns: Vec<ColumnDescriptor>,
        steps: VecDeque<Step>,
        current: Option<Vec<NativeValue>>,
        closes: Rc<Cell<usize>>,
        close_fails: bool,
    }

    impl ScriptedCursor {
        fn new(columns: &[(&str, &str)], steps: Vec<Step>) -> Self {
            Self {
                columns: columns
                    .iter()
                    .map(|(name, ty)| ColumnDescriptor::new(*name, *ty))
                    .collect(),
                steps: steps.into(),
                current: None,
                closes: Rc::new(Cell::new(0)),
                close_fails: false,
            }
        }

        fn failing_close(mut self) -> Self {
            self.close_fails = true;
            self
        }
    }

    impl Cursor for ScriptedCursor {
        fn columns(&self) -> Result<Vec<ColumnDescriptor>, SqlRecordsError> {
            Ok(self.columns.clone())
        }

        fn advance(&mut self) -> Result<bool, SqlRecordsError> {
            match self.steps.pop_front() {
                None => {
                    self.current = None;
                    Ok(false)
                }
                Some(Step::Row(values)) => {
                    self.current = Some(values);
                    Ok(true)
                }
                Some(Step::Fault(msg)) => Err(SqlRecordsError::ExecutionError(msg.to_string())),
            }
        }

        fn scan(&mut self, targets: &mut [ScanTarget]) -> Result<(), SqlRecordsError> {
            let values = self.current.take().ok_or_else(|| {
                SqlRecordsError::ExecutionError("no current row".to_string())
            })?;
            scan_into(values, &self.columns, targets)
        }

        fn close(&mut self) -> Result<(), SqlRecordsError> {
            self.closes.set(self.closes.get() + 1);
            if self.close_fails {
                return Err(SqlRecordsError::ExecutionError("close failed".to_string()));
            }
            Ok(())
        }
    }

    fn widgets(steps: Vec<Step>) -> ScriptedCursor {
        ScriptedCursor::new(
            &[("id", "INT"), ("sku", "VARCHAR"), ("weight", "FLOAT")],
            steps,
        )
    }

    fn widget(id: i64, sku: &str, weight: f64) -> Step {
        Step::Row(vec![
            NativeValue::Int(id),
            NativeValue::Bytes(sku.as_bytes().to_vec()),
            NativeValue::Float(weight),
        ])
    }

    #[test]
    fn rows_come_back_in_cursor_order() {
        let cursor = widgets(vec![
            widget(1, "WIDG1", 12.3),
            widget(2, "WIDG2", 34.5),
            widget(3, "WIDG3", 1.23),
        ]);
        let closes = Rc::clone(&cursor.closes);
        let rs = walk(cursor).unwrap();
        assert_eq!(rs.len(), 3);
        let ids: Vec<i64> = rs.iter().filter_map(|r| r.get("id")?.as_int()).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(rs.results[2].get("weight"), Some(&Value::Float(1.23)));
        assert_eq!(
            rs.results[1].get("sku"),
            Some(&Value::Text("WIDG2".to_string()))
        );
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn all_null_row_keeps_every_key() {
        let cursor = widgets(vec![Step::Row(vec![
            NativeValue::Null,
            NativeValue::Null,
            NativeValue::Null,
        ])]);
        let rs = walk(cursor).unwrap();
        let record = rs.first().unwrap();
        for name in ["id", "sku", "weight"] {
            assert_eq!(record.get(name), Some(&Value::Null), "{name}");
        }
    }

    #[test]
    fn empty_cursor_is_an_empty_result() {
        let cursor = widgets(vec![]);
        let closes = Rc::clone(&cursor.closes);
        let rs = walk(cursor).unwrap();
        assert!(rs.is_empty());
        assert_eq!(rs.get_column_names().map(|c| c.len()), Some(3));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn bad_row_discards_everything_and_closes_once() {
        let cursor = widgets(vec![
            widget(1, "WIDG1", 12.3),
            Step::Row(vec![
                NativeValue::Text("not a number".into()),
                NativeValue::Null,
                NativeValue::Null,
            ]),
            widget(3, "WIDG3", 1.23),
        ]);
        let closes = Rc::clone(&cursor.closes);
        let err = walk(cursor).unwrap_err();
        assert!(matches!(err, SqlRecordsError::ScanError { ref column, .. } if column == "id"));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn short_row_is_a_count_mismatch() {
        let cursor = widgets(vec![Step::Row(vec![NativeValue::Int(1)])]);
        let err = walk(cursor).unwrap_err();
        assert!(matches!(
            err,
            SqlRecordsError::ColumnCountMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[test]
    fn iteration_fault_is_the_walk_error() {
        let cursor = widgets(vec![widget(1, "WIDG1", 12.3), Step::Fault("connection reset")]);
        let closes = Rc::clone(&cursor.closes);
        let err = walk(cursor).unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn close_error_does_not_mask_row_error() {
        let cursor = widgets(vec![Step::Fault("broken pipe")]).failing_close();
        let closes = Rc::clone(&cursor.closes);
        let err = walk(cursor).unwrap_err();
        assert!(err.to_string().contains("broken pipe"));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn close_error_surfaces_after_clean_walk() {
        let cursor = widgets(vec![widget(1, "WIDG1", 12.3)]).failing_close();
        let closes = Rc::clone(&cursor.closes);
        let err = walk(cursor).unwrap_err();
        assert!(err.to_string().contains("close failed"));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn fetch_one_reports_no_result() {
        let cursor = widgets(vec![]);
        let closes = Rc::clone(&cursor.closes);
        let err = fetch_one(cursor).unwrap_err();
        assert!(err.is_no_result());
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn fetch_one_takes_first_row() {
        let cursor = widgets(vec![widget(2, "WIDG2", 34.5), widget(3, "WIDG3", 1.23)]);
        let record = fetch_one(cursor).unwrap();
        assert_eq!(record.get("sku").and_then(Value::as_text), Some("WIDG2"));
    }

    #[test]
    fn guard_refuses_use_after_close() {
        let mut guard = CursorGuard::new(widgets(vec![widget(1, "WIDG1", 12.3)]));
        assert!(guard.advance().unwrap());
        guard.close().unwrap();
        guard.close().unwrap();
        assert!(matches!(guard.advance(), Err(SqlRecordsError::CursorClosed)));
        assert!(matches!(guard.columns(), Err(SqlRecordsError::CursorClosed)));
    }

    #[test]
    fn guard_tracks_terminal_states() {
        use crate::cursor::CursorState;

        let mut guard = CursorGuard::new(widgets(vec![widget(1, "WIDG1", 12.3)]));
        assert_eq!(guard.state(), CursorState::Open);
        assert!(guard.advance().unwrap());
        assert_eq!(guard.state(), CursorState::Reading);
        assert!(!guard.advance().unwrap());
        assert_eq!(guard.state(), CursorState::Exhausted);
        assert!(!guard.advance().unwrap());
        assert!(guard.current().is_err());

        let mut faulted = CursorGuard::new(widgets(vec![Step::Fault("boom")]));
        assert!(faulted.advance().is_err());
        assert_eq!(faulted.state(), CursorState::Faulted);
    }

    #[test]
    fn dropping_the_guard_closes_once() {
        let cursor = widgets(vec![widget(1, "WIDG1", 12.3)]);
        let closes = Rc::clone(&cursor.closes);
        {
            let mut guard = CursorGuard::new(cursor);
            assert!(guard.advance().unwrap());
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn layout_mismatch_fails_the_row() {
        let layout = RowLayout::new(
            vec!["a".into(), "b".into()],
            vec![crate::resolver::ScanKind::NullInt],
        );
        let mut cursor = widgets(vec![widget(1, "WIDG1", 1.0)]);
        assert!(cursor.advance().unwrap());
        assert!(matches!(
            materialize_row(&layout, &mut cursor),
            Err(SqlRecordsError::ColumnCountMismatch { .. })
        ));
    }
}
