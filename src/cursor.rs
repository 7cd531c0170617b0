//! The narrow cursor interface backends implement, and the guard that
//! enforces its lifecycle.

use tracing::warn;

use crate::error::SqlRecordsError;
use crate::materialize::ScanTarget;

/// Name and reported native type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Upper-case type name as the backend reports it; empty when unknown.
    pub type_name: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A single-pass, single-owner cursor over the rows of one query.
///
/// Backends implement this over their driver's row iterator.
pub trait Cursor {
    /// Column metadata, in result order.
    ///
    /// # Errors
    ///
    /// Returns the backend error if metadata cannot be read.
    fn columns(&self) -> Result<Vec<ColumnDescriptor>, SqlRecordsError>;

    /// Move to the next row. `Ok(false)` means the rows ran out; `Err` means
    /// the walk stopped on a transport or protocol fault.
    ///
    /// # Errors
    ///
    /// Returns the fault that ended iteration.
    fn advance(&mut self) -> Result<bool, SqlRecordsError>;

    /// Populate one target per column from the current row, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `ColumnCountMismatch` when `targets` does not match the row
    /// width, or the `ScanError` of the first column that does not fit.
    fn scan(&mut self, targets: &mut [ScanTarget]) -> Result<(), SqlRecordsError>;

    /// Release the cursor's driver resources.
    ///
    /// # Errors
    ///
    /// Returns the backend error raised while releasing.
    fn close(&mut self) -> Result<(), SqlRecordsError>;
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn columns(&self) -> Result<Vec<ColumnDescriptor>, SqlRecordsError> {
        (**self).columns()
    }

    fn advance(&mut self) -> Result<bool, SqlRecordsError> {
        (**self).advance()
    }

    fn scan(&mut self, targets: &mut [ScanTarget]) -> Result<(), SqlRecordsError> {
        (**self).scan(targets)
    }

    fn close(&mut self) -> Result<(), SqlRecordsError> {
        (**self).close()
    }
}

/// Lifecycle of a cursor: `Open -> Reading* -> Exhausted | Faulted -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Open,
    Reading,
    Exhausted,
    Faulted,
    Closed,
}

/// Scoped ownership of a cursor.
///
/// Tracks the state machine, refuses use after close, and closes the cursor
/// exactly once: explicitly through [`CursorGuard::close`], or on drop.
pub struct CursorGuard<C: Cursor> {
    cursor: C,
    state: CursorState,
}

impl<C: Cursor> CursorGuard<C> {
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            state: CursorState::Open,
        }
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        self.state
    }

    fn ensure_open(&self) -> Result<(), SqlRecordsError> {
        if self.state == CursorState::Closed {
            return Err(SqlRecordsError::CursorClosed);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// `CursorClosed` after close, otherwise the backend's metadata error.
    pub fn columns(&self) -> Result<Vec<ColumnDescriptor>, SqlRecordsError> {
        self.ensure_open()?;
        self.cursor.columns()
    }

    /// Advance to the next row, recording `Exhausted` or `Faulted` at the end.
    ///
    /// # Errors
    ///
    /// `CursorClosed` after close, otherwise the fault that ended iteration.
    pub fn advance(&mut self) -> Result<bool, SqlRecordsError> {
        self.ensure_open()?;
        match self.state {
            CursorState::Exhausted => return Ok(false),
            CursorState::Faulted => {
                return Err(SqlRecordsError::ExecutionError(
                    "cursor already stopped on an error".to_string(),
                ));
            }
            _ => {}
        }
        match self.cursor.advance() {
            Ok(true) => {
                self.state = CursorState::Reading;
                Ok(true)
            }
            Ok(false) => {
                self.state = CursorState::Exhausted;
                Ok(false)
            }
            Err(e) => {
                self.state = CursorState::Faulted;
                Err(e)
            }
        }
    }

    /// Mutable access to the cursor while it is positioned on a row.
    ///
    /// # Errors
    ///
    /// `CursorClosed` after close; `ExecutionError` when no row is current.
    pub fn current(&mut self) -> Result<&mut C, SqlRecordsError> {
        self.ensure_open()?;
        if self.state != CursorState::Reading {
            return Err(SqlRecordsError::ExecutionError(
                "cursor is not positioned on a row".to_string(),
            ));
        }
        Ok(&mut self.cursor)
    }

    /// Close the cursor. Later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the backend's close error from the first call.
    pub fn close(&mut self) -> Result<(), SqlRecordsError> {
        if self.state == CursorState::Closed {
            return Ok(());
        }
        self.state = CursorState::Closed;
        self.cursor.close()
    }

    /// Close while another error is already on its way out; the close error
    /// is logged rather than replacing `err`.
    pub fn close_after(&mut self, err: SqlRecordsError) -> SqlRecordsError {
        if let Err(close_err) = self.close() {
            warn!(error = %close_err, original = %err, "failed to close cursor after error");
        }
        err
    }
}

impl<C: Cursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close cursor on drop");
        }
    }
}
