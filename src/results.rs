use std::sync::Arc;

use crate::error::DbError;
use crate::types::SqlValue;

/// A single row from a query result.
///
/// Column names are shared across all rows of a result set.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<SqlValue>,
}

impl Row {
    #[must_use]
    pub fn new(columns: Arc<Vec<String>>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Index of a column by name, if present.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Value under a column name, or `None` when the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.column_index(column).and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Like [`Row::get`], but a missing column is an error. Handy for
    /// [`FromRow`] implementations.
    ///
    /// # Errors
    ///
    /// [`DbError::Execution`] naming the missing column.
    pub fn require(&self, column: &str) -> Result<&SqlValue, DbError> {
        self.get(column)
            .ok_or_else(|| DbError::Execution(format!("column {column} is missing from the row")))
    }
}

/// Materialized rows plus the affected-row count for DML statements.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub rows: Vec<Row>,
    pub rows_affected: u64,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            rows: Vec::with_capacity(capacity),
            rows_affected: 0,
        }
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
        self.rows_affected += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Contract for writing a row into a caller-provided typed destination.
///
/// Row-to-structure mapping stays outside this crate; implementors decide how
/// fields line up with columns and return an error on shape mismatch.
pub trait FromRow: Sized {
    /// # Errors
    ///
    /// Implementations report missing columns or kind mismatches as
    /// [`DbError`].
    fn from_row(row: &Row) -> Result<Self, DbError>;
}
