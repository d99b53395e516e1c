//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::error::{DbError, StatementError};
pub use crate::executor::{
    decode_json_column, exec, query, query_json_row, query_json_rows, query_row, query_row_as,
};
pub use crate::literal::{encode, quote_literal};
pub use crate::migrate::{INITIAL_MIGRATION, MIGRATIONS_TABLE, Migration, Migrator};
pub use crate::queryable::{Connection, Queryable, Transaction};
pub use crate::results::{FromRow, ResultSet, Row};
pub use crate::template::substitute;
pub use crate::types::{Params, SqlValue};
