//! Named-placeholder SQL templating with literal encoding, plus a minimal
//! schema migration runner.
//!
//! A template holds `:name` placeholders; a [`Params`] map supplies typed
//! values; rendering produces one final literal SQL string. The driver's
//! bound-parameter machinery is never involved:
//!
//! ```rust
//! use sql_template::{params, substitute};
//!
//! let sql = substitute(
//!     "UPDATE users SET name = :name WHERE id = :id",
//!     &params! { "id" => 42, "name" => "O'Brien" },
//! )?;
//! assert_eq!(sql, "UPDATE users SET name = 'O''Brien' WHERE id = 42");
//! # Ok::<(), sql_template::DbError>(())
//! ```
//!
//! The executor in [`executor`] runs rendered statements against anything
//! implementing [`Queryable`] (a `tokio_postgres` client or transaction out
//! of the box), and [`migrate::Migrator`] applies ordered schema migrations
//! exactly once each, tracked in a version table in the database itself.

pub mod error;
pub mod executor;
pub mod literal;
pub mod migrate;
pub mod postgres;
pub mod prelude;
pub mod queryable;
pub mod results;
pub mod template;
pub mod types;

pub use error::{DbError, StatementError};
pub use executor::{
    decode_json_column, exec, query, query_json_row, query_json_rows, query_row, query_row_as,
};
pub use migrate::{INITIAL_MIGRATION, MIGRATIONS_TABLE, Migration, Migrator};
pub use queryable::{Connection, Queryable, Transaction};
pub use results::{FromRow, ResultSet, Row};
pub use template::substitute;
pub use types::{Params, SqlValue};
