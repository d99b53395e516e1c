//! The seam to the external connection collaborator.
//!
//! The statement executor and the migration runner only ever talk to these
//! traits, so they run unchanged over a live client, a transaction, or a test
//! double. Implementations for `tokio_postgres` live in [`crate::postgres`].

use async_trait::async_trait;

use crate::error::DbError;
use crate::results::{ResultSet, Row};

/// Operations shared by a connection and a transaction, mirroring what the
/// underlying client exposes. All inputs are final literal SQL; no bound
/// parameters pass through here.
#[async_trait]
pub trait Queryable: Send + Sync {
    /// Run a statement for effect, returning the number of rows affected.
    ///
    /// # Errors
    ///
    /// Any failure reported by the underlying client.
    async fn execute(&self, sql: &str) -> Result<u64, DbError>;

    /// Run one or more semicolon-separated statements, discarding results.
    ///
    /// # Errors
    ///
    /// Any failure reported by the underlying client.
    async fn execute_batch(&self, sql: &str) -> Result<(), DbError>;

    /// Run a query and materialize every row.
    ///
    /// # Errors
    ///
    /// Any failure reported by the underlying client.
    async fn query(&self, sql: &str) -> Result<ResultSet, DbError>;

    /// Run a query expected to produce at most one row.
    ///
    /// # Errors
    ///
    /// Any failure reported by the underlying client; zero rows is `Ok(None)`,
    /// not an error, at this layer.
    async fn query_opt(&self, sql: &str) -> Result<Option<Row>, DbError>;
}

/// A connection that can open transactions.
#[async_trait]
pub trait Connection: Queryable {
    type Tx<'a>: Transaction + Send + 'a
    where
        Self: 'a;

    /// Begin a transaction. The returned handle borrows the connection until
    /// committed, rolled back, or dropped.
    ///
    /// # Errors
    ///
    /// Any failure reported by the underlying client.
    async fn begin<'a>(&'a mut self) -> Result<Self::Tx<'a>, DbError>;
}

/// An open transaction. Dropping the handle without committing rolls the
/// transaction back.
#[async_trait]
pub trait Transaction: Queryable {
    /// # Errors
    ///
    /// Any failure reported by the underlying client.
    async fn commit(self) -> Result<(), DbError>;

    /// # Errors
    ///
    /// Any failure reported by the underlying client.
    async fn rollback(self) -> Result<(), DbError>;
}
