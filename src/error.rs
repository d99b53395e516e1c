use thiserror::Error;
use tokio_postgres::error::SqlState;

use crate::types::Params;

/// Errors produced while rendering or executing a statement.
#[derive(Debug, Error)]
pub enum DbError {
    /// A template placeholder has no entry in the parameter map. Detected
    /// during rendering, before anything reaches the database.
    #[error("parameter {0} is missing")]
    MissingParameter(String),

    /// JSON serialization of a structured parameter failed.
    #[error(transparent)]
    Encoding(#[from] serde_json::Error),

    /// The underlying driver rejected or failed to run a statement.
    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),

    /// A single-row query matched nothing. Never wrapped in
    /// [`DbError::Statement`], so callers can test for it directly.
    #[error("query returned no rows")]
    NoRows,

    /// Failure reported by a non-driver collaborator (e.g. a test double).
    #[error("SQL execution error: {0}")]
    Execution(String),

    /// A migration body failed mid-batch; the surrounding transaction was
    /// rolled back.
    #[error("migration {version} failed")]
    MigrationFailed {
        version: i64,
        #[source]
        cause: Box<DbError>,
    },

    /// Two supplied migrations carry the same version number.
    #[error("duplicate migration version {0}")]
    DuplicateMigration(i64),

    /// A failure wrapped with the originating template and parameters.
    #[error(transparent)]
    Statement(Box<StatementError>),
}

/// Context attached to render/execution failures: the original template text
/// and the parameter map, kept alongside the cause for diagnostics.
#[derive(Debug, Error)]
#[error("{cause}; query: {query}; params: {params:?}")]
pub struct StatementError {
    pub query: String,
    pub params: Params,
    #[source]
    pub cause: DbError,
}

impl DbError {
    /// True for the undecorated no-rows condition.
    #[must_use]
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    /// Wrap this error with the statement that produced it. [`DbError::NoRows`]
    /// passes through untouched so identity checks against it keep working.
    #[must_use]
    pub fn with_statement(self, query: &str, params: &Params) -> DbError {
        match self {
            Self::NoRows => Self::NoRows,
            cause => Self::Statement(Box::new(StatementError {
                query: query.to_string(),
                params: params.clone(),
                cause,
            })),
        }
    }

    /// The failing migration's version, if this is a migration failure.
    #[must_use]
    pub fn failed_migration(&self) -> Option<i64> {
        match self {
            Self::MigrationFailed { version, .. } => Some(*version),
            _ => None,
        }
    }

    /// Whether this error means `table` does not exist. Driver errors carry
    /// the structured `undefined_table` SQLSTATE; opaque collaborator errors
    /// fall back to a message match on the table name.
    pub(crate) fn is_undefined_table(&self, table: &str) -> bool {
        match self {
            Self::Postgres(e) => e.code() == Some(&SqlState::UNDEFINED_TABLE),
            Self::Execution(message) => message.contains(table),
            Self::Statement(inner) => inner.cause.is_undefined_table(table),
            _ => false,
        }
    }
}
