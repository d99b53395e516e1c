//! Schema migration runner.
//!
//! Versions live in a one-row catalog table owned by this module's protocol
//! but created by the caller-supplied initial migration. A run reads the
//! current version, applies every newer migration inside one transaction,
//! bumps the version row through the statement executor, and commits.

use tracing::{debug, info};

use crate::error::DbError;
use crate::executor::exec;
use crate::params;
use crate::queryable::{Connection, Queryable, Transaction};
use crate::types::SqlValue;

/// Name of the version catalog table.
pub const MIGRATIONS_TABLE: &str = "migrations";

/// Lowest-numbered migration every schema starts with: creates the catalog
/// table and seeds version 1.
pub const INITIAL_MIGRATION: &str = "\
CREATE TABLE IF NOT EXISTS migrations (version BIGINT NOT NULL PRIMARY KEY);
INSERT INTO migrations VALUES (1);
";

/// One schema change: a positive version number and the literal DDL/DML body.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub sql: String,
}

impl Migration {
    #[must_use]
    pub fn new(version: i64, sql: impl Into<String>) -> Self {
        Self {
            version,
            sql: sql.into(),
        }
    }
}

/// Applies pending migrations exactly once each, in ascending version order.
pub struct Migrator<'db, C: Connection> {
    db: &'db mut C,
}

impl<'db, C: Connection> Migrator<'db, C> {
    pub fn new(db: &'db mut C) -> Self {
        Self { db }
    }

    /// Apply every supplied migration whose version is above the persisted
    /// one. The slice may arrive in any order; bodies run ascending by
    /// version, all inside a single transaction that also carries the version
    /// bump. A body failure rolls the whole batch back and reports the
    /// failing version.
    ///
    /// Known limitation: on databases where DDL auto-commits, a mid-batch
    /// failure can leave schema changes applied while the recorded version is
    /// not advanced, so the next run re-attempts them. The version bump stays
    /// after body execution on purpose; moving it earlier would instead skip
    /// failed migrations permanently.
    ///
    /// Concurrent runners are not coordinated here; serialize them externally
    /// (e.g. an advisory lock) when several processes may migrate the same
    /// database.
    ///
    /// # Errors
    ///
    /// [`DbError::DuplicateMigration`] before anything executes when two
    /// entries share a version; [`DbError::MigrationFailed`] when a body
    /// fails; version-read, version-update, or commit failures as reported.
    pub async fn run(&mut self, migrations: &[Migration]) -> Result<(), DbError> {
        let mut pending: Vec<&Migration> = migrations.iter().collect();
        pending.sort_by_key(|m| m.version);
        for window in pending.windows(2) {
            if window[0].version == window[1].version {
                return Err(DbError::DuplicateMigration(window[0].version));
            }
        }

        let mut latest = self.latest_version().await?;
        debug!(latest, "current schema version");

        let tx = self.db.begin().await?;
        let mut failure = None;
        for migration in pending {
            if migration.version <= latest {
                continue;
            }
            info!(version = migration.version, "applying migration");
            match tx.execute_batch(&migration.sql).await {
                Ok(()) => latest = migration.version,
                Err(cause) => {
                    failure = Some(DbError::MigrationFailed {
                        version: migration.version,
                        cause: Box::new(cause),
                    });
                    break;
                }
            }
        }

        match failure {
            None => {
                exec(
                    &tx,
                    "UPDATE migrations SET version = :latest",
                    &params! { "latest" => latest },
                )
                .await?;
                tx.commit().await
            }
            // dropping the transaction without commit rolls the batch back
            Some(err) => Err(err),
        }
    }

    /// Current persisted version; a missing catalog table or an empty table
    /// reads as 0.
    async fn latest_version(&self) -> Result<i64, DbError> {
        match self.db.query_opt("SELECT version FROM migrations").await {
            Ok(Some(row)) => Ok(row
                .get_by_index(0)
                .and_then(SqlValue::as_int)
                .copied()
                .unwrap_or(0)),
            Ok(None) => Ok(0),
            Err(err) if err.is_undefined_table(MIGRATIONS_TABLE) => Ok(0),
            Err(err) => Err(err),
        }
    }
}
