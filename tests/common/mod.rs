//! In-memory stand-in for the connection collaborator.
//!
//! Records every statement that reaches it, serves scripted rows, simulates
//! the version catalog table, and stages transactional work so tests can
//! observe commit/rollback behavior without a live database.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sql_template::{Connection, DbError, Queryable, ResultSet, Row, SqlValue, Transaction};

#[derive(Debug, Default)]
struct FakeState {
    /// Every statement that reached the collaborator, in order.
    log: Vec<String>,
    /// Committed version row; `None` means the catalog table does not exist.
    version: Option<i64>,
    /// Committed migration bodies, in application order.
    applied: Vec<String>,
    /// Scripted result rows served to queries.
    rows: Vec<Row>,
    /// Any statement containing this fragment fails.
    fail_contains: Option<String>,
    committed: bool,
    rolled_back: bool,
}

#[derive(Debug, Default)]
pub struct FakeDb {
    state: Mutex<FakeState>,
}

#[derive(Debug, Default)]
struct Staged {
    version: Option<i64>,
    applied: Vec<String>,
}

pub struct FakeTx<'a> {
    db: &'a FakeDb,
    staged: Mutex<Staged>,
}

pub fn row(columns: &[&str], values: Vec<SqlValue>) -> Row {
    Row::new(
        Arc::new(columns.iter().map(|c| (*c).to_string()).collect()),
        values,
    )
}

impl FakeDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database whose version catalog already holds `version`.
    pub fn with_version(version: i64) -> Self {
        let db = Self::default();
        db.state.lock().unwrap().version = Some(version);
        db
    }

    pub fn push_row(&self, row: Row) {
        self.state.lock().unwrap().rows.push(row);
    }

    /// Make any statement containing `fragment` fail.
    pub fn fail_on(&self, fragment: &str) {
        self.state.lock().unwrap().fail_contains = Some(fragment.to_string());
    }

    pub fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn version(&self) -> Option<i64> {
        self.state.lock().unwrap().version
    }

    pub fn applied(&self) -> Vec<String> {
        self.state.lock().unwrap().applied.clone()
    }

    pub fn committed(&self) -> bool {
        self.state.lock().unwrap().committed
    }

    pub fn rolled_back(&self) -> bool {
        self.state.lock().unwrap().rolled_back
    }

    fn record(&self, sql: &str) {
        self.state.lock().unwrap().log.push(sql.to_string());
    }

    fn check_fail(&self, sql: &str) -> Result<(), DbError> {
        let state = self.state.lock().unwrap();
        if let Some(fragment) = &state.fail_contains
            && sql.contains(fragment)
        {
            return Err(DbError::Execution("injected failure".to_string()));
        }
        Ok(())
    }

    fn scripted_result_set(&self) -> ResultSet {
        let rows = self.state.lock().unwrap().rows.clone();
        let mut result_set = ResultSet::with_capacity(rows.len());
        for row in rows {
            result_set.add_row(row);
        }
        result_set
    }

    fn version_row(&self, version: Option<i64>) -> Result<Option<Row>, DbError> {
        match version {
            Some(version) => Ok(Some(row(&["version"], vec![SqlValue::Int(version)]))),
            None => Err(DbError::Execution(
                "relation \"migrations\" does not exist".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Queryable for FakeDb {
    async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        self.record(sql);
        self.check_fail(sql)?;
        Ok(1)
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.record(sql);
        self.check_fail(sql)?;
        self.state.lock().unwrap().applied.push(sql.to_string());
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<ResultSet, DbError> {
        self.record(sql);
        self.check_fail(sql)?;
        Ok(self.scripted_result_set())
    }

    async fn query_opt(&self, sql: &str) -> Result<Option<Row>, DbError> {
        self.record(sql);
        self.check_fail(sql)?;
        if sql.contains("FROM migrations") {
            let version = self.state.lock().unwrap().version;
            return self.version_row(version);
        }
        Ok(self.scripted_result_set().rows.into_iter().next())
    }
}

#[async_trait]
impl Connection for FakeDb {
    type Tx<'a>
        = FakeTx<'a>
    where
        Self: 'a;

    async fn begin<'a>(&'a mut self) -> Result<Self::Tx<'a>, DbError> {
        self.record("BEGIN");
        Ok(FakeTx {
            db: self,
            staged: Mutex::new(Staged::default()),
        })
    }
}

#[async_trait]
impl Queryable for FakeTx<'_> {
    async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        self.db.record(sql);
        self.db.check_fail(sql)?;
        if let Some(rest) = sql.strip_prefix("UPDATE migrations SET version = ") {
            let version = rest
                .trim()
                .parse::<i64>()
                .map_err(|e| DbError::Execution(format!("bad version literal: {e}")))?;
            self.staged.lock().unwrap().version = Some(version);
        }
        Ok(1)
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.db.record(sql);
        self.db.check_fail(sql)?;
        self.staged.lock().unwrap().applied.push(sql.to_string());
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<ResultSet, DbError> {
        self.db.record(sql);
        self.db.check_fail(sql)?;
        Ok(self.db.scripted_result_set())
    }

    async fn query_opt(&self, sql: &str) -> Result<Option<Row>, DbError> {
        self.db.record(sql);
        self.db.check_fail(sql)?;
        if sql.contains("FROM migrations") {
            let staged = self.staged.lock().unwrap().version;
            let version = staged.or(self.db.state.lock().unwrap().version);
            return self.db.version_row(version);
        }
        Ok(self.db.scripted_result_set().rows.into_iter().next())
    }
}

#[async_trait]
impl Transaction for FakeTx<'_> {
    async fn commit(self) -> Result<(), DbError> {
        let staged = self.staged.into_inner().unwrap();
        let mut state = self.db.state.lock().unwrap();
        state.log.push("COMMIT".to_string());
        if let Some(version) = staged.version {
            state.version = Some(version);
        }
        state.applied.extend(staged.applied);
        state.committed = true;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbError> {
        let mut state = self.db.state.lock().unwrap();
        state.log.push("ROLLBACK".to_string());
        state.rolled_back = true;
        Ok(())
    }
}
