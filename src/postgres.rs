//! `tokio_postgres` implementations of the collaborator traits, plus
//! materialization of driver rows into [`ResultSet`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use tokio_postgres::{Client, Row as PgRow, Transaction as PgTransaction};

use crate::error::DbError;
use crate::queryable::{Connection, Queryable, Transaction};
use crate::results::{ResultSet, Row};
use crate::types::SqlValue;

/// Build a result set from driver rows. Column names are taken from the
/// first row and shared across the set; an empty query yields an empty set.
///
/// # Errors
///
/// Returns [`DbError::Postgres`] when a column value cannot be extracted.
pub fn build_result_set(pg_rows: &[PgRow]) -> Result<ResultSet, DbError> {
    let mut result_set = ResultSet::with_capacity(pg_rows.len());
    let Some(first) = pg_rows.first() else {
        return Ok(result_set);
    };
    let columns = Arc::new(
        first
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect::<Vec<String>>(),
    );
    for pg_row in pg_rows {
        result_set.add_row(row_with_columns(columns.clone(), pg_row)?);
    }
    Ok(result_set)
}

fn convert_row(pg_row: &PgRow) -> Result<Row, DbError> {
    let columns = Arc::new(
        pg_row
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect::<Vec<String>>(),
    );
    row_with_columns(columns, pg_row)
}

fn row_with_columns(columns: Arc<Vec<String>>, pg_row: &PgRow) -> Result<Row, DbError> {
    let mut values = Vec::with_capacity(pg_row.len());
    for idx in 0..pg_row.len() {
        values.push(extract_value(pg_row, idx)?);
    }
    Ok(Row::new(columns, values))
}

/// Extract one column as a [`SqlValue`], dispatching on the declared type.
/// Unknown types fall back to a string read.
fn extract_value(pg_row: &PgRow, idx: usize) -> Result<SqlValue, DbError> {
    let value = match pg_row.columns()[idx].type_().name() {
        "int2" => pg_row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "int4" => pg_row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "int8" => pg_row.try_get::<_, Option<i64>>(idx)?.map(SqlValue::Int),
        "float4" => pg_row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| SqlValue::Float(f64::from(v))),
        "float8" => pg_row.try_get::<_, Option<f64>>(idx)?.map(SqlValue::Float),
        "bool" => pg_row.try_get::<_, Option<bool>>(idx)?.map(SqlValue::Bool),
        "numeric" => pg_row
            .try_get::<_, Option<Decimal>>(idx)?
            .map(SqlValue::Decimal),
        "timestamptz" => pg_row
            .try_get::<_, Option<DateTime<FixedOffset>>>(idx)?
            .map(SqlValue::Timestamp),
        "timestamp" => pg_row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| SqlValue::Timestamp(v.and_utc().fixed_offset())),
        "json" | "jsonb" => pg_row
            .try_get::<_, Option<JsonValue>>(idx)?
            .map(SqlValue::Json),
        _ => pg_row.try_get::<_, Option<String>>(idx)?.map(SqlValue::Text),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

#[async_trait]
impl Queryable for Client {
    async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        Ok(Client::execute(self, sql, &[]).await?)
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        Ok(Client::batch_execute(self, sql).await?)
    }

    async fn query(&self, sql: &str) -> Result<ResultSet, DbError> {
        let pg_rows = Client::query(self, sql, &[]).await?;
        build_result_set(&pg_rows)
    }

    async fn query_opt(&self, sql: &str) -> Result<Option<Row>, DbError> {
        match Client::query_opt(self, sql, &[]).await? {
            Some(pg_row) => Ok(Some(convert_row(&pg_row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Queryable for PgTransaction<'_> {
    async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        Ok(PgTransaction::execute(self, sql, &[]).await?)
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        Ok(PgTransaction::batch_execute(self, sql).await?)
    }

    async fn query(&self, sql: &str) -> Result<ResultSet, DbError> {
        let pg_rows = PgTransaction::query(self, sql, &[]).await?;
        build_result_set(&pg_rows)
    }

    async fn query_opt(&self, sql: &str) -> Result<Option<Row>, DbError> {
        match PgTransaction::query_opt(self, sql, &[]).await? {
            Some(pg_row) => Ok(Some(convert_row(&pg_row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Connection for Client {
    type Tx<'a>
        = PgTransaction<'a>
    where
        Self: 'a;

    async fn begin<'a>(&'a mut self) -> Result<Self::Tx<'a>, DbError> {
        Ok(self.transaction().await?)
    }
}

#[async_trait]
impl Transaction for PgTransaction<'_> {
    async fn commit(self) -> Result<(), DbError> {
        Ok(PgTransaction::commit(self).await?)
    }

    async fn rollback(self) -> Result<(), DbError> {
        Ok(PgTransaction::rollback(self).await?)
    }
}
