//! The statement execution façade.
//!
//! Each operation renders a template into final literal SQL (see
//! [`crate::template::substitute`]) and forwards it to the collaborator. On a
//! render failure nothing reaches the collaborator. Failures are wrapped with
//! the originating template and parameters ([`crate::StatementError`]);
//! [`DbError::NoRows`] alone passes through untouched so callers can test for
//! it directly.
//!
//! Cancellation follows the async call model: every operation is a future
//! awaiting the collaborator, so callers abort in flight by dropping it
//! (`tokio::time::timeout`, `select!`). Rendering itself is CPU-bound and
//! runs to completion.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DbError;
use crate::queryable::Queryable;
use crate::results::{FromRow, ResultSet, Row};
use crate::template::substitute;
use crate::types::{Params, SqlValue};

/// Render `template` with `params` and execute it for effect.
///
/// # Errors
///
/// Render or execution failures, wrapped with the template and parameters.
pub async fn exec<Q>(db: &Q, template: &str, params: &Params) -> Result<u64, DbError>
where
    Q: Queryable + ?Sized,
{
    let rendered = render(template, params)?;
    db.execute(&rendered)
        .await
        .map_err(|e| e.with_statement(template, params))
}

/// Render `template` with `params` and run it as a row-returning query.
///
/// # Errors
///
/// Render or execution failures, wrapped with the template and parameters.
pub async fn query<Q>(db: &Q, template: &str, params: &Params) -> Result<ResultSet, DbError>
where
    Q: Queryable + ?Sized,
{
    let rendered = render(template, params)?;
    db.query(&rendered)
        .await
        .map_err(|e| e.with_statement(template, params))
}

/// Render `template` with `params` and run it as a single-row query.
///
/// # Errors
///
/// [`DbError::NoRows`] (unwrapped) when the query matches nothing; render or
/// execution failures are wrapped with the template and parameters.
pub async fn query_row<Q>(db: &Q, template: &str, params: &Params) -> Result<Row, DbError>
where
    Q: Queryable + ?Sized,
{
    let rendered = render(template, params)?;
    match db.query_opt(&rendered).await {
        Ok(Some(row)) => Ok(row),
        Ok(None) => Err(DbError::NoRows),
        Err(e) => Err(e.with_statement(template, params)),
    }
}

/// Run a single-row query and scan the row into a typed destination.
///
/// # Errors
///
/// As [`query_row`]; a [`FromRow`] shape mismatch is wrapped with the
/// template and parameters.
pub async fn query_row_as<T, Q>(db: &Q, template: &str, params: &Params) -> Result<T, DbError>
where
    T: FromRow,
    Q: Queryable + ?Sized,
{
    let row = query_row(db, template, params).await?;
    T::from_row(&row).map_err(|e| e.with_statement(template, params))
}

/// Run a single-row query and decode its first column (a JSON value or JSON
/// text) into `T`.
///
/// # Errors
///
/// As [`query_row`]; decode failures are wrapped with the template and
/// parameters.
pub async fn query_json_row<T, Q>(db: &Q, template: &str, params: &Params) -> Result<T, DbError>
where
    T: DeserializeOwned,
    Q: Queryable + ?Sized,
{
    let row = query_row(db, template, params).await?;
    decode_json_column(&row).map_err(|e| e.with_statement(template, params))
}

/// Run a query and decode the first column of every row into a `Vec<T>`.
///
/// # Errors
///
/// As [`query`]; per-row decode failures are wrapped with the template and
/// parameters.
pub async fn query_json_rows<T, Q>(
    db: &Q,
    template: &str,
    params: &Params,
) -> Result<Vec<T>, DbError>
where
    T: DeserializeOwned,
    Q: Queryable + ?Sized,
{
    let result_set = query(db, template, params).await?;
    let mut decoded = Vec::with_capacity(result_set.rows.len());
    for row in &result_set.rows {
        decoded.push(decode_json_column(row).map_err(|e| e.with_statement(template, params))?);
    }
    Ok(decoded)
}

fn render(template: &str, params: &Params) -> Result<String, DbError> {
    let rendered =
        substitute(template, params).map_err(|e| e.with_statement(template, params))?;
    debug!(template, "rendered statement");
    Ok(rendered)
}

/// Decode the first column of one materialized row (a JSON value or JSON
/// text) into `T`. The per-row building block behind [`query_json_rows`],
/// usable directly when iterating rows by hand.
///
/// # Errors
///
/// [`DbError::Encoding`] on malformed JSON; [`DbError::Execution`] when the
/// column is absent or not JSON-shaped.
pub fn decode_json_column<T: DeserializeOwned>(row: &Row) -> Result<T, DbError> {
    match row.get_by_index(0) {
        Some(SqlValue::Json(value)) => Ok(serde_json::from_value(value.clone())?),
        Some(SqlValue::Text(text)) => Ok(serde_json::from_str(text)?),
        Some(other) => Err(DbError::Execution(format!(
            "expected a JSON column, got {other:?}"
        ))),
        None => Err(DbError::Execution(
            "query produced a row without columns".to_string(),
        )),
    }
}
