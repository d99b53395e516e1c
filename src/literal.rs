//! Value-to-literal encoding.
//!
//! Everything here is pure text production: a [`SqlValue`] goes in, the exact
//! literal syntax the database parser accepts comes out. No placeholder is
//! ever forwarded to the driver as a bound parameter.

use chrono::{DateTime, FixedOffset};

use crate::error::DbError;
use crate::types::SqlValue;

/// Escape `text` into a safe quoted SQL string literal.
///
/// Embedded single quotes and backslashes are doubled. When at least one
/// backslash is present the literal gets the escape-string marker (`E'...'`)
/// so the doubled backslashes read back literally; otherwise the plain
/// `'...'` form is used.
///
/// ```rust
/// use sql_template::literal::quote_literal;
///
/// assert_eq!(quote_literal("alice"), "'alice'");
/// assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
/// assert_eq!(quote_literal(r"a\b"), r"E'a\\b'");
/// ```
#[must_use]
pub fn quote_literal(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    // Scan by code point, never by byte; a multi-byte character must not be
    // split while looking for quote/backslash characters.
    if text.contains('\\') {
        quoted.push('E');
    }
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str(r"\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Render a timestamp in the `YYYY-MM-DD HH:MM:SS[.fraction]±HH:MM` layout.
///
/// The fractional part is omitted when zero, otherwise printed with up to
/// nine digits and trailing zeros trimmed.
#[must_use]
pub fn format_timestamp(ts: DateTime<FixedOffset>) -> String {
    let mut text = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    let nanos = ts.timestamp_subsec_nanos();
    if nanos > 0 {
        let digits = format!("{nanos:09}");
        text.push('.');
        text.push_str(digits.trim_end_matches('0'));
    }
    text.push_str(&ts.format("%:z").to_string());
    text
}

/// Convert one value into its SQL literal textual representation.
///
/// List values encode each element recursively and join them with `", "`;
/// an empty list encodes to an empty string, not `NULL`. Structured values
/// are marshaled to JSON and quoted, with the JSON `null` literal collapsing
/// to SQL `NULL`.
///
/// # Errors
///
/// Returns [`DbError::Encoding`] when JSON serialization of a structured
/// value fails. No partial output is produced.
pub fn encode(value: &SqlValue) -> Result<String, DbError> {
    match value {
        SqlValue::Null => Ok("NULL".to_string()),
        SqlValue::Text(text) => Ok(quote_literal(text)),
        SqlValue::Int(value) => Ok(value.to_string()),
        SqlValue::Float(value) => Ok(value.to_string()),
        SqlValue::Bool(value) => Ok(value.to_string()),
        SqlValue::Decimal(value) => Ok(value.to_string()),
        SqlValue::Timestamp(ts) => Ok(quote_literal(&format_timestamp(*ts))),
        SqlValue::List(items) => {
            let encoded: Vec<String> = items.iter().map(encode).collect::<Result<_, _>>()?;
            Ok(encoded.join(", "))
        }
        SqlValue::Json(json) => {
            if json.is_null() {
                return Ok("NULL".to_string());
            }
            Ok(quote_literal(&serde_json::to_string(json)?))
        }
    }
}
