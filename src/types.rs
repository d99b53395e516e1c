use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::DbError;

/// A typed parameter value, rendered into a SQL literal by [`crate::literal::encode`].
///
/// One enum covers every kind of value a template parameter can hold, so the
/// encoder can dispatch on the variant instead of inspecting native types at
/// runtime:
/// ```rust
/// use sql_template::SqlValue;
///
/// let values = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Text/string value, quoted on encode
    Text(String),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Arbitrary-precision decimal, encoded in its exact string form
    Decimal(Decimal),
    /// Timestamp with timezone offset
    Timestamp(DateTime<FixedOffset>),
    /// Ordered list, expanded to a comma-joined sequence of literals
    List(Vec<SqlValue>),
    /// Structured value, encoded through its JSON representation
    Json(JsonValue),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert any serializable value into the JSON fallback variant.
    ///
    /// This is the boundary where structured native values (sequences,
    /// records, maps) enter the parameter model.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Encoding`] when serialization fails (e.g. a map
    /// with non-string keys).
    pub fn json<T: Serialize>(value: &T) -> Result<Self, DbError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Build a [`SqlValue::List`] from any iterable of convertible values.
    pub fn list<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let SqlValue::Bool(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<&Decimal> {
        if let SqlValue::Decimal(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        if let SqlValue::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let SqlValue::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[SqlValue]> {
        if let SqlValue::List(values) = self {
            Some(values)
        } else {
            None
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<DateTime<FixedOffset>> for SqlValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value.fixed_offset())
    }
}

impl From<JsonValue> for SqlValue {
    fn from(value: JsonValue) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<SqlValue>> for SqlValue {
    fn from(value: Vec<SqlValue>) -> Self {
        Self::List(value)
    }
}

/// A nullable wrapper: `None` of any convertible kind renders as SQL NULL
/// without further conversion.
impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

/// Named parameters for a SQL template.
///
/// Keys are unique and case-sensitive; insertion order is irrelevant to
/// substitution. The map is cloned into [`crate::StatementError`] on failure,
/// so it stays cheap and deterministic to print.
///
/// ```rust
/// use sql_template::{Params, params};
///
/// let params = params! {
///     "name" => "alice",
///     "age" => 42,
/// };
/// assert!(params.get("name").is_some());
/// # let _: Params = params;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, SqlValue>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a parameter, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.0.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Build a [`Params`] map from `name => value` pairs.
///
/// Values go through `Into<SqlValue>`, so native scalars, options, and
/// pre-built [`SqlValue`]s all work:
/// ```rust
/// use sql_template::{SqlValue, params};
///
/// let p = params! {
///     "id" => 7,
///     "note" => Option::<&str>::None,
///     "tags" => SqlValue::list(["a", "b"]),
/// };
/// assert_eq!(p.get("note"), Some(&SqlValue::Null));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $( params.insert($name, $value); )+
        params
    }};
}
