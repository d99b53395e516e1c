//! Named-placeholder substitution.
//!
//! Scanning is purely lexical; no SQL grammar is involved. Every byte of the
//! template outside a recognized placeholder span is copied into the output
//! unchanged, in the original order.

use crate::error::DbError;
use crate::literal::encode;
use crate::types::Params;

/// Characters allowed in a placeholder name.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace every `:name` placeholder in `template` with the encoded literal
/// of the matching parameter.
///
/// A placeholder is a colon followed by a maximal run of ASCII letters,
/// digits, and underscores. A colon followed by anything else (including a
/// second colon, so `::typename` casts survive) or a colon at the end of
/// the template passes through verbatim.
///
/// ```rust
/// use sql_template::{params, template::substitute};
///
/// let sql = substitute(
///     "SELECT * FROM users WHERE id = :id AND name = :name",
///     &params! { "id" => 7, "name" => "O'Brien" },
/// )?;
/// assert_eq!(sql, "SELECT * FROM users WHERE id = 7 AND name = 'O''Brien'");
/// # Ok::<(), sql_template::DbError>(())
/// ```
///
/// Known limitation: recognition is lexical, so a placeholder-looking token
/// inside a string literal in the template is substituted too. Likewise,
/// array-slice syntax such as `arr[1:5]` reads as a placeholder named `5`;
/// write it with a space or supply the parameter.
///
/// # Errors
///
/// [`DbError::MissingParameter`] when a placeholder has no entry in `params`
/// (no partial output is returned), and any [`DbError::Encoding`] raised by
/// the value encoder.
pub fn substitute(template: &str, params: &Params) -> Result<String, DbError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let Some(idx) = rest.find(':') else {
            rendered.push_str(rest);
            return Ok(rendered);
        };
        let after = &rest[idx + 1..];
        let Some(next) = after.chars().next() else {
            // colon at the end of the template
            rendered.push_str(rest);
            return Ok(rendered);
        };
        if !is_name_char(next) {
            // keep the colon and the following character untouched
            let keep = idx + 1 + next.len_utf8();
            rendered.push_str(&rest[..keep]);
            rest = &rest[keep..];
            continue;
        }
        rendered.push_str(&rest[..idx]);
        let name_len = after
            .find(|c: char| !is_name_char(c))
            .unwrap_or(after.len());
        let name = &after[..name_len];
        let value = params
            .get(name)
            .ok_or_else(|| DbError::MissingParameter(name.to_string()))?;
        rendered.push_str(&encode(value)?);
        rest = &after[name_len..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlValue;
    use crate::params;
    use rust_decimal::Decimal;

    #[test]
    fn template_without_placeholders_is_unchanged() {
        let template = "SELECT count(*) FROM users WHERE active";
        assert_eq!(substitute(template, &Params::new()).unwrap(), template);
    }

    #[test]
    fn substitutes_named_strings() {
        let out = substitute(
            ":a, :b",
            &params! { "a" => "value_a", "b" => "value_b" },
        )
        .unwrap();
        assert_eq!(out, "'value_a', 'value_b'");
    }

    #[test]
    fn null_and_absent_optionals_render_null() {
        let out = substitute(
            ":a, :b",
            &params! { "a" => SqlValue::Null, "b" => Option::<&str>::None },
        )
        .unwrap();
        assert_eq!(out, "NULL, NULL");
    }

    #[test]
    fn overlapping_names_use_longest_match() {
        let out = substitute(
            ":a, :a_b, :a b",
            &params! { "a" => "value_a", "a_b" => "value_b" },
        )
        .unwrap();
        assert_eq!(out, "'value_a', 'value_b', 'value_a' b");
    }

    #[test]
    fn decimal_and_null_decimal() {
        let value: Decimal = "0.0005".parse().unwrap();
        let out = substitute(
            ":a, :b",
            &params! { "a" => value, "b" => Option::<Decimal>::None },
        )
        .unwrap();
        assert_eq!(out, "0.0005, NULL");
    }

    #[test]
    fn double_colon_cast_is_not_a_placeholder() {
        let out = substitute("'1'::int", &params! { "int" => 1 }).unwrap();
        assert_eq!(out, "'1'::int");
    }

    #[test]
    fn comma_list_expands_in_place() {
        let list = SqlValue::List(vec![
            SqlValue::Int(1),
            SqlValue::Int(2),
            SqlValue::Int(3),
            SqlValue::Int(4),
            SqlValue::Int(5),
            SqlValue::Null,
            SqlValue::Int(6),
            SqlValue::Text("as".into()),
        ]);
        let out = substitute(
            "WHERE field IN (:comma_list)",
            &params! { "comma_list" => list },
        )
        .unwrap();
        assert_eq!(out, "WHERE field IN (1, 2, 3, 4, 5, NULL, 6, 'as')");
    }

    #[test]
    fn missing_parameter_fails_without_partial_output() {
        let err = substitute(":a, :b", &params! { "a" => 1 }).unwrap_err();
        assert!(matches!(err, DbError::MissingParameter(ref name) if name == "b"));
    }

    #[test]
    fn trailing_colon_passes_through() {
        assert_eq!(substitute("SELECT a:", &Params::new()).unwrap(), "SELECT a:");
    }

    #[test]
    fn colon_before_non_name_char_passes_through() {
        assert_eq!(
            substitute("a : b :: c :)", &Params::new()).unwrap(),
            "a : b :: c :)"
        );
    }

    #[test]
    fn digits_are_allowed_in_names() {
        let out = substitute(
            ":a1, :a1b",
            &params! { "a1" => "first", "a1b" => "second" },
        )
        .unwrap();
        assert_eq!(out, "'first', 'second'");
    }

    #[test]
    fn placeholder_spanning_whole_template() {
        assert_eq!(substitute(":only", &params! { "only" => 9 }).unwrap(), "9");
    }

    #[test]
    fn multibyte_text_around_placeholders_is_preserved() {
        let out = substitute(
            "wörld = :a ✓ :b",
            &params! { "a" => 1, "b" => "é" },
        )
        .unwrap();
        assert_eq!(out, "wörld = 1 ✓ 'é'");
    }

    #[test]
    fn colon_followed_by_multibyte_char_passes_through() {
        assert_eq!(substitute("a :é b", &Params::new()).unwrap(), "a :é b");
    }

    #[test]
    fn substitution_inside_template_literal_is_lexical() {
        // documented limitation: no SQL grammar awareness
        let out = substitute("SELECT ':name'", &params! { "name" => "bob" }).unwrap();
        assert_eq!(out, "SELECT ''bob''");
    }
}
