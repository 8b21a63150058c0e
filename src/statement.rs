//! SQL text generation for the model-driven CRUD operations.
//!
//! Only identifiers are interpolated into statement text; every value is
//! bound through a `?` placeholder.

use crate::error::{DbError, Result};
use crate::sqlite::Values;
use std::fmt::Display;

/// Apply `mask` to every element of `values` and join the results with
/// `separator`.
///
/// The first `%s` in the mask is replaced by the element and `%%` yields a
/// literal percent sign. A mask without `%s`, such as `"?"`, is repeated
/// verbatim once per element.
///
/// ```
/// use rust_sqlite_gateway::array_to_list;
///
/// assert_eq!(array_to_list(["a", "b"], "%s", ","), "a,b");
/// assert_eq!(array_to_list(["a", "b"], "?", ","), "?,?");
/// assert_eq!(array_to_list(["a", "b"], "%s = ?", ", "), "a = ?, b = ?");
/// ```
pub fn array_to_list<I>(values: I, mask: &str, separator: &str) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    values
        .into_iter()
        .map(|value| apply_mask(mask, &value))
        .collect::<Vec<_>>()
        .join(separator)
}

fn apply_mask(mask: &str, value: &dyn Display) -> String {
    let mut out = String::with_capacity(mask.len());
    let mut substituted = false;
    let mut chars = mask.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s') if !substituted => {
                chars.next();
                out.push_str(&value.to_string());
                substituted = true;
            }
            _ => out.push('%'),
        }
    }
    out
}

/// Check that `name` is safe to splice into SQL as an identifier.
pub fn identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric());
    if valid {
        Ok(name)
    } else {
        Err(DbError::InvalidIdentifier(name.to_string()))
    }
}

/// Validate `name` and wrap it in double quotes, so keywords such as
/// `order` can be used as table or column names.
pub fn quoted(name: &str) -> Result<String> {
    identifier(name).map(|name| format!("\"{name}\""))
}

fn column_list(values: &Values) -> Result<Vec<String>> {
    values.columns().map(quoted).collect()
}

pub(crate) fn insert_sql(table: &str, values: &Values) -> Result<String> {
    let table = quoted(table)?;
    if values.is_empty() {
        return Ok(format!("INSERT INTO {table} DEFAULT VALUES"));
    }
    let columns = column_list(values)?;
    Ok(format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        array_to_list(&columns, "%s", ", "),
        array_to_list(&columns, "?", ", ")
    ))
}

pub(crate) fn latest_key_sql(table: &str, key: &str) -> Result<String> {
    let (table, key) = (quoted(table)?, quoted(key)?);
    Ok(format!("SELECT {key} FROM {table} ORDER BY {key} DESC LIMIT 1"))
}

pub(crate) fn key_by_rowid_sql(table: &str, key: &str) -> Result<String> {
    let (table, key) = (quoted(table)?, quoted(key)?);
    Ok(format!("SELECT {key} FROM {table} WHERE rowid = ?"))
}

pub(crate) fn update_sql(table: &str, key: &str, values: &Values) -> Result<String> {
    if values.is_empty() {
        return Err(DbError::EmptyValues {
            table: identifier(table)?.to_string(),
        });
    }
    let (table, key) = (quoted(table)?, quoted(key)?);
    let columns = column_list(values)?;
    Ok(format!(
        "UPDATE {table} SET {} WHERE {key} = ?",
        array_to_list(&columns, "%s = ?", ", ")
    ))
}

pub(crate) fn delete_sql(table: &str, key: &str) -> Result<String> {
    let (table, key) = (quoted(table)?, quoted(key)?);
    Ok(format!("DELETE FROM {table} WHERE {key} = ?"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_to_list_joins_masked_elements() {
        let empty: [&str; 0] = [];
        assert_eq!(array_to_list(empty, "%s", ","), "");
        assert_eq!(array_to_list(["a", "b"], "%s", ","), "a,b");
        assert_eq!(array_to_list(["a", "b"], "?", ","), "?,?");
        assert_eq!(array_to_list([1, 2, 3], "(%s)", " | "), "(1) | (2) | (3)");
    }

    #[test]
    fn array_to_list_mask_escapes() {
        assert_eq!(array_to_list(["a"], "100%% %s", ","), "100% a");
        assert_eq!(array_to_list(["a"], "%s-%s", ","), "a-%s");
        assert_eq!(array_to_list(["a"], "50%", ","), "50%");
    }

    #[test]
    fn identifier_accepts_plain_names_only() {
        assert!(identifier("users").is_ok());
        assert!(identifier("_user_2").is_ok());
        for bad in ["", "2users", "users; DROP TABLE users", "a-b", "name\"", "ünï"] {
            assert!(
                matches!(identifier(bad), Err(DbError::InvalidIdentifier(ref n)) if n == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn insert_statement_follows_column_order() {
        let values = Values::new().with_value("name", "x").with_value("age", 3);
        assert_eq!(
            insert_sql("users", &values).unwrap(),
            r#"INSERT INTO "users" ("name", "age") VALUES (?, ?)"#
        );
        assert_eq!(
            insert_sql("users", &Values::new()).unwrap(),
            r#"INSERT INTO "users" DEFAULT VALUES"#
        );
    }

    #[test]
    fn keywords_are_quoted_identifiers() {
        assert_eq!(quoted("order").unwrap(), r#""order""#);
        let values = Values::new().with_value("group", 1);
        assert_eq!(
            insert_sql("order", &values).unwrap(),
            r#"INSERT INTO "order" ("group") VALUES (?)"#
        );
        assert!(matches!(quoted("a\"b"), Err(DbError::InvalidIdentifier(_))));
    }

    #[test]
    fn insert_statement_rejects_bad_column() {
        let values = Values::new().with_value("name) VALUES (1); --", "x");
        assert!(matches!(
            insert_sql("users", &values),
            Err(DbError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn update_and_delete_statements_bind_the_key() {
        let values = Values::new().with_value("name", "x").with_value("age", 3);
        assert_eq!(
            update_sql("users", "id", &values).unwrap(),
            r#"UPDATE "users" SET "name" = ?, "age" = ? WHERE "id" = ?"#
        );
        assert!(matches!(
            update_sql("users", "id", &Values::new()),
            Err(DbError::EmptyValues { ref table }) if table == "users"
        ));
        assert_eq!(
            delete_sql("users", "id").unwrap(),
            r#"DELETE FROM "users" WHERE "id" = ?"#
        );
    }

    #[test]
    fn key_lookup_statements() {
        assert_eq!(
            latest_key_sql("users", "id").unwrap(),
            r#"SELECT "id" FROM "users" ORDER BY "id" DESC LIMIT 1"#
        );
        assert_eq!(
            key_by_rowid_sql("users", "id").unwrap(),
            r#"SELECT "id" FROM "users" WHERE rowid = ?"#
        );
    }
}
