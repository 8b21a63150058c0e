//! The metadata a persisted entity exposes so the gateway can generate SQL for it.

/// Minimal contract for anything stored through the gateway.
///
/// Both names are interpolated into SQL text and are validated as plain
/// identifiers before use.
///
/// ```
/// use rust_sqlite_gateway::DbModel;
///
/// struct User;
///
/// impl DbModel for User {
///     fn table_name(&self) -> &str { "users" }
///     fn primary_key_name(&self) -> &str { "id" }
/// }
///
/// assert_eq!(User.table_name(), "users");
/// ```
pub trait DbModel {
    fn table_name(&self) -> &str;
    fn primary_key_name(&self) -> &str;
}

/// A model described at runtime by its table and key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    table: String,
    primary_key: String,
}

impl TableModel {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
        }
    }
}

impl DbModel for TableModel {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn primary_key_name(&self) -> &str {
        &self.primary_key
    }
}
