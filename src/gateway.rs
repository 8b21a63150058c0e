//! The database gateway: one lazily opened connection and the generic
//! query/create/update/delete operations built on it.

use crate::error::{DbError, Result};
use crate::model::DbModel;
use crate::sqlite::{KeyRecovery, Row, SqliteConfig, Value, Values};
use crate::statement;
use futures::lock::{Mutex, MutexGuard};
use rusqlite::config::DbConfig;
use rusqlite::{params_from_iter, Connection};
use std::{sync::Arc, time::Duration};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Exclusive access to the gateway's connection.
///
/// Every gateway operation takes the same lock, so drop the handle before
/// calling one of them from the same task.
pub type ConnectionHandle<'a> = MutexGuard<'a, Connection>;

/// Owns a single SQLite connection, opened on first use and closed when the
/// gateway is dropped. Share it between tasks by wrapping it in an `Arc`.
pub struct SqliteGateway {
    config: SqliteConfig,
    connection: OnceCell<Mutex<Connection>>,
}

impl SqliteGateway {
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            connection: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Whether `connect` has already opened the connection.
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Return the connection, opening it if this is the first call.
    ///
    /// Concurrent first callers open exactly one connection between them.
    pub async fn connect(&self) -> Result<ConnectionHandle<'_>> {
        let connection = self
            .connection
            .get_or_try_init(|| async { self.open().map(Mutex::new) })
            .await?;
        Ok(connection.lock().await)
    }

    fn open(&self) -> Result<Connection> {
        let path = &self.config.db_path;
        let connect_error = |source: rusqlite::Error| {
            warn!(path = %path, error = %source, "failed to open sqlite connection");
            DbError::Connect {
                path: path.clone(),
                source,
            }
        };

        let conn = Connection::open(path).map_err(connect_error)?;
        if let Some(millis) = self.config.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(millis))
                .map_err(connect_error)?;
        }
        conn.pragma_update(None, "foreign_keys", self.config.foreign_keys)
            .map_err(connect_error)?;
        // Quoted identifiers that name no column must fail instead of
        // silently becoming string literals.
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DML, false)
            .map_err(connect_error)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DDL, false)
            .map_err(connect_error)?;

        info!(path = %path, "opened sqlite connection");
        Ok(conn)
    }

    /// Run `sql` with positional `parameters` and collect every result row.
    ///
    /// Statements that produce no columns still execute and return no rows.
    pub async fn query(&self, sql: &str, parameters: &[Value]) -> Result<Vec<Row>> {
        let conn = self.connect().await?;
        fetch_rows(&conn, sql, parameters)
    }

    /// Insert `values` into the model's table and return the new row's key.
    ///
    /// The insert and the key lookup share one transaction: if the key cannot
    /// be read back, the row is rolled back and the error returned.
    pub async fn create_entity<M>(&self, model: &M, values: &Values) -> Result<Value>
    where
        M: DbModel + ?Sized,
    {
        let (table, key) = (model.table_name(), model.primary_key_name());
        let sql = statement::insert_sql(table, values)?;

        let conn = self.connect().await?;
        let tx = conn.unchecked_transaction()?;
        debug!(sql = %sql, params = values.len(), "executing statement");
        tx.execute(&sql, params_from_iter(values.values()))?;

        let rows = match self.config.key_recovery {
            KeyRecovery::LatestByKey => {
                fetch_rows(&tx, &statement::latest_key_sql(table, key)?, &[])?
            }
            KeyRecovery::LastInsertRowid => {
                let rowid = Value::Integer(tx.last_insert_rowid());
                fetch_rows(&tx, &statement::key_by_rowid_sql(table, key)?, &[rowid])?
            }
        };

        let id = rows
            .into_iter()
            .next()
            .and_then(|row| row.take(key))
            .ok_or_else(|| DbError::MissingPrimaryKey {
                table: table.to_string(),
                column: key.to_string(),
            })?;
        tx.commit()?;
        Ok(id)
    }

    /// Update the row whose key equals `id`. Returns the number of rows
    /// changed, which is zero when no such row exists.
    pub async fn update_entity<M>(
        &self,
        model: &M,
        id: impl Into<Value>,
        values: &Values,
    ) -> Result<usize>
    where
        M: DbModel + ?Sized,
    {
        let sql = statement::update_sql(model.table_name(), model.primary_key_name(), values)?;
        let id = id.into();

        let conn = self.connect().await?;
        debug!(sql = %sql, params = values.len() + 1, "executing statement");
        let changed = conn.execute(&sql, params_from_iter(values.values().chain([&id])))?;
        Ok(changed)
    }

    /// Delete the row whose key equals `id`. The id is bound, never spliced
    /// into the statement text.
    pub async fn delete_entity<M>(&self, model: &M, id: impl Into<Value>) -> Result<usize>
    where
        M: DbModel + ?Sized,
    {
        let sql = statement::delete_sql(model.table_name(), model.primary_key_name())?;
        let id = id.into();

        let conn = self.connect().await?;
        debug!(sql = %sql, params = 1, "executing statement");
        let changed = conn.execute(&sql, [&id])?;
        Ok(changed)
    }
}

fn fetch_rows(conn: &Connection, sql: &str, parameters: &[Value]) -> Result<Vec<Row>> {
    debug!(sql = %sql, params = parameters.len(), "executing query");
    let mut stmt = conn.prepare(sql)?;
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = stmt.query(params_from_iter(parameters))?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            values.push(Value::from(row.get_ref(i)?));
        }
        result.push(Row::new(Arc::clone(&columns), values));
    }
    Ok(result)
}
