//! Error types returned by the gateway and its configuration loader.

use thiserror::Error;

/// Errors produced while talking to the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open sqlite database at {path}: {source}")]
    Connect {
        path: String,
        source: rusqlite::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("no values supplied for update of table {table}")]
    EmptyValues { table: String },

    #[error("inserted a row into {table} but could not read back its {column}")]
    MissingPrimaryKey { table: String, column: String },
}

/// Errors produced while building a [`SqliteConfig`](crate::sqlite::SqliteConfig)
/// from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {name}")]
    InvalidVar { name: &'static str, value: String },
}

pub type Result<T, E = DbError> = std::result::Result<T, E>;
