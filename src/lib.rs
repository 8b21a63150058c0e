//! Generic SQLite data access for model-driven CRUD.
//!
//! # Intention
//!
//! - Open one connection lazily and share it through a [`SqliteGateway`].
//! - Run parameterized SQL and return rows as ordered column/value maps.
//! - Generate insert, update and delete statements from a [`DbModel`]'s table
//!   and primary key names plus a [`Values`] mapping.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No pooling, transactions, migrations or query building beyond the
//!   generated CRUD statements.
//!
//! ```no_run
//! use rust_sqlite_gateway::{SqliteConfig, SqliteGateway, TableModel, Values};
//!
//! # async fn demo() -> Result<(), rust_sqlite_gateway::DbError> {
//! let gateway = SqliteGateway::new(SqliteConfig::new("app.db"));
//! let users = TableModel::new("users", "id");
//!
//! let id = gateway
//!     .create_entity(&users, &Values::new().with_value("name", "Ada"))
//!     .await?;
//! gateway
//!     .update_entity(&users, id.clone(), &Values::new().with_value("name", "Ada L."))
//!     .await?;
//! let rows = gateway.query("SELECT * FROM users WHERE id = ?", &[id]).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gateway;
pub mod model;
pub mod sqlite;
pub mod statement;

pub use error::{ConfigError, DbError};
pub use gateway::{ConnectionHandle, SqliteGateway};
pub use model::{DbModel, TableModel};
pub use sqlite::{KeyRecovery, Row, SqliteConfig, Value, Values};
pub use statement::array_to_list;
