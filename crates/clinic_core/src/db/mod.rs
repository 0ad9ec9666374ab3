//! SQLite storage bootstrap for the patient registry.
//!
//! # Responsibility
//! - Open and configure one SQLite connection per store operation.
//! - Apply schema migrations before a connection is handed out.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every connection is released when its guard goes out of scope.

use std::path::PathBuf;
use thiserror::Error;

pub mod migrations;
mod open;
mod provider;

pub use open::{open_db, open_db_in_memory};
pub use provider::{ConnectionProvider, ScopedConnection};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("cannot open database `{path}`: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
