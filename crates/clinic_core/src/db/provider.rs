//! Per-operation connection provider.
//!
//! # Responsibility
//! - Open a fresh connection for each store operation from explicit config.
//! - Close it when the returned guard is dropped, on every exit path.
//!
//! # Invariants
//! - No connection is cached or shared between operations.

use super::{open_db, DbResult};
use crate::config::DatabaseConfig;
use log::debug;
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

/// Opens one connection per call using the configured database.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    config: DatabaseConfig,
}

impl ConnectionProvider {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Opens a migrated connection scoped to the returned guard.
    pub fn connect(&self) -> DbResult<ScopedConnection> {
        let conn = open_db(
            &self.config.path,
            Duration::from_millis(self.config.busy_timeout_ms),
        )?;
        Ok(ScopedConnection {
            conn,
            opened_at: Instant::now(),
        })
    }
}

/// Connection guard; the connection closes when this value is dropped.
pub struct ScopedConnection {
    conn: Connection,
    opened_at: Instant,
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for ScopedConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        debug!(
            "event=db_close module=db status=ok held_ms={}",
            self.opened_at.elapsed().as_millis()
        );
    }
}
