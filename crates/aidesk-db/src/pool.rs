// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use r2d2::{ManageConnection, Pool};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 4;
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection on loan from the pool; returned when dropped.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Configured connections handed out per operation.
pub(crate) struct ConnectionPool {
    inner: Pool<SqliteConnectionManager>,
    location: String,
}

impl ConnectionPool {
    pub(crate) fn file(
        path: &Path,
        configure: fn(&Connection) -> rusqlite::Result<()>,
    ) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| configure(conn));
        Self::build(manager, path.display().to_string())
    }

    /// Shared-cache in-memory database that lives as long as the pool.
    pub(crate) fn memory(configure: fn(&Connection) -> rusqlite::Result<()>) -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(move |conn| configure(conn));
        Self::build(manager, ":memory:".to_owned())
    }

    fn build(manager: SqliteConnectionManager, location: String) -> Result<Self> {
        // The pool retries failed connects until its timeout; fail fast instead.
        manager
            .connect()
            .with_context(|| format!("open database at {location}"))?;

        let inner = Pool::builder()
            .max_size(MAX_CONNECTIONS)
            .min_idle(Some(1))
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .with_context(|| format!("build connection pool for {location}"))?;
        Ok(Self { inner, location })
    }

    pub(crate) fn acquire(&self) -> Result<PooledConnection> {
        self.inner
            .get()
            .with_context(|| format!("acquire connection to {}", self.location))
    }

    pub(crate) fn describe(&self) -> &str {
        &self.location
    }
}
