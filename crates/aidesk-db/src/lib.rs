// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod demo;
mod dispatch;
mod error;
mod lookups;
mod pool;
mod records;
mod search;

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::Date;
use time::macros::format_description;
use tracing::{debug, info};

pub use error::{StoreError, StoreResult};
pub use pool::PooledConnection;
pub use search::{SearchQuery, build_search_query};

use pool::ConnectionPool;

pub const APP_NAME: &str = "aidesk";
pub const DB_PATH_ENV: &str = "AIDESK_DB_PATH";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "programs",
        &["id", "name", "description", "amount_cents", "category", "slots"],
    ),
    (
        "users",
        &[
            "id",
            "national_id",
            "name",
            "email",
            "secret_sha256",
            "address",
            "phone",
        ],
    ),
    ("students", &["id", "registration"]),
    ("staff", &["id", "role"]),
    (
        "calls",
        &["id", "start_date", "end_date", "status", "program_id"],
    ),
    (
        "enrollments",
        &["id", "student_id", "call_id", "status", "submitted_on"],
    ),
    (
        "scholarship_holders",
        &[
            "enrollment_id",
            "student_id",
            "advisor_id",
            "start_date",
            "end_date",
            "termination_date",
            "payment_frequency",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_calls_program_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_calls_program_id ON calls (program_id);",
    },
    RequiredIndex {
        name: "idx_enrollments_student_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_enrollments_student_id ON enrollments (student_id);",
    },
    RequiredIndex {
        name: "idx_enrollments_call_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_enrollments_call_id ON enrollments (call_id);",
    },
    RequiredIndex {
        name: "idx_holders_student_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_holders_student_id ON scholarship_holders (student_id);",
    },
    RequiredIndex {
        name: "idx_holders_advisor_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_holders_advisor_id ON scholarship_holders (advisor_id);",
    },
    RequiredIndex {
        name: "idx_holders_start_date",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_holders_start_date ON scholarship_holders (start_date);",
    },
];

pub struct Store {
    pool: ConnectionPool,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        if printable == ":memory:" {
            return Self::open_memory();
        }
        let pool = ConnectionPool::file(path, configure_connection)
            .with_context(|| {
                format!(
                    "open database {} -- set [storage].db_path or {DB_PATH_ENV} to a writable file",
                    path.display()
                )
            })?;
        info!(path = %path.display(), "opened database");
        Ok(Self { pool })
    }

    pub fn open_memory() -> Result<Self> {
        let pool = ConnectionPool::memory(configure_connection)?;
        Ok(Self { pool })
    }

    /// A pooled connection for ad-hoc statements; returned to the pool on drop.
    pub fn connection(&self) -> Result<PooledConnection> {
        self.pool.acquire()
    }

    pub fn location(&self) -> String {
        self.pool.describe().to_owned()
    }

    pub fn bootstrap(&self) -> Result<()> {
        let conn = self.connection()?;
        if has_user_tables(&conn)? {
            validate_schema(&conn)?;
        } else {
            conn.execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            debug!(location = %self.location(), "created schema");
        }

        ensure_required_indexes(&conn)?;
        Ok(())
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os(DB_PATH_ENV) {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set {DB_PATH_ENV} to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("aidesk.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

/// Hex SHA-256 of a user secret; the plain text never reaches the store.
pub fn secret_digest(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    let mut output = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point {DB_PATH_ENV} at an aidesk database or start from an empty file"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; migrate the database before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; migrate the database before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    // busy_timeout must precede the WAL switch, which takes a lock.
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        ",
    )?;

    // Unicode-aware lowercase for case-insensitive name filters.
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )
}

fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw, &format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("unsupported date format {raw:?}"))
}

fn parse_opt_date(raw: Option<String>) -> Result<Option<Date>> {
    raw.as_deref().map(parse_date).transpose()
}

fn format_date(value: Date) -> String {
    value
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "1970-01-01".to_owned())
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}

/// Decodes a stored enum code inside a row mapper.
fn parse_code<T>(
    index: usize,
    raw: &str,
    what: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown {what} {raw}"),
            )),
        )
    })
}
