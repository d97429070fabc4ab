// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rusqlite::ffi;
use thiserror::Error;

/// Storage failures the dispatcher can tell apart.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Sorts a driver error by its extended result code; anything that is not
    /// a unique or foreign-key rejection keeps `action` as context.
    pub fn classify(error: rusqlite::Error, action: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &error {
            let detail = message
                .clone()
                .unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Self::UniqueViolation(detail);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return Self::ForeignKeyViolation(detail);
                }
                _ => {}
            }
        }
        Self::Other(anyhow::Error::new(error).context(action.to_owned()))
    }
}

/// Adapter for `map_err` at call sites.
pub(crate) fn classify(action: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |error| StoreError::classify(error, action)
}
