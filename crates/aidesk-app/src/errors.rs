// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::Severity;

/// Why a dashboard action did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found -- search for an existing id and retry")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    DuplicateKey(String),

    #[error("{0}")]
    ReferentialIntegrity(String),

    #[error("database unavailable: {0}")]
    Connection(String),

    /// Storage failure with no known constraint code, shown as-is.
    #[error("{0}")]
    Storage(String),
}

impl ActionError {
    pub fn validation(error: impl std::fmt::Display) -> Self {
        Self::Validation(error.to_string())
    }

    pub const fn severity(&self) -> Severity {
        match self {
            Self::Validation(_) | Self::NotFound { .. } => Severity::Warning,
            Self::DuplicateKey(_)
            | Self::ReferentialIntegrity(_)
            | Self::Connection(_)
            | Self::Storage(_) => Severity::Error,
        }
    }

    /// Warnings abort the action but leave the dashboard usable.
    pub const fn is_warning(&self) -> bool {
        matches!(self.severity(), Severity::Warning)
    }
}
