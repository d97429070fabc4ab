// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ActionError, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// Transient, non-blocking message shown on the notification line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

impl From<&ActionError> for Notice {
    fn from(error: &ActionError) -> Self {
        Self::new(error.severity(), error.to_string())
    }
}

/// What the dashboard shows below the form after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Table(SearchResult),
    /// Blocking panel for failed reads and lost connections.
    Alert(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub notice: Option<Notice>,
    pub view: View,
}

impl Outcome {
    pub fn table(notice: Option<Notice>, result: SearchResult) -> Self {
        Self {
            notice,
            view: View::Table(result),
        }
    }

    pub fn alert(notice: Option<Notice>, message: impl Into<String>) -> Self {
        Self {
            notice,
            view: View::Alert(message.into()),
        }
    }
}
