// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::FormSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Search,
    Insert,
    Update,
    Delete,
}

/// Pressed state of the four action buttons of a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonFlags {
    pub search: bool,
    pub insert: bool,
    pub update: bool,
    pub delete: bool,
}

impl Action {
    pub const ALL: [Self; 4] = [Self::Search, Self::Insert, Self::Update, Self::Delete];

    /// Insert wins over update, update over delete; search is the fallback.
    pub const fn from_flags(flags: ButtonFlags) -> Self {
        if flags.insert {
            Self::Insert
        } else if flags.update {
            Self::Update
        } else if flags.delete {
            Self::Delete
        } else {
            Self::Search
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::Search)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub form: FormSnapshot,
}

impl Command {
    pub fn new(action: Action, form: FormSnapshot) -> Self {
        Self { action, form }
    }

    pub fn search(form: FormSnapshot) -> Self {
        Self::new(Action::Search, form)
    }
}

/// Row selection for a dashboard read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    ById(i64),
    NameContains(String),
    All,
}

impl SearchFilter {
    /// A positive id beats the text filter; blank text means every row.
    pub fn from_inputs(id: i64, text: &str) -> Self {
        if id > 0 {
            return Self::ById(id);
        }
        let text = text.trim();
        if text.is_empty() {
            Self::All
        } else {
            Self::NameContains(text.to_owned())
        }
    }
}
