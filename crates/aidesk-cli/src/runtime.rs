// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use aidesk_app::{Command, DashboardKind, Lookups, Notice, Outcome};
use aidesk_db::Store;
use tracing::warn;

pub struct DbRuntime<'a> {
    store: &'a Store,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }
}

impl aidesk_tui::DashboardRuntime for DbRuntime<'_> {
    fn execute(&mut self, command: &Command) -> Outcome {
        self.store.execute(command)
    }

    fn load_lookups(&mut self, kind: DashboardKind) -> Lookups {
        self.store.load_lookups(kind)
    }
}

/// Stands in for the store when it could not be opened at startup: every
/// action answers with the connection failure as a blocking alert.
pub struct OfflineRuntime {
    reason: String,
}

impl OfflineRuntime {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl aidesk_tui::DashboardRuntime for OfflineRuntime {
    fn execute(&mut self, command: &Command) -> Outcome {
        warn!(
            dashboard = command.form.kind().label(),
            action = command.action.label(),
            "store unavailable"
        );
        let message = format!("database unavailable: {}", self.reason);
        Outcome::alert(Some(Notice::error(message.clone())), message)
    }

    fn load_lookups(&mut self, _kind: DashboardKind) -> Lookups {
        Lookups::default()
    }
}
