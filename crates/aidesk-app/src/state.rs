// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{DashboardKind, Notice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub active: DashboardKind,
    pub notice: Option<Notice>,
    pub alert: Option<String>,
    pub page: usize,
    pub show_help: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::starting_at(DashboardKind::Programs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextDashboard,
    PrevDashboard,
    ShowNotice(Notice),
    ClearNotice,
    RaiseAlert(String),
    DismissAlert,
    NextPage { page_count: usize },
    PrevPage,
    ResetPage,
    ToggleHelp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    DashboardChanged(DashboardKind),
    NoticeShown(Notice),
    NoticeCleared,
    AlertRaised(String),
    AlertDismissed,
    PageChanged(usize),
    HelpToggled(bool),
}

impl AppState {
    pub fn starting_at(active: DashboardKind) -> Self {
        Self {
            active,
            notice: None,
            alert: None,
            page: 0,
            show_help: false,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextDashboard => self.rotate_dashboard(1),
            AppCommand::PrevDashboard => self.rotate_dashboard(-1),
            AppCommand::ShowNotice(notice) => {
                self.notice = Some(notice.clone());
                vec![AppEvent::NoticeShown(notice)]
            }
            AppCommand::ClearNotice => {
                self.notice = None;
                vec![AppEvent::NoticeCleared]
            }
            AppCommand::RaiseAlert(message) => {
                self.alert = Some(message.clone());
                vec![AppEvent::AlertRaised(message)]
            }
            AppCommand::DismissAlert => {
                if self.alert.take().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::AlertDismissed]
            }
            AppCommand::NextPage { page_count } => {
                let last = page_count.saturating_sub(1);
                self.set_page((self.page + 1).min(last))
            }
            AppCommand::PrevPage => self.set_page(self.page.saturating_sub(1)),
            AppCommand::ResetPage => self.set_page(0),
            AppCommand::ToggleHelp => {
                self.show_help = !self.show_help;
                vec![AppEvent::HelpToggled(self.show_help)]
            }
        }
    }

    /// While an alert is up, only dismissing it does anything.
    pub fn is_blocked(&self) -> bool {
        self.alert.is_some()
    }

    fn rotate_dashboard(&mut self, delta: isize) -> Vec<AppEvent> {
        let dashboards = DashboardKind::ALL;
        let current = dashboards
            .iter()
            .position(|kind| *kind == self.active)
            .unwrap_or(0) as isize;
        let len = dashboards.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active = dashboards[next];
        self.page = 0;
        vec![AppEvent::DashboardChanged(self.active)]
    }

    fn set_page(&mut self, page: usize) -> Vec<AppEvent> {
        if page == self.page {
            return Vec::new();
        }
        self.page = page;
        vec![AppEvent::PageChanged(page)]
    }
}
