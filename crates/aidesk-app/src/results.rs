// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::input::{format_cents, format_date};
use crate::{CallListing, DashboardKind, HolderListing, Program, User};

pub const PAGE_SIZE: usize = 10;

const SECRET_MASK: &str = "********";

/// Rows returned by a dashboard read, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Programs(Vec<Program>),
    Users(Vec<User>),
    Holders(Vec<HolderListing>),
    Calls(Vec<CallListing>),
}

impl SearchResult {
    pub fn empty(kind: DashboardKind) -> Self {
        match kind {
            DashboardKind::Programs => Self::Programs(Vec::new()),
            DashboardKind::Users => Self::Users(Vec::new()),
            DashboardKind::Holders => Self::Holders(Vec::new()),
            DashboardKind::Calls => Self::Calls(Vec::new()),
        }
    }

    pub fn kind(&self) -> DashboardKind {
        match self {
            Self::Programs(_) => DashboardKind::Programs,
            Self::Users(_) => DashboardKind::Users,
            Self::Holders(_) => DashboardKind::Holders,
            Self::Calls(_) => DashboardKind::Calls,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Programs(rows) => rows.len(),
            Self::Users(rows) => rows.len(),
            Self::Holders(rows) => rows.len(),
            Self::Calls(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::Programs(_) => &["ID", "Name", "Description", "Amount", "Category", "Slots"],
            Self::Users(_) => &[
                "ID",
                "National ID",
                "Name",
                "Email",
                "Password",
                "Address",
                "Phone",
            ],
            Self::Holders(_) => &[
                "Enrollment",
                "Student",
                "Advisor",
                "Start",
                "End",
                "Terminated",
                "Frequency",
            ],
            Self::Calls(_) => &["ID", "Start", "End", "Status", "Program ID", "Program"],
        }
    }

    /// Every row rendered to display cells; secrets are masked.
    pub fn rows(&self) -> Vec<Vec<String>> {
        match self {
            Self::Programs(rows) => rows
                .iter()
                .map(|program| {
                    vec![
                        program.id.to_string(),
                        program.name.clone(),
                        program.description.clone(),
                        format_cents(program.amount_cents),
                        program.category.label().to_owned(),
                        program.slots.to_string(),
                    ]
                })
                .collect(),
            Self::Users(rows) => rows
                .iter()
                .map(|user| {
                    vec![
                        user.id.to_string(),
                        user.national_id.clone(),
                        user.name.clone(),
                        user.email.clone(),
                        SECRET_MASK.to_owned(),
                        user.address.clone(),
                        user.phone.clone(),
                    ]
                })
                .collect(),
            Self::Holders(rows) => rows
                .iter()
                .map(|holder| {
                    vec![
                        holder.enrollment_id.to_string(),
                        holder.student_name.clone(),
                        holder.advisor_name.clone(),
                        format_date(Some(holder.start_date)),
                        format_date(Some(holder.end_date)),
                        format_date(holder.termination_date),
                        holder.payment_frequency.label().to_owned(),
                    ]
                })
                .collect(),
            Self::Calls(rows) => rows
                .iter()
                .map(|call| {
                    vec![
                        call.id.to_string(),
                        format_date(Some(call.start_date)),
                        format_date(Some(call.end_date)),
                        call.status.label().to_owned(),
                        call.program_id.to_string(),
                        call.program_name.clone(),
                    ]
                })
                .collect(),
        }
    }

    /// At least one page, so an empty table still renders.
    pub fn page_count(&self) -> usize {
        self.len().div_ceil(PAGE_SIZE).max(1)
    }

    pub fn clamp_page(&self, page: usize) -> usize {
        page.min(self.page_count() - 1)
    }

    pub fn page_rows(&self, page: usize) -> Vec<Vec<String>> {
        let start = self.clamp_page(page) * PAGE_SIZE;
        self.rows().into_iter().skip(start).take(PAGE_SIZE).collect()
    }
}
