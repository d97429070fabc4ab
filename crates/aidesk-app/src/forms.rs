// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::{Date, Duration};

use crate::{
    Action, CallId, CallStatus, DashboardKind, EnrollmentId, PaymentFrequency, ProgramCategory,
    ProgramId, SearchFilter, StaffId, StudentId, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramForm {
    pub id: ProgramId,
    pub name: String,
    pub description: String,
    pub amount_cents: i64,
    pub category: ProgramCategory,
    pub slots: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub id: UserId,
    pub national_id: String,
    pub name: String,
    pub email: String,
    /// Plain text as typed; the store keeps only its digest.
    pub secret: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderForm {
    pub enrollment_id: Option<EnrollmentId>,
    pub student_id: Option<StudentId>,
    pub advisor_id: Option<StaffId>,
    pub start_date: Date,
    pub end_date: Date,
    pub terminated: bool,
    pub termination_date: Option<Date>,
    pub payment_frequency: PaymentFrequency,
    pub student_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallForm {
    pub id: CallId,
    pub start_date: Date,
    pub end_date: Date,
    pub status: CallStatus,
    pub program_id: Option<ProgramId>,
    pub program_filter: String,
}

/// Current values of one dashboard's form, captured when an action fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSnapshot {
    Program(ProgramForm),
    User(UserForm),
    Holder(HolderForm),
    Call(CallForm),
}

impl FormSnapshot {
    pub fn kind(&self) -> DashboardKind {
        match self {
            Self::Program(_) => DashboardKind::Programs,
            Self::User(_) => DashboardKind::Users,
            Self::Holder(_) => DashboardKind::Holders,
            Self::Call(_) => DashboardKind::Calls,
        }
    }

    /// Identifier the action targets; zero when none is set.
    pub fn target_id(&self) -> i64 {
        match self {
            Self::Program(form) => form.id.get(),
            Self::User(form) => form.id.get(),
            Self::Holder(form) => form.enrollment_id.map_or(0, EnrollmentId::get),
            Self::Call(form) => form.id.get(),
        }
    }

    pub fn search_filter(&self) -> SearchFilter {
        match self {
            Self::Program(form) => SearchFilter::from_inputs(form.id.get(), &form.name),
            Self::User(form) => SearchFilter::from_inputs(form.id.get(), &form.name),
            Self::Holder(form) => SearchFilter::from_inputs(
                form.enrollment_id.map_or(0, EnrollmentId::get),
                &form.student_filter,
            ),
            Self::Call(form) => SearchFilter::from_inputs(form.id.get(), &form.program_filter),
        }
    }

    pub fn blank_for(kind: DashboardKind, today: Date) -> Self {
        match kind {
            DashboardKind::Programs => Self::Program(ProgramForm {
                id: ProgramId::new(0),
                name: String::new(),
                description: String::new(),
                amount_cents: 0,
                category: ProgramCategory::Assistance,
                slots: 0,
            }),
            DashboardKind::Users => Self::User(UserForm {
                id: UserId::new(0),
                national_id: String::new(),
                name: String::new(),
                email: String::new(),
                secret: String::new(),
                address: String::new(),
                phone: String::new(),
            }),
            DashboardKind::Holders => Self::Holder(HolderForm {
                enrollment_id: None,
                student_id: None,
                advisor_id: None,
                start_date: today,
                end_date: today.saturating_add(Duration::days(365)),
                terminated: false,
                termination_date: None,
                payment_frequency: PaymentFrequency::Monthly,
                student_filter: String::new(),
            }),
            DashboardKind::Calls => Self::Call(CallForm {
                id: CallId::new(0),
                start_date: today,
                end_date: today.saturating_add(Duration::days(30)),
                status: CallStatus::Open,
                program_id: None,
                program_filter: String::new(),
            }),
        }
    }

    /// Checks run before any statement touches the store.
    pub fn validate_for(&self, action: Action) -> Result<()> {
        match action {
            Action::Search => Ok(()),
            Action::Insert => self.validate_fields(),
            Action::Update => {
                self.require_target(action)?;
                self.validate_fields()
            }
            Action::Delete => self.require_target(action),
        }
    }

    fn require_target(&self, action: Action) -> Result<()> {
        if self.target_id() > 0 {
            return Ok(());
        }
        let entity = self.kind().entity_label();
        match self {
            Self::Holder(_) => {
                bail!(
                    "{} requires an enrollment -- choose an enrollment and retry",
                    action.label()
                )
            }
            _ => bail!(
                "{} requires a {entity} id -- enter an id greater than zero and retry",
                action.label()
            ),
        }
    }

    fn validate_fields(&self) -> Result<()> {
        match self {
            Self::Program(form) => form.validate(),
            Self::User(form) => form.validate(),
            Self::Holder(form) => form.validate(),
            Self::Call(form) => form.validate(),
        }
    }
}

impl ProgramForm {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("program name is required -- enter a name and retry");
        }
        if self.amount_cents < 0 {
            bail!("program amount cannot be negative");
        }
        if self.slots < 0 {
            bail!("program slots cannot be negative");
        }
        Ok(())
    }
}

impl UserForm {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("national id", &self.national_id),
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.secret),
        ];
        let missing = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            bail!(
                "user {} required -- fill in {} and retry",
                if missing.len() == 1 { "field is" } else { "fields are" },
                missing.join(", ")
            );
        }
        if !self.email.contains('@') {
            bail!("user email must contain @ -- check the address and retry");
        }
        Ok(())
    }
}

impl HolderForm {
    pub fn validate(&self) -> Result<()> {
        if self.enrollment_id.is_none_or(|id| !id.is_set()) {
            bail!("enrollment is required -- choose an approved enrollment and retry");
        }
        if self.student_id.is_none_or(|id| !id.is_set()) {
            bail!("student is required -- choose a student and retry");
        }
        if self.advisor_id.is_none_or(|id| !id.is_set()) {
            bail!("advisor is required -- choose an advisor and retry");
        }
        if self.end_date < self.start_date {
            bail!("holder end date must be on/after start date");
        }
        if let Some(termination) = self.effective_termination()
            && termination < self.start_date
        {
            bail!("holder termination date must be on/after start date");
        }
        Ok(())
    }

    /// The termination date only counts while the checkbox is ticked.
    pub fn effective_termination(&self) -> Option<Date> {
        if self.terminated {
            self.termination_date
        } else {
            None
        }
    }
}

impl CallForm {
    pub fn validate(&self) -> Result<()> {
        if self.program_id.is_none_or(|id| !id.is_set()) {
            bail!("call program is required -- choose a program and retry");
        }
        if self.end_date < self.start_date {
            bail!("call end date must be on/after start date");
        }
        Ok(())
    }
}
