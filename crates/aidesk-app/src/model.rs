// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramCategory {
    Assistance,
    Research,
    Extension,
    Food,
    Transport,
    Other,
}

impl ProgramCategory {
    pub const ALL: [Self; 6] = [
        Self::Assistance,
        Self::Research,
        Self::Extension,
        Self::Food,
        Self::Transport,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assistance => "assistance",
            Self::Research => "research",
            Self::Extension => "extension",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "assistance" => Some(Self::Assistance),
            "research" => Some(Self::Research),
            "extension" => Some(Self::Extension),
            "food" => Some(Self::Food),
            "transport" => Some(Self::Transport),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Assistance => "Assistance",
            Self::Research => "Research",
            Self::Extension => "Extension",
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    Semiannual,
    Annual,
    SinglePayment,
}

impl PaymentFrequency {
    pub const ALL: [Self; 4] = [
        Self::Monthly,
        Self::Semiannual,
        Self::Annual,
        Self::SinglePayment,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Semiannual => "semiannual",
            Self::Annual => "annual",
            Self::SinglePayment => "single_payment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(Self::Monthly),
            "semiannual" => Some(Self::Semiannual),
            "annual" => Some(Self::Annual),
            "single_payment" => Some(Self::SinglePayment),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Semiannual => "Semiannual",
            Self::Annual => "Annual",
            Self::SinglePayment => "Single payment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallStatus {
    Open,
    Closed,
    UnderReview,
    Cancelled,
}

impl CallStatus {
    pub const ALL: [Self; 4] = [Self::Open, Self::Closed, Self::UnderReview, Self::Cancelled];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::UnderReview => "under_review",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "under_review" => Some(Self::UnderReview),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::UnderReview => "Under review",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardKind {
    Programs,
    Users,
    Holders,
    Calls,
}

impl DashboardKind {
    pub const ALL: [Self; 4] = [Self::Programs, Self::Users, Self::Holders, Self::Calls];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Programs => "programs",
            Self::Users => "users",
            Self::Holders => "holders",
            Self::Calls => "calls",
        }
    }

    pub const fn entity_label(self) -> &'static str {
        match self {
            Self::Programs => "program",
            Self::Users => "user",
            Self::Holders => "scholarship holder",
            Self::Calls => "call",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "programs" => Some(Self::Programs),
            "users" => Some(Self::Users),
            "holders" => Some(Self::Holders),
            "calls" => Some(Self::Calls),
            _ => None,
        }
    }

    /// Only these dashboards populate select fields from sibling tables.
    pub const fn has_lookups(self) -> bool {
        matches!(self, Self::Holders | Self::Calls)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub description: String,
    pub amount_cents: i64,
    pub category: ProgramCategory,
    pub slots: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub national_id: String,
    pub name: String,
    pub email: String,
    pub secret_sha256: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallListing {
    pub id: CallId,
    pub start_date: Date,
    pub end_date: Date,
    pub status: CallStatus,
    pub program_id: ProgramId,
    pub program_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderListing {
    pub enrollment_id: EnrollmentId,
    pub student_id: StudentId,
    pub student_name: String,
    pub advisor_id: StaffId,
    pub advisor_name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub termination_date: Option<Date>,
    pub payment_frequency: PaymentFrequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption<Id> {
    pub id: Id,
    pub label: String,
}

/// Option sets backing the select fields of the holder and call dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lookups {
    pub enrollments: Vec<LookupOption<EnrollmentId>>,
    pub students: Vec<LookupOption<StudentId>>,
    pub advisors: Vec<LookupOption<StaffId>>,
    pub programs: Vec<LookupOption<ProgramId>>,
}
