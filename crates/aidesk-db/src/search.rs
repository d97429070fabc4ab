// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use aidesk_app::{
    CallId, CallListing, CallStatus, DashboardKind, EnrollmentId, HolderListing,
    PaymentFrequency, Program, ProgramCategory, ProgramId, SearchFilter, SearchResult, StaffId,
    StudentId, User, UserId,
};
use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Row, params_from_iter};
use tracing::debug;

use crate::{Store, parse_code, parse_date, parse_opt_date, to_sql_error};

/// A parameterized SELECT for one dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

struct Shape {
    select: &'static str,
    id_column: &'static str,
    name_column: &'static str,
    order_by: &'static str,
}

const fn shape(kind: DashboardKind) -> Shape {
    match kind {
        DashboardKind::Programs => Shape {
            select: "
                SELECT p.id, p.name, p.description, p.amount_cents, p.category, p.slots
                FROM programs p",
            id_column: "p.id",
            name_column: "p.name",
            order_by: "p.id ASC",
        },
        DashboardKind::Users => Shape {
            select: "
                SELECT u.id, u.national_id, u.name, u.email, u.secret_sha256, u.address, u.phone
                FROM users u",
            id_column: "u.id",
            name_column: "u.name",
            order_by: "u.id ASC",
        },
        DashboardKind::Holders => Shape {
            select: "
                SELECT
                  h.enrollment_id, h.student_id, su.name, h.advisor_id, au.name,
                  h.start_date, h.end_date, h.termination_date, h.payment_frequency
                FROM scholarship_holders h
                JOIN users su ON su.id = h.student_id
                JOIN users au ON au.id = h.advisor_id",
            id_column: "h.enrollment_id",
            name_column: "su.name",
            order_by: "h.start_date DESC, h.enrollment_id DESC",
        },
        DashboardKind::Calls => Shape {
            select: "
                SELECT c.id, c.start_date, c.end_date, c.status, c.program_id, p.name
                FROM calls c
                LEFT JOIN programs p ON p.id = c.program_id",
            id_column: "c.id",
            name_column: "p.name",
            order_by: "c.id DESC",
        },
    }
}

/// Exact id match wins; otherwise a case-insensitive substring match on the
/// dashboard's name column; otherwise every row.
pub fn build_search_query(kind: DashboardKind, filter: &SearchFilter) -> SearchQuery {
    let shape = shape(kind);
    let mut sql = String::from(shape.select.trim_start());
    let mut params = Vec::new();
    match filter {
        SearchFilter::ById(id) => {
            sql.push_str(&format!("\nWHERE {} = ?", shape.id_column));
            params.push(Value::Integer(*id));
        }
        SearchFilter::NameContains(text) => {
            sql.push_str(&format!(
                "\nWHERE instr(casefold({}), casefold(?)) > 0",
                shape.name_column
            ));
            params.push(Value::Text(text.clone()));
        }
        SearchFilter::All => {}
    }
    sql.push_str(&format!("\nORDER BY {}", shape.order_by));
    SearchQuery { sql, params }
}

impl Store {
    pub fn search(&self, kind: DashboardKind, filter: &SearchFilter) -> Result<SearchResult> {
        let query = build_search_query(kind, filter);
        debug!(dashboard = kind.label(), sql = %query.sql, "search");

        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(&query.sql)
            .with_context(|| format!("prepare {} query", kind.label()))?;
        let params = params_from_iter(query.params.iter());
        let result = match kind {
            DashboardKind::Programs => SearchResult::Programs(
                stmt.query_map(params, program_row)
                    .context("query programs")?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .context("collect programs")?,
            ),
            DashboardKind::Users => SearchResult::Users(
                stmt.query_map(params, user_row)
                    .context("query users")?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .context("collect users")?,
            ),
            DashboardKind::Holders => SearchResult::Holders(
                stmt.query_map(params, holder_row)
                    .context("query scholarship holders")?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .context("collect scholarship holders")?,
            ),
            DashboardKind::Calls => SearchResult::Calls(
                stmt.query_map(params, call_row)
                    .context("query calls")?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .context("collect calls")?,
            ),
        };
        Ok(result)
    }
}

fn program_row(row: &Row<'_>) -> rusqlite::Result<Program> {
    let category_raw: String = row.get(4)?;
    Ok(Program {
        id: ProgramId::new(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        amount_cents: row.get(3)?,
        category: parse_code(4, &category_raw, "program category", ProgramCategory::parse)?,
        slots: row.get(5)?,
    })
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId::new(row.get(0)?),
        national_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        secret_sha256: row.get(4)?,
        address: row.get(5)?,
        phone: row.get(6)?,
    })
}

fn holder_row(row: &Row<'_>) -> rusqlite::Result<HolderListing> {
    let start_raw: String = row.get(5)?;
    let end_raw: String = row.get(6)?;
    let termination_raw: Option<String> = row.get(7)?;
    let frequency_raw: String = row.get(8)?;
    Ok(HolderListing {
        enrollment_id: EnrollmentId::new(row.get(0)?),
        student_id: StudentId::new(row.get(1)?),
        student_name: row.get(2)?,
        advisor_id: StaffId::new(row.get(3)?),
        advisor_name: row.get(4)?,
        start_date: parse_date(&start_raw).map_err(to_sql_error)?,
        end_date: parse_date(&end_raw).map_err(to_sql_error)?,
        termination_date: parse_opt_date(termination_raw).map_err(to_sql_error)?,
        payment_frequency: parse_code(
            8,
            &frequency_raw,
            "payment frequency",
            PaymentFrequency::parse,
        )?,
    })
}

fn call_row(row: &Row<'_>) -> rusqlite::Result<CallListing> {
    let start_raw: String = row.get(1)?;
    let end_raw: String = row.get(2)?;
    let status_raw: String = row.get(3)?;
    let program_name: Option<String> = row.get(5)?;
    Ok(CallListing {
        id: CallId::new(row.get(0)?),
        start_date: parse_date(&start_raw).map_err(to_sql_error)?,
        end_date: parse_date(&end_raw).map_err(to_sql_error)?,
        status: parse_code(3, &status_raw, "call status", CallStatus::parse)?,
        program_id: ProgramId::new(row.get(4)?),
        program_name: program_name.unwrap_or_default(),
    })
}
