// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Row-level writes, run inside the dispatcher's transaction.

use aidesk_app::{
    CallForm, CallId, EnrollmentId, EnrollmentStatus, HolderForm, ProgramForm, ProgramId,
    StaffId, StudentId, UserForm, UserId,
};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{StoreError, StoreResult, classify};
use crate::{format_date, secret_digest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EnrollmentFacts {
    pub student_id: StudentId,
    pub status: Option<EnrollmentStatus>,
}

pub(crate) fn insert_program(conn: &Connection, form: &ProgramForm) -> StoreResult<ProgramId> {
    conn.execute(
        "
        INSERT INTO programs (name, description, amount_cents, category, slots)
        VALUES (?, ?, ?, ?, ?)
        ",
        params![
            form.name.trim(),
            form.description,
            form.amount_cents,
            form.category.as_str(),
            form.slots,
        ],
    )
    .map_err(classify("insert program"))?;
    Ok(ProgramId::new(conn.last_insert_rowid()))
}

pub(crate) fn update_program(conn: &Connection, form: &ProgramForm) -> StoreResult<()> {
    ensure_exists(conn, "programs", "id", "program", form.id.get())?;
    let rows_affected = conn
        .execute(
            "
            UPDATE programs
            SET name = ?, description = ?, amount_cents = ?, category = ?, slots = ?
            WHERE id = ?
            ",
            params![
                form.name.trim(),
                form.description,
                form.amount_cents,
                form.category.as_str(),
                form.slots,
                form.id.get(),
            ],
        )
        .map_err(classify("update program"))?;
    require_row(rows_affected, "program", form.id.get())
}

pub(crate) fn delete_program(conn: &Connection, id: ProgramId) -> StoreResult<()> {
    let rows_affected = conn
        .execute("DELETE FROM programs WHERE id = ?", params![id.get()])
        .map_err(classify("delete program"))?;
    require_row(rows_affected, "program", id.get())
}

pub(crate) fn insert_user(conn: &Connection, form: &UserForm) -> StoreResult<UserId> {
    conn.execute(
        "
        INSERT INTO users (national_id, name, email, secret_sha256, address, phone)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
        params![
            form.national_id.trim(),
            form.name.trim(),
            form.email.trim(),
            secret_digest(&form.secret),
            form.address,
            form.phone,
        ],
    )
    .map_err(classify("insert user"))?;
    Ok(UserId::new(conn.last_insert_rowid()))
}

pub(crate) fn update_user(conn: &Connection, form: &UserForm) -> StoreResult<()> {
    ensure_exists(conn, "users", "id", "user", form.id.get())?;
    let rows_affected = conn
        .execute(
            "
            UPDATE users
            SET national_id = ?, name = ?, email = ?, secret_sha256 = ?, address = ?, phone = ?
            WHERE id = ?
            ",
            params![
                form.national_id.trim(),
                form.name.trim(),
                form.email.trim(),
                secret_digest(&form.secret),
                form.address,
                form.phone,
                form.id.get(),
            ],
        )
        .map_err(classify("update user"))?;
    require_row(rows_affected, "user", form.id.get())
}

pub(crate) fn delete_user(conn: &Connection, id: UserId) -> StoreResult<()> {
    let rows_affected = conn
        .execute("DELETE FROM users WHERE id = ?", params![id.get()])
        .map_err(classify("delete user"))?;
    require_row(rows_affected, "user", id.get())
}

pub(crate) fn holder_exists(conn: &Connection, enrollment_id: EnrollmentId) -> StoreResult<bool> {
    conn.query_row(
        "SELECT 1 FROM scholarship_holders WHERE enrollment_id = ?",
        params![enrollment_id.get()],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(classify("check existing scholarship holder"))
}

pub(crate) fn enrollment_facts(
    conn: &Connection,
    enrollment_id: EnrollmentId,
) -> StoreResult<Option<EnrollmentFacts>> {
    conn.query_row(
        "SELECT student_id, status FROM enrollments WHERE id = ?",
        params![enrollment_id.get()],
        |row| {
            let status_raw: String = row.get(1)?;
            Ok(EnrollmentFacts {
                student_id: StudentId::new(row.get(0)?),
                status: EnrollmentStatus::parse(&status_raw),
            })
        },
    )
    .optional()
    .map_err(classify("load enrollment"))
}

/// The holder's key is the enrollment id, never store-assigned.
pub(crate) fn insert_holder(
    conn: &Connection,
    enrollment_id: EnrollmentId,
    form: &HolderForm,
) -> StoreResult<()> {
    conn.execute(
        "
        INSERT INTO scholarship_holders (
          enrollment_id, student_id, advisor_id,
          start_date, end_date, termination_date, payment_frequency
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            enrollment_id.get(),
            form.student_id.map(StudentId::get),
            form.advisor_id.map(StaffId::get),
            format_date(form.start_date),
            format_date(form.end_date),
            form.effective_termination().map(format_date),
            form.payment_frequency.as_str(),
        ],
    )
    .map_err(classify("insert scholarship holder"))?;
    Ok(())
}

pub(crate) fn update_holder(
    conn: &Connection,
    enrollment_id: EnrollmentId,
    form: &HolderForm,
) -> StoreResult<()> {
    let rows_affected = conn
        .execute(
            "
            UPDATE scholarship_holders
            SET
              student_id = ?,
              advisor_id = ?,
              start_date = ?,
              end_date = ?,
              termination_date = ?,
              payment_frequency = ?
            WHERE enrollment_id = ?
            ",
            params![
                form.student_id.map(StudentId::get),
                form.advisor_id.map(StaffId::get),
                format_date(form.start_date),
                format_date(form.end_date),
                form.effective_termination().map(format_date),
                form.payment_frequency.as_str(),
                enrollment_id.get(),
            ],
        )
        .map_err(classify("update scholarship holder"))?;
    require_row(rows_affected, "scholarship holder", enrollment_id.get())
}

pub(crate) fn delete_holder(conn: &Connection, enrollment_id: EnrollmentId) -> StoreResult<()> {
    let rows_affected = conn
        .execute(
            "DELETE FROM scholarship_holders WHERE enrollment_id = ?",
            params![enrollment_id.get()],
        )
        .map_err(classify("delete scholarship holder"))?;
    require_row(rows_affected, "scholarship holder", enrollment_id.get())
}

pub(crate) fn insert_call(conn: &Connection, form: &CallForm) -> StoreResult<CallId> {
    conn.execute(
        "
        INSERT INTO calls (start_date, end_date, status, program_id)
        VALUES (?, ?, ?, ?)
        ",
        params![
            format_date(form.start_date),
            format_date(form.end_date),
            form.status.as_str(),
            form.program_id.map(ProgramId::get),
        ],
    )
    .map_err(classify("insert call"))?;
    Ok(CallId::new(conn.last_insert_rowid()))
}

pub(crate) fn update_call(conn: &Connection, form: &CallForm) -> StoreResult<()> {
    ensure_exists(conn, "calls", "id", "call", form.id.get())?;
    let rows_affected = conn
        .execute(
            "
            UPDATE calls
            SET start_date = ?, end_date = ?, status = ?, program_id = ?
            WHERE id = ?
            ",
            params![
                format_date(form.start_date),
                format_date(form.end_date),
                form.status.as_str(),
                form.program_id.map(ProgramId::get),
                form.id.get(),
            ],
        )
        .map_err(classify("update call"))?;
    require_row(rows_affected, "call", form.id.get())
}

pub(crate) fn delete_call(conn: &Connection, id: CallId) -> StoreResult<()> {
    let rows_affected = conn
        .execute("DELETE FROM calls WHERE id = ?", params![id.get()])
        .map_err(classify("delete call"))?;
    require_row(rows_affected, "call", id.get())
}

/// Existence pre-check ahead of an update; best-effort across processes.
fn ensure_exists(
    conn: &Connection,
    table: &str,
    key: &str,
    entity: &'static str,
    id: i64,
) -> StoreResult<()> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE {key} = ?"),
            params![id],
            |_| Ok(()),
        )
        .optional()
        .map_err(classify("check row existence"))?;
    if found.is_none() {
        return Err(StoreError::NotFound { entity, id });
    }
    Ok(())
}

fn require_row(rows_affected: usize, entity: &'static str, id: i64) -> StoreResult<()> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound { entity, id });
    }
    Ok(())
}
