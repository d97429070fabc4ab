// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use aidesk_app::{
    DashboardKind, EnrollmentId, LookupOption, Lookups, ProgramId, StaffId, StudentId,
};
use anyhow::{Context, Result};
use rusqlite::Row;
use tracing::warn;

use crate::Store;

impl Store {
    /// Option sets for a dashboard's select fields. A loader that fails
    /// leaves its set empty; the failure is logged, never returned.
    pub fn load_lookups(&self, kind: DashboardKind) -> Lookups {
        match kind {
            DashboardKind::Holders => Lookups {
                enrollments: or_empty("enrollments", self.list_enrollment_options()),
                students: or_empty("students", self.list_student_options()),
                advisors: or_empty("advisors", self.list_advisor_options()),
                programs: Vec::new(),
            },
            DashboardKind::Calls => Lookups {
                programs: or_empty("programs", self.list_program_options()),
                ..Lookups::default()
            },
            DashboardKind::Programs | DashboardKind::Users => Lookups::default(),
        }
    }

    /// Approved enrollments only, labelled "Enrollment #7 - Ana Souza".
    pub fn list_enrollment_options(&self) -> Result<Vec<LookupOption<EnrollmentId>>> {
        self.list_options(
            "enrollment options",
            "
            SELECT e.id, 'Enrollment #' || e.id || ' - ' || u.name
            FROM enrollments e
            JOIN users u ON u.id = e.student_id
            WHERE e.status = 'approved'
            ORDER BY e.id ASC
            ",
            |row| Ok((EnrollmentId::new(row.get(0)?), row.get(1)?)),
        )
    }

    pub fn list_student_options(&self) -> Result<Vec<LookupOption<StudentId>>> {
        self.list_options(
            "student options",
            "
            SELECT s.id, u.name || ' (Reg: ' || s.registration || ')'
            FROM students s
            JOIN users u ON u.id = s.id
            ORDER BY u.name ASC, s.id ASC
            ",
            |row| Ok((StudentId::new(row.get(0)?), row.get(1)?)),
        )
    }

    pub fn list_advisor_options(&self) -> Result<Vec<LookupOption<StaffId>>> {
        self.list_options(
            "advisor options",
            "
            SELECT st.id, u.name || ' (' || st.role || ')'
            FROM staff st
            JOIN users u ON u.id = st.id
            ORDER BY u.name ASC, st.id ASC
            ",
            |row| Ok((StaffId::new(row.get(0)?), row.get(1)?)),
        )
    }

    pub fn list_program_options(&self) -> Result<Vec<LookupOption<ProgramId>>> {
        self.list_options(
            "program options",
            "
            SELECT id, name || ' (ID: ' || id || ')'
            FROM programs
            ORDER BY name ASC, id ASC
            ",
            |row| Ok((ProgramId::new(row.get(0)?), row.get(1)?)),
        )
    }

    fn list_options<Id>(
        &self,
        what: &str,
        sql: &str,
        map: fn(&Row<'_>) -> rusqlite::Result<(Id, String)>,
    ) -> Result<Vec<LookupOption<Id>>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(sql)
            .with_context(|| format!("prepare {what} query"))?;
        let rows = stmt
            .query_map([], |row| {
                let (id, label) = map(row)?;
                Ok(LookupOption { id, label })
            })
            .with_context(|| format!("query {what}"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("collect {what}"))
    }
}

fn or_empty<T>(what: &str, loaded: Result<Vec<T>>) -> Vec<T> {
    loaded.unwrap_or_else(|error| {
        warn!(lookup = what, "lookup load failed: {error:#}");
        Vec::new()
    })
}
