// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use aidesk_app::{EnrollmentId, EnrollmentStatus, StaffId, StudentId};
use aidesk_testkit::{AidFaker, Enrollment, REFERENCE_YEAR};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::info;

use crate::{Store, format_date, records};

const DEMO_PROGRAMS: usize = 6;
const DEMO_STUDENTS: usize = 14;
const DEMO_STAFF: usize = 5;

impl Store {
    /// Fills an empty database with a coherent set of fake records.
    pub fn seed_demo_data(&self, seed: u64) -> Result<()> {
        let mut faker = AidFaker::new(seed);
        let mut conn = self.connection()?;
        let tx = conn.transaction().context("begin demo seed")?;

        let mut program_ids = Vec::with_capacity(DEMO_PROGRAMS);
        for _ in 0..DEMO_PROGRAMS {
            program_ids.push(records::insert_program(&tx, &faker.program())?);
        }

        let mut call_ids = Vec::new();
        for program_id in &program_ids {
            for _ in 0..=faker.int_n(2) {
                call_ids.push(records::insert_call(&tx, &faker.call(*program_id))?);
            }
        }

        let mut student_ids = Vec::with_capacity(DEMO_STUDENTS);
        for _ in 0..DEMO_STUDENTS {
            let user_id = records::insert_user(&tx, &faker.user())?;
            let intake_year = REFERENCE_YEAR - faker.int_n(4) as i32;
            let profile = faker.student(intake_year);
            tx.execute(
                "INSERT INTO students (id, registration) VALUES (?, ?)",
                params![user_id.get(), profile.registration],
            )
            .context("insert demo student")?;
            student_ids.push(StudentId::new(user_id.get()));
        }

        let mut staff_ids = Vec::with_capacity(DEMO_STAFF);
        for _ in 0..DEMO_STAFF {
            let user_id = records::insert_user(&tx, &faker.user())?;
            tx.execute(
                "INSERT INTO staff (id, role) VALUES (?, ?)",
                params![user_id.get(), faker.staff().role],
            )
            .context("insert demo staff member")?;
            staff_ids.push(StaffId::new(user_id.get()));
        }

        let mut holders = 0usize;
        for student_id in &student_ids {
            let call_id = call_ids[faker.int_n(call_ids.len())];
            let enrollment = faker.enrollment(*student_id, call_id);
            let enrollment_id = insert_enrollment(&tx, &enrollment)?;
            if enrollment.status == EnrollmentStatus::Approved && faker.int_n(3) > 0 {
                let advisor_id = staff_ids[faker.int_n(staff_ids.len())];
                let holder = faker.holder(enrollment_id, *student_id, advisor_id);
                records::insert_holder(&tx, enrollment_id, &holder)?;
                holders += 1;
            }
        }

        tx.commit().context("commit demo seed")?;
        info!(
            programs = program_ids.len(),
            calls = call_ids.len(),
            students = student_ids.len(),
            staff = staff_ids.len(),
            holders,
            "seeded demo data"
        );
        Ok(())
    }
}

fn insert_enrollment(conn: &Connection, enrollment: &Enrollment) -> Result<EnrollmentId> {
    conn.execute(
        "
        INSERT INTO enrollments (student_id, call_id, status, submitted_on)
        VALUES (?, ?, ?, ?)
        ",
        params![
            enrollment.student_id.get(),
            enrollment.call_id.get(),
            enrollment.status.as_str(),
            format_date(enrollment.submitted_on),
        ],
    )
    .context("insert enrollment")?;
    Ok(EnrollmentId::new(conn.last_insert_rowid()))
}
