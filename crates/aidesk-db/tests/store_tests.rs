// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use aidesk_app::{
    Action, ActionError, CallForm, CallId, CallStatus, Command, DashboardKind, EnrollmentId,
    FormSnapshot, HolderForm, PaymentFrequency, ProgramCategory, ProgramForm, ProgramId,
    SearchFilter, SearchResult, Severity, StaffId, StudentId, UserForm, UserId, View,
};
use aidesk_db::{Store, secret_digest, validate_db_path};
use aidesk_testkit::{AidFaker, fixture_date, temp_db_path};
use anyhow::{Result, bail};
use rusqlite::params;
use time::{Date, Month};

fn store() -> Result<Store> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    Ok(store)
}

fn program(name: &str) -> ProgramForm {
    ProgramForm {
        id: ProgramId::new(0),
        name: name.to_owned(),
        description: String::new(),
        amount_cents: 50_000,
        category: ProgramCategory::Assistance,
        slots: 10,
    }
}

fn user(national_id: &str, name: &str, email: &str) -> UserForm {
    UserForm {
        id: UserId::new(0),
        national_id: national_id.to_owned(),
        name: name.to_owned(),
        email: email.to_owned(),
        secret: "s3cret".to_owned(),
        address: String::new(),
        phone: String::new(),
    }
}

fn call(program_id: i64) -> CallForm {
    CallForm {
        id: CallId::new(0),
        start_date: fixture_date(),
        end_date: Date::from_calendar_date(2026, Month::March, 31).expect("valid date"),
        status: CallStatus::Open,
        program_id: Some(ProgramId::new(program_id)),
        program_filter: String::new(),
    }
}

fn holder(enrollment_id: i64, student_id: i64, advisor_id: i64) -> HolderForm {
    HolderForm {
        enrollment_id: Some(EnrollmentId::new(enrollment_id)),
        student_id: Some(StudentId::new(student_id)),
        advisor_id: Some(StaffId::new(advisor_id)),
        start_date: fixture_date(),
        end_date: Date::from_calendar_date(2027, Month::March, 1).expect("valid date"),
        terminated: false,
        termination_date: None,
        payment_frequency: PaymentFrequency::Monthly,
        student_filter: String::new(),
    }
}

fn count(store: &Store, table: &str) -> Result<i64> {
    let conn = store.connection()?;
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?)
}

/// One program, one call, one student (user 1), one advisor (user 2) and
/// the given enrollment rows for that student.
fn seed_enrollments(store: &Store, enrollments: &[(i64, &str)]) -> Result<()> {
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::Program(program("Auxílio Moradia")),
    ))?;
    store.apply(&Command::new(Action::Insert, FormSnapshot::Call(call(1))))?;
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::User(user("111", "Ana Souza", "ana@example.edu")),
    ))?;
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::User(user("222", "Bruno Lima", "bruno@example.edu")),
    ))?;

    let conn = store.connection()?;
    conn.execute(
        "INSERT INTO students (id, registration) VALUES (1, '2023001')",
        [],
    )?;
    conn.execute("INSERT INTO staff (id, role) VALUES (2, 'Professor')", [])?;
    for (id, status) in enrollments {
        conn.execute(
            "
            INSERT INTO enrollments (id, student_id, call_id, status, submitted_on)
            VALUES (?, 1, 1, ?, '2026-02-01')
            ",
            params![id, status],
        )?;
    }
    Ok(())
}

fn table(view: View) -> Result<SearchResult> {
    match view {
        View::Table(result) => Ok(result),
        View::Alert(message) => bail!("unexpected alert: {message}"),
    }
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("/tmp/aidesk.db").is_ok());
}

#[test]
fn bootstrap_rejects_schema_missing_required_column() -> Result<()> {
    let store = store()?;
    store.connection()?.execute_batch(
        "
        DROP TABLE scholarship_holders;
        CREATE TABLE scholarship_holders (
          enrollment_id INTEGER PRIMARY KEY,
          student_id INTEGER NOT NULL,
          advisor_id INTEGER NOT NULL,
          start_date TEXT NOT NULL,
          end_date TEXT NOT NULL
        );
        ",
    )?;

    let error = store
        .bootstrap()
        .expect_err("schema validation should fail");
    let message = error.to_string();
    assert!(message.contains("table `scholarship_holders` is missing required columns"));
    assert!(message.contains("payment_frequency"));
    Ok(())
}

#[test]
fn file_store_persists_across_reopen() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        store.apply(&Command::new(
            Action::Insert,
            FormSnapshot::Program(program("Auxílio Transporte")),
        ))?;
    }
    let store = Store::open(&path)?;
    store.bootstrap()?;
    assert_eq!(count(&store, "programs")?, 1);
    Ok(())
}

#[test]
fn insert_program_then_search_by_id() -> Result<()> {
    let store = store()?;
    let outcome = store.execute(&Command::new(
        Action::Insert,
        FormSnapshot::Program(program("Auxílio Moradia")),
    ));
    let notice = outcome.notice.clone().expect("success notice");
    assert_eq!(notice.severity, Severity::Success);
    assert_eq!(notice.message, "program 1 inserted");

    let result = store.search(DashboardKind::Programs, &SearchFilter::ById(1))?;
    let SearchResult::Programs(rows) = result else {
        bail!("expected program rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Auxílio Moradia");
    assert_eq!(rows[0].amount_cents, 50_000);
    assert_eq!(rows[0].category, ProgramCategory::Assistance);
    assert_eq!(rows[0].slots, 10);
    Ok(())
}

#[test]
fn search_with_id_ignores_text_filter() -> Result<()> {
    let store = store()?;
    for name in ["Auxílio Moradia", "Bolsa Monitoria", "Auxílio Creche"] {
        store.apply(&Command::new(
            Action::Insert,
            FormSnapshot::Program(program(name)),
        ))?;
    }

    let mut form = program("Monitoria");
    form.id = ProgramId::new(3);
    let outcome = store.execute(&Command::search(FormSnapshot::Program(form)));
    let SearchResult::Programs(rows) = table(outcome.view)? else {
        bail!("expected program rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Auxílio Creche");
    Ok(())
}

#[test]
fn empty_filters_return_everything_in_dashboard_order() -> Result<()> {
    let store = store()?;
    for name in ["C", "A", "B"] {
        store.apply(&Command::new(
            Action::Insert,
            FormSnapshot::Program(program(name)),
        ))?;
    }
    for _ in 0..3 {
        store.apply(&Command::new(Action::Insert, FormSnapshot::Call(call(1))))?;
    }

    let SearchResult::Programs(programs) =
        store.search(DashboardKind::Programs, &SearchFilter::All)?
    else {
        bail!("expected program rows");
    };
    let ids = programs.iter().map(|p| p.id.get()).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 3]);

    let SearchResult::Calls(calls) = store.search(DashboardKind::Calls, &SearchFilter::All)?
    else {
        bail!("expected call rows");
    };
    let ids = calls.iter().map(|c| c.id.get()).collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 2, 1]);
    assert!(calls.iter().all(|c| c.program_name == "C"));
    Ok(())
}

#[test]
fn name_filter_is_case_insensitive_and_accent_aware() -> Result<()> {
    let store = store()?;
    for name in ["Auxílio Moradia", "Bolsa Monitoria", "AUXÍLIO CRECHE"] {
        store.apply(&Command::new(
            Action::Insert,
            FormSnapshot::Program(program(name)),
        ))?;
    }

    let SearchResult::Programs(rows) = store.search(
        DashboardKind::Programs,
        &SearchFilter::NameContains("auxílio".to_owned()),
    )?
    else {
        bail!("expected program rows");
    };
    let names = rows.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Auxílio Moradia", "AUXÍLIO CRECHE"]);
    Ok(())
}

#[test]
fn duplicate_email_is_rejected_and_count_unchanged() -> Result<()> {
    let store = store()?;
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::User(user("111", "Ana Souza", "ana@example.edu")),
    ))?;

    let error = store
        .apply(&Command::new(
            Action::Insert,
            FormSnapshot::User(user("222", "Ana Clara", "ana@example.edu")),
        ))
        .expect_err("duplicate email");
    assert!(matches!(error, ActionError::DuplicateKey(_)));
    assert!(error.to_string().contains("email"));
    assert_eq!(count(&store, "users")?, 1);
    Ok(())
}

#[test]
fn user_secret_is_stored_as_digest() -> Result<()> {
    let store = store()?;
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::User(user("111", "Ana Souza", "ana@example.edu")),
    ))?;
    let SearchResult::Users(rows) = store.search(DashboardKind::Users, &SearchFilter::All)? else {
        bail!("expected user rows");
    };
    assert_eq!(rows[0].secret_sha256, secret_digest("s3cret"));
    Ok(())
}

#[test]
fn update_and_delete_of_missing_rows_report_not_found() -> Result<()> {
    let store = store()?;
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::Program(program("Auxílio Moradia")),
    ))?;

    let mut missing = program("Ghost");
    missing.id = ProgramId::new(99);
    for action in [Action::Update, Action::Delete] {
        let error = store
            .apply(&Command::new(action, FormSnapshot::Program(missing.clone())))
            .expect_err("row 99 does not exist");
        assert_eq!(
            error,
            ActionError::NotFound {
                entity: "program",
                id: 99
            }
        );
    }

    let SearchResult::Programs(rows) = store.search(DashboardKind::Programs, &SearchFilter::All)?
    else {
        bail!("expected program rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Auxílio Moradia");
    Ok(())
}

#[test]
fn not_found_is_a_warning_and_table_still_refreshes() -> Result<()> {
    let store = store()?;
    let mut missing = call(1);
    missing.id = CallId::new(5);
    let outcome = store.execute(&Command::new(Action::Delete, FormSnapshot::Call(missing)));
    let notice = outcome.notice.clone().expect("warning notice");
    assert_eq!(notice.severity, Severity::Warning);
    assert!(table(outcome.view)?.is_empty());
    Ok(())
}

#[test]
fn update_overwrites_every_field() -> Result<()> {
    let store = store()?;
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::Program(program("Auxílio Moradia")),
    ))?;

    let updated = ProgramForm {
        id: ProgramId::new(1),
        name: "Auxílio Moradia Estudantil".to_owned(),
        description: "Housing support".to_owned(),
        amount_cents: 75_050,
        category: ProgramCategory::Other,
        slots: 4,
    };
    store.apply(&Command::new(
        Action::Update,
        FormSnapshot::Program(updated.clone()),
    ))?;

    let result = store.search(DashboardKind::Programs, &SearchFilter::ById(1))?;
    let SearchResult::Programs(rows) = result else {
        bail!("expected program rows");
    };
    assert_eq!(rows[0].name, updated.name);
    assert_eq!(rows[0].description, updated.description);
    assert_eq!(rows[0].amount_cents, updated.amount_cents);
    assert_eq!(rows[0].category, updated.category);
    assert_eq!(rows[0].slots, updated.slots);
    Ok(())
}

#[test]
fn delete_program_with_calls_is_rejected() -> Result<()> {
    let store = store()?;
    for name in ["A", "B", "C"] {
        store.apply(&Command::new(
            Action::Insert,
            FormSnapshot::Program(program(name)),
        ))?;
    }
    store.apply(&Command::new(Action::Insert, FormSnapshot::Call(call(3))))?;

    let mut target = program("C");
    target.id = ProgramId::new(3);
    let outcome = store.execute(&Command::new(
        Action::Delete,
        FormSnapshot::Program(target.clone()),
    ));
    let notice = outcome.notice.clone().expect("error notice");
    assert_eq!(notice.severity, Severity::Error);
    assert!(notice.message.contains("calls"), "{}", notice.message);

    let error = store
        .apply(&Command::new(Action::Delete, FormSnapshot::Program(target)))
        .expect_err("program 3 has a call");
    assert!(matches!(error, ActionError::ReferentialIntegrity(_)));
    assert_eq!(count(&store, "programs")?, 3);
    Ok(())
}

#[test]
fn delete_user_with_student_record_is_rejected() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[])?;

    let mut target = user("111", "Ana Souza", "ana@example.edu");
    target.id = UserId::new(1);
    let error = store
        .apply(&Command::new(Action::Delete, FormSnapshot::User(target)))
        .expect_err("user 1 is a student");
    let ActionError::ReferentialIntegrity(message) = error else {
        bail!("expected referential integrity error, got {error:?}");
    };
    assert!(message.contains("student or staff"));
    assert_eq!(count(&store, "users")?, 2);
    Ok(())
}

#[test]
fn delete_call_with_enrollments_is_rejected() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(7, "pending")])?;

    let mut target = call(1);
    target.id = CallId::new(1);
    let outcome = store.execute(&Command::new(Action::Delete, FormSnapshot::Call(target)));
    let notice = outcome.notice.clone().expect("error notice");
    assert_eq!(notice.severity, Severity::Error);
    assert!(
        notice.message.contains("dependent enrollments"),
        "{}",
        notice.message
    );
    let result = table(outcome.view)?;
    assert_eq!(result.len(), 1);
    assert_eq!(count(&store, "calls")?, 1);
    assert_eq!(count(&store, "enrollments")?, 1);
    Ok(())
}

#[test]
fn delete_user_with_staff_record_is_rejected() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[])?;

    let mut target = user("222", "Bruno Lima", "bruno@example.edu");
    target.id = UserId::new(2);
    let error = store
        .apply(&Command::new(Action::Delete, FormSnapshot::User(target)))
        .expect_err("user 2 is staff");
    let ActionError::ReferentialIntegrity(message) = error else {
        bail!("expected referential integrity error, got {error:?}");
    };
    assert!(message.contains("student or staff"));
    assert_eq!(count(&store, "staff")?, 1);
    Ok(())
}

#[test]
fn holder_insert_with_non_staff_advisor_is_rejected() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(7, "approved")])?;

    let error = store
        .apply(&Command::new(
            Action::Insert,
            FormSnapshot::Holder(holder(7, 1, 1)),
        ))
        .expect_err("user 1 is not staff");
    assert!(matches!(error, ActionError::ReferentialIntegrity(_)));
    assert_eq!(count(&store, "scholarship_holders")?, 0);
    Ok(())
}

#[test]
fn call_insert_with_unknown_program_is_rejected() -> Result<()> {
    let store = store()?;
    let error = store
        .apply(&Command::new(Action::Insert, FormSnapshot::Call(call(42))))
        .expect_err("program 42 does not exist");
    assert!(matches!(error, ActionError::ReferentialIntegrity(_)));
    assert_eq!(count(&store, "calls")?, 0);
    Ok(())
}

#[test]
fn holder_insert_succeeds_once_per_enrollment() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(7, "approved")])?;

    let message = store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::Holder(holder(7, 1, 2)),
    ))?;
    assert_eq!(message, "scholarship holder 7 inserted");

    let error = store
        .apply(&Command::new(
            Action::Insert,
            FormSnapshot::Holder(holder(7, 1, 2)),
        ))
        .expect_err("enrollment 7 already has a holder");
    assert!(matches!(error, ActionError::DuplicateKey(_)));

    let conn = store.connection()?;
    let rows: i64 = conn.query_row(
        "SELECT COUNT(*) FROM scholarship_holders WHERE enrollment_id = 7",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(rows, 1);
    Ok(())
}

#[test]
fn holder_requires_an_approved_enrollment() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(4, "pending")])?;

    let error = store
        .apply(&Command::new(
            Action::Insert,
            FormSnapshot::Holder(holder(4, 1, 2)),
        ))
        .expect_err("enrollment 4 is pending");
    assert!(matches!(error, ActionError::Validation(_)));

    let error = store
        .apply(&Command::new(
            Action::Insert,
            FormSnapshot::Holder(holder(40, 1, 2)),
        ))
        .expect_err("enrollment 40 does not exist");
    assert!(matches!(error, ActionError::Validation(_)));
    assert_eq!(count(&store, "scholarship_holders")?, 0);
    Ok(())
}

#[test]
fn holder_termination_is_stored_only_when_ticked() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(7, "approved")])?;

    let mut form = holder(7, 1, 2);
    form.termination_date = Date::from_calendar_date(2026, Month::June, 1).ok();
    store.apply(&Command::new(Action::Insert, FormSnapshot::Holder(form.clone())))?;

    let SearchResult::Holders(rows) = store.search(DashboardKind::Holders, &SearchFilter::All)?
    else {
        bail!("expected holder rows");
    };
    assert_eq!(rows[0].termination_date, None);
    assert_eq!(rows[0].student_name, "Ana Souza");
    assert_eq!(rows[0].advisor_name, "Bruno Lima");

    form.terminated = true;
    store.apply(&Command::new(Action::Update, FormSnapshot::Holder(form.clone())))?;
    let SearchResult::Holders(rows) = store.search(DashboardKind::Holders, &SearchFilter::ById(7))?
    else {
        bail!("expected holder rows");
    };
    assert_eq!(rows[0].termination_date, form.termination_date);
    Ok(())
}

#[test]
fn holder_update_of_missing_enrollment_is_not_found() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(7, "approved")])?;

    let error = store
        .apply(&Command::new(
            Action::Update,
            FormSnapshot::Holder(holder(7, 1, 2)),
        ))
        .expect_err("no holder yet");
    assert_eq!(
        error,
        ActionError::NotFound {
            entity: "scholarship holder",
            id: 7
        }
    );
    Ok(())
}

#[test]
fn holder_update_keeps_the_enrollment_student() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(7, "approved")])?;
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::User(user("333", "Camila Rocha", "camila@example.edu")),
    ))?;
    store.connection()?.execute(
        "INSERT INTO students (id, registration) VALUES (3, '2023002')",
        [],
    )?;
    store.apply(&Command::new(
        Action::Insert,
        FormSnapshot::Holder(holder(7, 1, 2)),
    ))?;

    let error = store
        .apply(&Command::new(
            Action::Update,
            FormSnapshot::Holder(holder(7, 3, 2)),
        ))
        .expect_err("enrollment 7 belongs to student 1");
    let ActionError::Validation(message) = error else {
        bail!("expected validation error, got {error:?}");
    };
    assert!(message.contains("belongs to student 1"), "{message}");

    let stored: i64 = store.connection()?.query_row(
        "SELECT student_id FROM scholarship_holders WHERE enrollment_id = 7",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(stored, 1);
    Ok(())
}

#[test]
fn holders_sort_by_start_date_descending() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(1, "approved"), (2, "approved"), (3, "approved")])?;

    let starts = [
        (1, Month::January),
        (2, Month::May),
        (3, Month::May),
    ];
    for (enrollment, month) in starts {
        let mut form = holder(enrollment, 1, 2);
        form.start_date = Date::from_calendar_date(2026, month, 1)?;
        store.apply(&Command::new(Action::Insert, FormSnapshot::Holder(form)))?;
    }

    let SearchResult::Holders(rows) = store.search(DashboardKind::Holders, &SearchFilter::All)?
    else {
        bail!("expected holder rows");
    };
    let ids = rows
        .iter()
        .map(|h| h.enrollment_id.get())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 2, 1]);
    Ok(())
}

#[test]
fn failed_validation_writes_nothing() -> Result<()> {
    let store = store()?;
    let outcome = store.execute(&Command::new(
        Action::Insert,
        FormSnapshot::Program(program("   ")),
    ));
    let notice = outcome.notice.clone().expect("validation notice");
    assert_eq!(notice.severity, Severity::Warning);
    assert!(notice.message.contains("program name is required"));
    assert_eq!(count(&store, "programs")?, 0);
    Ok(())
}

#[test]
fn lookups_label_options() -> Result<()> {
    let store = store()?;
    seed_enrollments(&store, &[(7, "approved"), (8, "rejected")])?;

    let lookups = store.load_lookups(DashboardKind::Holders);
    assert_eq!(lookups.enrollments.len(), 1);
    assert_eq!(lookups.enrollments[0].label, "Enrollment #7 - Ana Souza");
    assert_eq!(lookups.students[0].label, "Ana Souza (Reg: 2023001)");
    assert_eq!(lookups.advisors[0].label, "Bruno Lima (Professor)");

    let lookups = store.load_lookups(DashboardKind::Calls);
    assert_eq!(lookups.programs[0].label, "Auxílio Moradia (ID: 1)");
    assert_eq!(lookups.programs[0].id, ProgramId::new(1));
    Ok(())
}

#[test]
fn demo_seed_produces_consistent_data() -> Result<()> {
    let store = store()?;
    store.seed_demo_data(7)?;

    assert!(count(&store, "programs")? > 0);
    assert!(count(&store, "calls")? > 0);
    let orphans: i64 = store.connection()?.query_row(
        "
        SELECT COUNT(*)
        FROM scholarship_holders h
        JOIN enrollments e ON e.id = h.enrollment_id
        WHERE e.status != 'approved' OR e.student_id != h.student_id
        ",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(orphans, 0);

    let result = store.search(DashboardKind::Holders, &SearchFilter::All)?;
    assert_eq!(result.kind(), DashboardKind::Holders);
    Ok(())
}

#[test]
fn faker_users_insert_cleanly() -> Result<()> {
    let store = store()?;
    let mut faker = AidFaker::new(21);
    for _ in 0..20 {
        store.apply(&Command::new(Action::Insert, FormSnapshot::User(faker.user())))?;
    }
    assert_eq!(count(&store, "users")?, 20);
    Ok(())
}
