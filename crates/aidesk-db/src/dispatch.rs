// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use aidesk_app::{
    Action, ActionError, Command, DashboardKind, EnrollmentId, EnrollmentStatus, FormSnapshot,
    Notice, Outcome, SearchFilter, StudentId,
};
use rusqlite::{Connection, TransactionBehavior};
use tracing::{error, info, warn};

use crate::error::StoreError;
use crate::{Store, records};

impl Store {
    /// Runs one dashboard command and always finishes with a fresh read:
    /// unfiltered after a committed write, filtered by the form otherwise.
    pub fn execute(&self, command: &Command) -> Outcome {
        let kind = command.form.kind();
        if command.action == Action::Search {
            return self.render(kind, &command.form.search_filter(), None);
        }

        match self.apply(command) {
            Ok(message) => {
                info!(
                    dashboard = kind.label(),
                    action = command.action.label(),
                    "{message}"
                );
                self.render(kind, &SearchFilter::All, Some(Notice::success(message)))
            }
            Err(failure) => {
                if failure.is_warning() {
                    warn!(
                        dashboard = kind.label(),
                        action = command.action.label(),
                        "{failure}"
                    );
                } else {
                    error!(
                        dashboard = kind.label(),
                        action = command.action.label(),
                        "rolled back: {failure}"
                    );
                }
                self.render(
                    kind,
                    &command.form.search_filter(),
                    Some(Notice::from(&failure)),
                )
            }
        }
    }

    /// Validates and performs a write inside one transaction, returning the
    /// success message. Dropping the transaction on any error rolls it back.
    pub fn apply(&self, command: &Command) -> Result<String, ActionError> {
        let action = command.action;
        let kind = command.form.kind();
        command
            .form
            .validate_for(action)
            .map_err(|error| ActionError::validation(format!("{error:#}")))?;
        if action == Action::Search {
            return Ok(format!("{} search", kind.entity_label()));
        }

        let mut conn = self
            .connection()
            .map_err(|error| ActionError::Connection(format!("{error:#}")))?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|error| ActionError::Connection(error.to_string()))?;

        let target = command.form.target_id();
        let message = mutate(&tx, action, &command.form)
            .map_err(|failure| failure.into_action_error(kind, action, target))?;
        tx.commit()
            .map_err(|error| StoreError::classify(error, "commit transaction"))
            .map_err(|failure| failure.into_action_error(kind, action, target))?;
        Ok(message)
    }

    fn render(
        &self,
        kind: DashboardKind,
        filter: &SearchFilter,
        notice: Option<Notice>,
    ) -> Outcome {
        match self.search(kind, filter) {
            Ok(result) => Outcome::table(notice, result),
            Err(failure) => {
                error!(dashboard = kind.label(), "read failed: {failure:#}");
                Outcome::alert(notice, format!("could not load {}: {failure:#}", kind.label()))
            }
        }
    }
}

/// Write-path failures before they are mapped onto [`ActionError`].
enum Failure {
    Store(StoreError),
    Rejected(ActionError),
}

impl From<StoreError> for Failure {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl Failure {
    fn into_action_error(self, kind: DashboardKind, action: Action, id: i64) -> ActionError {
        match self {
            Self::Rejected(error) => error,
            Self::Store(error) => error.into_action_error(kind, action, id),
        }
    }
}

impl StoreError {
    fn into_action_error(self, kind: DashboardKind, action: Action, id: i64) -> ActionError {
        match self {
            Self::UniqueViolation(detail) => {
                ActionError::DuplicateKey(duplicate_message(kind, id, &detail))
            }
            Self::ForeignKeyViolation(_) if action == Action::Delete => {
                ActionError::ReferentialIntegrity(dependents_message(kind, id))
            }
            Self::ForeignKeyViolation(_) => ActionError::ReferentialIntegrity(format!(
                "{} refers to a record that no longer exists -- refresh the lists (Ctrl-R) and retry",
                kind.entity_label()
            )),
            Self::NotFound { entity, id } => ActionError::NotFound { entity, id },
            Self::Other(error) => ActionError::Storage(format!(
                "{} {} failed: {error:#}",
                action.label(),
                kind.entity_label()
            )),
        }
    }
}

fn mutate(conn: &Connection, action: Action, form: &FormSnapshot) -> Result<String, Failure> {
    let message = match (form, action) {
        (_, Action::Search) => String::new(),
        (FormSnapshot::Program(program), Action::Insert) => {
            let id = records::insert_program(conn, program)?;
            format!("program {id} inserted")
        }
        (FormSnapshot::Program(program), Action::Update) => {
            records::update_program(conn, program)?;
            format!("program {} updated", program.id)
        }
        (FormSnapshot::Program(program), Action::Delete) => {
            records::delete_program(conn, program.id)?;
            format!("program {} deleted", program.id)
        }
        (FormSnapshot::User(user), Action::Insert) => {
            let id = records::insert_user(conn, user)?;
            format!("user {id} inserted")
        }
        (FormSnapshot::User(user), Action::Update) => {
            records::update_user(conn, user)?;
            format!("user {} updated", user.id)
        }
        (FormSnapshot::User(user), Action::Delete) => {
            records::delete_user(conn, user.id)?;
            format!("user {} deleted", user.id)
        }
        (FormSnapshot::Holder(holder), action) => {
            let Some(enrollment_id) = holder.enrollment_id else {
                return Err(Failure::Rejected(ActionError::validation(
                    "enrollment is required -- choose an approved enrollment and retry",
                )));
            };
            match action {
                Action::Insert => {
                    if records::holder_exists(conn, enrollment_id)? {
                        return Err(Failure::Rejected(ActionError::DuplicateKey(format!(
                            "enrollment {enrollment_id} already has a scholarship holder"
                        ))));
                    }
                    check_enrollment(conn, holder.student_id, enrollment_id)?;
                    records::insert_holder(conn, enrollment_id, holder)?;
                    format!("scholarship holder {enrollment_id} inserted")
                }
                Action::Update => {
                    if !records::holder_exists(conn, enrollment_id)? {
                        return Err(Failure::Store(StoreError::NotFound {
                            entity: "scholarship holder",
                            id: enrollment_id.get(),
                        }));
                    }
                    check_enrollment(conn, holder.student_id, enrollment_id)?;
                    records::update_holder(conn, enrollment_id, holder)?;
                    format!("scholarship holder {enrollment_id} updated")
                }
                Action::Delete => {
                    records::delete_holder(conn, enrollment_id)?;
                    format!("scholarship holder {enrollment_id} deleted")
                }
                Action::Search => String::new(),
            }
        }
        (FormSnapshot::Call(call), Action::Insert) => {
            let id = records::insert_call(conn, call)?;
            format!("call {id} inserted")
        }
        (FormSnapshot::Call(call), Action::Update) => {
            records::update_call(conn, call)?;
            format!("call {} updated", call.id)
        }
        (FormSnapshot::Call(call), Action::Delete) => {
            records::delete_call(conn, call.id)?;
            format!("call {} deleted", call.id)
        }
    };
    Ok(message)
}

/// Only an approved enrollment of the selected student can become a holder.
fn check_enrollment(
    conn: &Connection,
    student_id: Option<StudentId>,
    enrollment_id: EnrollmentId,
) -> Result<(), Failure> {
    let Some(facts) = records::enrollment_facts(conn, enrollment_id)? else {
        return Err(Failure::Rejected(ActionError::Validation(format!(
            "enrollment {enrollment_id} does not exist -- refresh the lists (Ctrl-R) and retry"
        ))));
    };
    if facts.status != Some(EnrollmentStatus::Approved) {
        return Err(Failure::Rejected(ActionError::Validation(format!(
            "enrollment {enrollment_id} is not approved -- approve it before registering a holder"
        ))));
    }
    if let Some(student_id) = student_id
        && student_id != facts.student_id
    {
        return Err(Failure::Rejected(ActionError::Validation(format!(
            "enrollment {enrollment_id} belongs to student {} -- choose that student and retry",
            facts.student_id
        ))));
    }
    Ok(())
}

fn duplicate_message(kind: DashboardKind, id: i64, detail: &str) -> String {
    match kind {
        DashboardKind::Holders => {
            format!("enrollment {id} already has a scholarship holder")
        }
        DashboardKind::Users => {
            let field = match detail.rsplit('.').next() {
                Some("national_id") => "national id",
                Some("email") => "email",
                _ => "key",
            };
            format!("a user with this {field} already exists -- use a different {field} and retry")
        }
        _ => format!("{} already exists: {detail}", kind.entity_label()),
    }
}

fn dependents_message(kind: DashboardKind, id: i64) -> String {
    match kind {
        DashboardKind::Programs => {
            format!("program {id} still has dependent calls -- delete those calls first")
        }
        DashboardKind::Calls => {
            format!("call {id} still has dependent enrollments -- delete those enrollments first")
        }
        DashboardKind::Users => format!(
            "user {id} still has dependent student or staff records -- remove those records first"
        ),
        DashboardKind::Holders => {
            format!("scholarship holder {id} is still referenced by other records")
        }
    }
}
