// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Text buffers behind each dashboard form and their conversion into a
//! [`FormSnapshot`].

use aidesk_app::input::{
    format_cents_plain, format_date, parse_count, parse_id, parse_money, parse_optional_date,
    parse_required_date,
};
use aidesk_app::{
    CallForm, CallId, CallStatus, DashboardKind, EnrollmentId, FormSnapshot, HolderForm,
    LookupOption, Lookups, PaymentFrequency, ProgramCategory, ProgramForm, ProgramId,
    SearchResult, StaffId, StudentId, UserForm, UserId,
};
use anyhow::{Context, Result};
use time::Date;

const SECRET_MASK: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Id,
    Name,
    Description,
    Amount,
    Category,
    Slots,
    NationalId,
    Email,
    Secret,
    Address,
    Phone,
    Enrollment,
    Student,
    Advisor,
    StartDate,
    EndDate,
    Terminated,
    TerminationDate,
    Frequency,
    Status,
    Program,
    Filter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Secret(String),
    Toggle(bool),
    /// Index into the enum's `ALL` table.
    Variant(usize),
    /// Selected lookup id; `None` until the operator picks one.
    Pick(Option<i64>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: FieldKey,
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    fn text(key: FieldKey, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Text(value.into()),
        }
    }

    fn new(key: FieldKey, label: &'static str, value: FieldValue) -> Self {
        Self { key, label, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEditor {
    kind: DashboardKind,
    fields: Vec<Field>,
    cursor: usize,
}

impl FormEditor {
    pub fn blank(kind: DashboardKind, today: Date) -> Self {
        Self::from_snapshot(&FormSnapshot::blank_for(kind, today))
    }

    pub fn from_snapshot(snapshot: &FormSnapshot) -> Self {
        let fields = match snapshot {
            FormSnapshot::Program(form) => program_fields(form),
            FormSnapshot::User(form) => user_fields(form),
            FormSnapshot::Holder(form) => holder_fields(form),
            FormSnapshot::Call(form) => call_fields(form),
        };
        Self {
            kind: snapshot.kind(),
            fields,
            cursor: 0,
        }
    }

    pub fn kind(&self) -> DashboardKind {
        self.kind
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.fields.is_empty() {
            return;
        }
        let len = self.fields.len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        match self.fields.get_mut(self.cursor).map(|field| &mut field.value) {
            Some(FieldValue::Text(text) | FieldValue::Secret(text)) => {
                text.push(ch);
                true
            }
            _ => false,
        }
    }

    pub fn backspace(&mut self) -> bool {
        match self.fields.get_mut(self.cursor).map(|field| &mut field.value) {
            Some(FieldValue::Text(text) | FieldValue::Secret(text)) => text.pop().is_some(),
            _ => false,
        }
    }

    pub fn toggle(&mut self) -> bool {
        match self.fields.get_mut(self.cursor).map(|field| &mut field.value) {
            Some(FieldValue::Toggle(on)) => {
                *on = !*on;
                true
            }
            _ => false,
        }
    }

    /// Steps a select field through its options, wrapping at both ends.
    /// Lookup selects also pass through "nothing selected".
    pub fn cycle(&mut self, delta: isize, lookups: &Lookups) -> bool {
        let Some(field) = self.fields.get_mut(self.cursor) else {
            return false;
        };
        match &mut field.value {
            FieldValue::Variant(index) => {
                let len = variant_labels(field.key).len() as isize;
                if len == 0 {
                    return false;
                }
                *index = (*index as isize + delta).rem_euclid(len) as usize;
                true
            }
            FieldValue::Pick(selected) => {
                let ids = lookup_ids(field.key, lookups);
                if ids.is_empty() {
                    return false;
                }
                let position = selected
                    .and_then(|id| ids.iter().position(|candidate| *candidate == id))
                    .map_or(0, |position| position as isize + 1);
                let len = ids.len() as isize + 1;
                let next = (position + delta).rem_euclid(len) as usize;
                *selected = next.checked_sub(1).map(|index| ids[index]);
                true
            }
            _ => false,
        }
    }

    /// Refills the form from row `index` of a result table.
    pub fn load_row(&mut self, result: &SearchResult, index: usize) -> bool {
        let Some(snapshot) = snapshot_from_row(result, index) else {
            return false;
        };
        let cursor = self.cursor;
        *self = Self::from_snapshot(&snapshot);
        self.cursor = cursor.min(self.fields.len().saturating_sub(1));
        true
    }

    pub fn display_value(&self, field: &Field, lookups: &Lookups) -> String {
        match &field.value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Secret(text) => SECRET_MASK.to_string().repeat(text.chars().count()),
            FieldValue::Toggle(true) => "[x]".to_owned(),
            FieldValue::Toggle(false) => "[ ]".to_owned(),
            FieldValue::Variant(index) => variant_labels(field.key)
                .get(*index)
                .copied()
                .unwrap_or_default()
                .to_owned(),
            FieldValue::Pick(None) => "(none)".to_owned(),
            FieldValue::Pick(Some(id)) => lookup_label(field.key, *id, lookups),
        }
    }

    /// Parses the buffers into a typed snapshot, naming the offending field
    /// when a value does not parse.
    pub fn snapshot(&self) -> Result<FormSnapshot> {
        let snapshot = match self.kind {
            DashboardKind::Programs => FormSnapshot::Program(ProgramForm {
                id: ProgramId::new(self.id_field(FieldKey::Id)?),
                name: self.text(FieldKey::Name),
                description: self.text(FieldKey::Description),
                amount_cents: parse_money(&self.text(FieldKey::Amount))
                    .context("amount")?,
                category: ProgramCategory::ALL[self.variant(FieldKey::Category)],
                slots: parse_count(&self.text(FieldKey::Slots)).context("slots")?,
            }),
            DashboardKind::Users => FormSnapshot::User(UserForm {
                id: UserId::new(self.id_field(FieldKey::Id)?),
                national_id: self.text(FieldKey::NationalId),
                name: self.text(FieldKey::Name),
                email: self.text(FieldKey::Email),
                secret: self.text(FieldKey::Secret),
                address: self.text(FieldKey::Address),
                phone: self.text(FieldKey::Phone),
            }),
            DashboardKind::Holders => FormSnapshot::Holder(HolderForm {
                enrollment_id: self.pick(FieldKey::Enrollment).map(EnrollmentId::new),
                student_id: self.pick(FieldKey::Student).map(StudentId::new),
                advisor_id: self.pick(FieldKey::Advisor).map(StaffId::new),
                start_date: self.required_date(FieldKey::StartDate, "start date")?,
                end_date: self.required_date(FieldKey::EndDate, "end date")?,
                terminated: self.toggled(FieldKey::Terminated),
                termination_date: parse_optional_date(&self.text(FieldKey::TerminationDate))
                    .context("termination date")?,
                payment_frequency: PaymentFrequency::ALL[self.variant(FieldKey::Frequency)],
                student_filter: self.text(FieldKey::Filter),
            }),
            DashboardKind::Calls => FormSnapshot::Call(CallForm {
                id: CallId::new(self.id_field(FieldKey::Id)?),
                start_date: self.required_date(FieldKey::StartDate, "start date")?,
                end_date: self.required_date(FieldKey::EndDate, "end date")?,
                status: CallStatus::ALL[self.variant(FieldKey::Status)],
                program_id: self.pick(FieldKey::Program).map(ProgramId::new),
                program_filter: self.text(FieldKey::Filter),
            }),
        };
        Ok(snapshot)
    }

    fn value(&self, key: FieldKey) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| &field.value)
    }

    fn text(&self, key: FieldKey) -> String {
        match self.value(key) {
            Some(FieldValue::Text(text) | FieldValue::Secret(text)) => text.clone(),
            _ => String::new(),
        }
    }

    fn toggled(&self, key: FieldKey) -> bool {
        matches!(self.value(key), Some(FieldValue::Toggle(true)))
    }

    fn variant(&self, key: FieldKey) -> usize {
        let len = variant_labels(key).len();
        match self.value(key) {
            Some(FieldValue::Variant(index)) if *index < len => *index,
            _ => 0,
        }
    }

    fn pick(&self, key: FieldKey) -> Option<i64> {
        match self.value(key) {
            Some(FieldValue::Pick(selected)) => *selected,
            _ => None,
        }
    }

    fn id_field(&self, key: FieldKey) -> Result<i64> {
        parse_id(&self.text(key)).context("id")
    }

    fn required_date(&self, key: FieldKey, label: &'static str) -> Result<Date> {
        parse_required_date(&self.text(key)).context(label)
    }
}

fn id_text(id: i64) -> String {
    if id > 0 {
        id.to_string()
    } else {
        String::new()
    }
}

fn program_fields(form: &ProgramForm) -> Vec<Field> {
    let category = ProgramCategory::ALL
        .iter()
        .position(|candidate| *candidate == form.category)
        .unwrap_or(0);
    vec![
        Field::text(FieldKey::Id, "id", id_text(form.id.get())),
        Field::text(FieldKey::Name, "name", form.name.clone()),
        Field::text(FieldKey::Description, "description", form.description.clone()),
        Field::text(
            FieldKey::Amount,
            "amount (R$)",
            format_cents_plain(form.amount_cents),
        ),
        Field::new(
            FieldKey::Category,
            "category",
            FieldValue::Variant(category),
        ),
        Field::text(FieldKey::Slots, "slots", form.slots.to_string()),
    ]
}

fn user_fields(form: &UserForm) -> Vec<Field> {
    vec![
        Field::text(FieldKey::Id, "id", id_text(form.id.get())),
        Field::text(FieldKey::NationalId, "national id", form.national_id.clone()),
        Field::text(FieldKey::Name, "name", form.name.clone()),
        Field::text(FieldKey::Email, "email", form.email.clone()),
        Field::new(
            FieldKey::Secret,
            "secret",
            FieldValue::Secret(form.secret.clone()),
        ),
        Field::text(FieldKey::Address, "address", form.address.clone()),
        Field::text(FieldKey::Phone, "phone", form.phone.clone()),
    ]
}

fn holder_fields(form: &HolderForm) -> Vec<Field> {
    let frequency = PaymentFrequency::ALL
        .iter()
        .position(|candidate| *candidate == form.payment_frequency)
        .unwrap_or(0);
    vec![
        Field::new(
            FieldKey::Enrollment,
            "enrollment",
            FieldValue::Pick(form.enrollment_id.map(EnrollmentId::get)),
        ),
        Field::new(
            FieldKey::Student,
            "student",
            FieldValue::Pick(form.student_id.map(StudentId::get)),
        ),
        Field::new(
            FieldKey::Advisor,
            "advisor",
            FieldValue::Pick(form.advisor_id.map(StaffId::get)),
        ),
        Field::text(
            FieldKey::StartDate,
            "start date",
            format_date(Some(form.start_date)),
        ),
        Field::text(
            FieldKey::EndDate,
            "end date",
            format_date(Some(form.end_date)),
        ),
        Field::new(
            FieldKey::Terminated,
            "terminated",
            FieldValue::Toggle(form.terminated),
        ),
        Field::text(
            FieldKey::TerminationDate,
            "termination date",
            format_date(form.termination_date),
        ),
        Field::new(
            FieldKey::Frequency,
            "payment frequency",
            FieldValue::Variant(frequency),
        ),
        Field::text(
            FieldKey::Filter,
            "student name contains",
            form.student_filter.clone(),
        ),
    ]
}

fn call_fields(form: &CallForm) -> Vec<Field> {
    let status = CallStatus::ALL
        .iter()
        .position(|candidate| *candidate == form.status)
        .unwrap_or(0);
    vec![
        Field::text(FieldKey::Id, "id", id_text(form.id.get())),
        Field::text(
            FieldKey::StartDate,
            "start date",
            format_date(Some(form.start_date)),
        ),
        Field::text(
            FieldKey::EndDate,
            "end date",
            format_date(Some(form.end_date)),
        ),
        Field::new(FieldKey::Status, "status", FieldValue::Variant(status)),
        Field::new(
            FieldKey::Program,
            "program",
            FieldValue::Pick(form.program_id.map(ProgramId::get)),
        ),
        Field::text(
            FieldKey::Filter,
            "program name contains",
            form.program_filter.clone(),
        ),
    ]
}

fn snapshot_from_row(result: &SearchResult, index: usize) -> Option<FormSnapshot> {
    let snapshot = match result {
        SearchResult::Programs(rows) => {
            let row = rows.get(index)?;
            FormSnapshot::Program(ProgramForm {
                id: row.id,
                name: row.name.clone(),
                description: row.description.clone(),
                amount_cents: row.amount_cents,
                category: row.category,
                slots: row.slots,
            })
        }
        SearchResult::Users(rows) => {
            let row = rows.get(index)?;
            FormSnapshot::User(UserForm {
                id: row.id,
                national_id: row.national_id.clone(),
                name: row.name.clone(),
                email: row.email.clone(),
                secret: String::new(),
                address: row.address.clone(),
                phone: row.phone.clone(),
            })
        }
        SearchResult::Holders(rows) => {
            let row = rows.get(index)?;
            FormSnapshot::Holder(HolderForm {
                enrollment_id: Some(row.enrollment_id),
                student_id: Some(row.student_id),
                advisor_id: Some(row.advisor_id),
                start_date: row.start_date,
                end_date: row.end_date,
                terminated: row.termination_date.is_some(),
                termination_date: row.termination_date,
                payment_frequency: row.payment_frequency,
                student_filter: String::new(),
            })
        }
        SearchResult::Calls(rows) => {
            let row = rows.get(index)?;
            FormSnapshot::Call(CallForm {
                id: row.id,
                start_date: row.start_date,
                end_date: row.end_date,
                status: row.status,
                program_id: Some(row.program_id),
                program_filter: String::new(),
            })
        }
    };
    Some(snapshot)
}

fn variant_labels(key: FieldKey) -> Vec<&'static str> {
    match key {
        FieldKey::Category => ProgramCategory::ALL.iter().map(|c| c.label()).collect(),
        FieldKey::Frequency => PaymentFrequency::ALL.iter().map(|f| f.label()).collect(),
        FieldKey::Status => CallStatus::ALL.iter().map(|s| s.label()).collect(),
        _ => Vec::new(),
    }
}

fn lookup_ids(key: FieldKey, lookups: &Lookups) -> Vec<i64> {
    match key {
        FieldKey::Enrollment => ids_of(&lookups.enrollments, EnrollmentId::get),
        FieldKey::Student => ids_of(&lookups.students, StudentId::get),
        FieldKey::Advisor => ids_of(&lookups.advisors, StaffId::get),
        FieldKey::Program => ids_of(&lookups.programs, ProgramId::get),
        _ => Vec::new(),
    }
}

fn lookup_label(key: FieldKey, id: i64, lookups: &Lookups) -> String {
    let label = match key {
        FieldKey::Enrollment => label_of(&lookups.enrollments, EnrollmentId::get, id),
        FieldKey::Student => label_of(&lookups.students, StudentId::get, id),
        FieldKey::Advisor => label_of(&lookups.advisors, StaffId::get, id),
        FieldKey::Program => label_of(&lookups.programs, ProgramId::get, id),
        _ => None,
    };
    label.unwrap_or_else(|| format!("#{id}"))
}

fn ids_of<Id: Copy>(options: &[LookupOption<Id>], get: fn(Id) -> i64) -> Vec<i64> {
    options.iter().map(|option| get(option.id)).collect()
}

fn label_of<Id: Copy>(
    options: &[LookupOption<Id>],
    get: fn(Id) -> i64,
    id: i64,
) -> Option<String> {
    options
        .iter()
        .find(|option| get(option.id) == id)
        .map(|option| option.label.clone())
}

#[cfg(test)]
mod tests {
    use super::{FieldKey, FieldValue, FormEditor};
    use aidesk_app::{
        DashboardKind, FormSnapshot, LookupOption, Lookups, Program, ProgramCategory, ProgramId,
        SearchResult, StudentId,
    };
    use anyhow::Result;
    use time::{Date, Month};

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::March, 1).expect("valid date")
    }

    fn focus(editor: &mut FormEditor, key: FieldKey) {
        while editor.focused().map(|field| field.key) != Some(key) {
            editor.move_cursor(1);
        }
    }

    fn type_text(editor: &mut FormEditor, text: &str) {
        for ch in text.chars() {
            editor.insert_char(ch);
        }
    }

    #[test]
    fn typed_program_fields_become_a_snapshot() -> Result<()> {
        let mut editor = FormEditor::blank(DashboardKind::Programs, today());
        focus(&mut editor, FieldKey::Name);
        type_text(&mut editor, "Auxílio Moradia");
        focus(&mut editor, FieldKey::Amount);
        while editor.backspace() {}
        type_text(&mut editor, "500.00");
        focus(&mut editor, FieldKey::Slots);
        while editor.backspace() {}
        type_text(&mut editor, "10");

        let FormSnapshot::Program(form) = editor.snapshot()? else {
            anyhow::bail!("expected a program snapshot");
        };
        assert_eq!(form.id, ProgramId::new(0));
        assert_eq!(form.name, "Auxílio Moradia");
        assert_eq!(form.amount_cents, 50_000);
        assert_eq!(form.category, ProgramCategory::Assistance);
        assert_eq!(form.slots, 10);
        Ok(())
    }

    #[test]
    fn unparseable_text_names_the_field() {
        let mut editor = FormEditor::blank(DashboardKind::Programs, today());
        focus(&mut editor, FieldKey::Amount);
        type_text(&mut editor, "abc");

        let error = editor.snapshot().expect_err("amount should not parse");
        assert_eq!(error.to_string(), "amount");
        assert!(format!("{error:#}").contains("invalid money value"));
    }

    #[test]
    fn cycle_walks_lookup_options_through_none() {
        let lookups = Lookups {
            students: vec![
                LookupOption {
                    id: StudentId::new(4),
                    label: "Ana Souza (Reg: 2023001)".to_owned(),
                },
                LookupOption {
                    id: StudentId::new(9),
                    label: "Bruno Lima (Reg: 2024002)".to_owned(),
                },
            ],
            ..Lookups::default()
        };
        let mut editor = FormEditor::blank(DashboardKind::Holders, today());
        focus(&mut editor, FieldKey::Student);

        assert!(editor.cycle(1, &lookups));
        assert_eq!(editor.focused().map(|f| &f.value), Some(&FieldValue::Pick(Some(4))));
        assert!(editor.cycle(1, &lookups));
        assert!(editor.cycle(1, &lookups));
        assert_eq!(editor.focused().map(|f| &f.value), Some(&FieldValue::Pick(None)));
        assert!(editor.cycle(-1, &lookups));

        let field = editor.focused().cloned().expect("focused field");
        assert_eq!(
            editor.display_value(&field, &lookups),
            "Bruno Lima (Reg: 2024002)"
        );
    }

    #[test]
    fn cycle_on_empty_lookup_does_nothing() {
        let mut editor = FormEditor::blank(DashboardKind::Calls, today());
        focus(&mut editor, FieldKey::Program);
        assert!(!editor.cycle(1, &Lookups::default()));
    }

    #[test]
    fn secret_is_masked_and_toggle_flips() {
        let mut editor = FormEditor::blank(DashboardKind::Users, today());
        focus(&mut editor, FieldKey::Secret);
        type_text(&mut editor, "abc");
        let field = editor.focused().cloned().expect("focused field");
        assert_eq!(editor.display_value(&field, &Lookups::default()), "***");

        let mut editor = FormEditor::blank(DashboardKind::Holders, today());
        focus(&mut editor, FieldKey::Terminated);
        assert!(!editor.insert_char('x'));
        assert!(editor.toggle());
        let field = editor.focused().cloned().expect("focused field");
        assert_eq!(editor.display_value(&field, &Lookups::default()), "[x]");
    }

    #[test]
    fn load_row_refills_every_field() -> Result<()> {
        let result = SearchResult::Programs(vec![Program {
            id: ProgramId::new(3),
            name: "Bolsa Monitoria".to_owned(),
            description: "Tutoring".to_owned(),
            amount_cents: 70_000,
            category: ProgramCategory::Research,
            slots: 5,
        }]);
        let mut editor = FormEditor::blank(DashboardKind::Programs, today());
        assert!(!editor.load_row(&result, 1));
        assert!(editor.load_row(&result, 0));

        let FormSnapshot::Program(form) = editor.snapshot()? else {
            anyhow::bail!("expected a program snapshot");
        };
        assert_eq!(form.id, ProgramId::new(3));
        assert_eq!(form.amount_cents, 70_000);
        assert_eq!(form.category, ProgramCategory::Research);
        Ok(())
    }
}
