// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use aidesk_app::{
    CallForm, CallId, CallStatus, EnrollmentId, EnrollmentStatus, HolderForm, PaymentFrequency,
    ProgramCategory, ProgramForm, ProgramId, StaffId, StudentId, UserForm, UserId,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use time::{Date, Duration, Month};

pub const REFERENCE_YEAR: i32 = 2026;

const FIRST_NAMES: [&str; 20] = [
    "Ana", "Bruno", "Camila", "Diego", "Eduarda", "Felipe", "Gabriela", "Heitor", "Isabela",
    "João", "Larissa", "Marcos", "Natália", "Otávio", "Paula", "Rafael", "Sofia", "Tiago",
    "Vitória", "Yasmin",
];
const LAST_NAMES: [&str; 16] = [
    "Souza", "Oliveira", "Santos", "Lima", "Pereira", "Costa", "Rodrigues", "Almeida",
    "Nascimento", "Araújo", "Ribeiro", "Carvalho", "Gomes", "Martins", "Rocha", "Barbosa",
];
const STREETS: [&str; 10] = [
    "Rua das Flores",
    "Avenida Brasil",
    "Rua XV de Novembro",
    "Rua Sete de Setembro",
    "Avenida Paulista",
    "Rua da Paz",
    "Rua Ipiranga",
    "Avenida Atlântica",
    "Rua Tiradentes",
    "Rua do Comércio",
];
const CITIES: [&str; 8] = [
    "São Paulo",
    "Campinas",
    "Belo Horizonte",
    "Curitiba",
    "Recife",
    "Salvador",
    "Fortaleza",
    "Porto Alegre",
];
const STAFF_ROLES: [&str; 6] = [
    "Professor",
    "Coordinator",
    "Social Worker",
    "Researcher",
    "Psychologist",
    "Administrator",
];
const PROGRAM_NAMES: [(&str, ProgramCategory); 10] = [
    ("Auxílio Moradia", ProgramCategory::Assistance),
    ("Auxílio Alimentação", ProgramCategory::Food),
    ("Auxílio Transporte", ProgramCategory::Transport),
    ("Bolsa Iniciação Científica", ProgramCategory::Research),
    ("Bolsa Extensão Comunitária", ProgramCategory::Extension),
    ("Auxílio Creche", ProgramCategory::Assistance),
    ("Bolsa Monitoria", ProgramCategory::Other),
    ("Auxílio Inclusão Digital", ProgramCategory::Assistance),
    ("Bolsa Pesquisa Aplicada", ProgramCategory::Research),
    ("Restaurante Universitário", ProgramCategory::Food),
];
const DESCRIPTION_WORDS: [&str; 16] = [
    "support",
    "students",
    "monthly",
    "housing",
    "meals",
    "research",
    "community",
    "vulnerable",
    "campus",
    "transport",
    "stipend",
    "academic",
    "permanence",
    "income",
    "priority",
    "families",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Registration details for a user who is also a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfile {
    pub registration: String,
}

/// Role of a user who is also a staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffProfile {
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub call_id: CallId,
    pub status: EnrollmentStatus,
    pub submitted_on: Date,
}

/// Seeded generator for plausible assistance-office records. The same
/// seed always yields the same sequence; a running serial keeps unique
/// columns unique within one faker.
#[derive(Debug, Clone)]
pub struct AidFaker {
    rng: DeterministicRng,
    serial: u32,
}

impl AidFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            serial: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn user(&mut self) -> UserForm {
        self.serial += 1;
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let digits = self.int_range_i64(100_000_000, 999_999_999);
        let pin = self.int_range_i64(1000, 9999);
        UserForm {
            id: UserId::new(0),
            national_id: national_id(digits, self.serial),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}{}@example.edu",
                ascii_slug(first),
                ascii_slug(last),
                self.serial
            ),
            secret: format!("pw-{}-{pin}", self.serial),
            address: format!(
                "{}, {} - {}",
                self.pick(&STREETS),
                self.int_range_i64(10, 2999),
                self.pick(&CITIES)
            ),
            phone: format!(
                "({}) 9{:04}-{:04}",
                self.int_range_i64(11, 99),
                self.int_range_i64(0, 9999),
                self.int_range_i64(0, 9999)
            ),
        }
    }

    pub fn student(&mut self, year: i32) -> StudentProfile {
        self.serial += 1;
        StudentProfile {
            registration: format!("{year}{:03}", self.serial % 1000),
        }
    }

    pub fn staff(&mut self) -> StaffProfile {
        StaffProfile {
            role: self.pick(&STAFF_ROLES).to_owned(),
        }
    }

    pub fn program(&mut self) -> ProgramForm {
        let (name, category) = PROGRAM_NAMES[self.rng.int_n(PROGRAM_NAMES.len())];
        ProgramForm {
            id: ProgramId::new(0),
            name: name.to_owned(),
            description: self.sentence(4, 9),
            amount_cents: self.int_range_i64(10, 120) * 2_500,
            category,
            slots: self.int_range_i64(5, 60) as i32,
        }
    }

    pub fn call(&mut self, program_id: ProgramId) -> CallForm {
        let start_date = self.date_in_year(REFERENCE_YEAR);
        let length = self.int_range_i64(15, 60);
        let status = CallStatus::ALL[self.rng.int_n(CallStatus::ALL.len())];
        CallForm {
            id: CallId::new(0),
            start_date,
            end_date: start_date.saturating_add(Duration::days(length)),
            status,
            program_id: Some(program_id),
            program_filter: String::new(),
        }
    }

    /// Roughly half of generated enrollments come out approved.
    pub fn enrollment(&mut self, student_id: StudentId, call_id: CallId) -> Enrollment {
        let status = match self.rng.int_n(4) {
            0 => EnrollmentStatus::Pending,
            1 => EnrollmentStatus::Rejected,
            _ => EnrollmentStatus::Approved,
        };
        Enrollment {
            student_id,
            call_id,
            status,
            submitted_on: self.date_in_year(REFERENCE_YEAR),
        }
    }

    pub fn holder(
        &mut self,
        enrollment_id: EnrollmentId,
        student_id: StudentId,
        advisor_id: StaffId,
    ) -> HolderForm {
        let start_date = self.date_in_year(REFERENCE_YEAR);
        let terminated = self.rng.int_n(5) == 0;
        let termination_date = terminated
            .then(|| start_date.saturating_add(Duration::days(self.int_range_i64(30, 180))));
        HolderForm {
            enrollment_id: Some(enrollment_id),
            student_id: Some(student_id),
            advisor_id: Some(advisor_id),
            start_date,
            end_date: start_date.saturating_add(Duration::days(365)),
            terminated,
            termination_date,
            payment_frequency: PaymentFrequency::ALL
                [self.rng.int_n(PaymentFrequency::ALL.len())],
            student_filter: String::new(),
        }
    }

    pub fn date_in_year(&mut self, year: i32) -> Date {
        let start = calendar_date(year, Month::January, 1);
        start.saturating_add(Duration::days(self.int_range_i64(0, 364)))
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let count = self.int_range_i64(min_words as i64, max_words as i64) as usize;
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&DESCRIPTION_WORDS).to_owned());
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("aidesk.db");
    Ok((dir, db_path))
}

pub fn fixture_date() -> Date {
    calendar_date(REFERENCE_YEAR, Month::March, 1)
}

fn calendar_date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).unwrap_or(Date::MIN)
}

/// Formats nine digits plus a serial-derived check pair as `123.456.789-01`.
fn national_id(digits: i64, serial: u32) -> String {
    let raw = format!("{digits:09}");
    format!(
        "{}.{}.{}-{:02}",
        &raw[0..3],
        &raw[3..6],
        &raw[6..9],
        serial % 100
    )
}

fn ascii_slug(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase()
}
