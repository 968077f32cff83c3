//! Field rules every employee payload must satisfy before it is written.
//!
//! The console form checks these before calling the backend and the reference
//! backend checks them again on arrival, so both sides reject the same input.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Department,
    Salary,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Department, Field::Salary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Department => "department",
            Field::Salary => "salary",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Violation {
    Required,
    InvalidEmail,
    NotPositive,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Violation::Required => "is required",
            Violation::InvalidEmail => "must be a valid email address",
            Violation::NotPositive => "must be greater than zero",
        };
        f.write_str(msg)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub violation: Violation,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.violation)
    }
}

pub fn check_text(value: &str) -> Option<Violation> {
    value.trim().is_empty().then_some(Violation::Required)
}

pub fn check_email(value: &str) -> Option<Violation> {
    if value.is_empty() {
        Some(Violation::Required)
    } else if !is_valid_email(value) {
        Some(Violation::InvalidEmail)
    } else {
        None
    }
}

pub fn check_salary(value: Option<f64>) -> Option<Violation> {
    match value {
        None => Some(Violation::Required),
        Some(amount) if !amount.is_finite() || amount <= 0.0 => Some(Violation::NotPositive),
        Some(_) => None,
    }
}

pub fn is_valid_email(value: &str) -> bool {
    if value.len() > MAX_EMAIL_LEN {
        return false;
    }
    match value.split_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LEN => EMAIL_PATTERN.is_match(value),
        _ => false,
    }
}

/// Runs every rule and returns the failures in field order.
pub fn check_all(
    name: &str,
    email: &str,
    department: &str,
    salary: Option<f64>,
) -> Vec<FieldError> {
    [
        (Field::Name, check_text(name)),
        (Field::Email, check_email(email)),
        (Field::Department, check_text(department)),
        (Field::Salary, check_salary(salary)),
    ]
    .into_iter()
    .filter_map(|(field, violation)| violation.map(|violation| FieldError { field, violation }))
    .collect()
}
