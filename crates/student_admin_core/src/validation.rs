//! crates/student_admin_core/src/validation.rs
//!
//! Form state for creating and editing a student, and the rules it must pass
//! before anything is sent to the server. Every rule runs on every call so the
//! user sees all problems at once.

use crate::domain::{RecordId, Student, StudentCreateUpdateRequest};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

pub const FIRST_NAME_REQUIRED: &str = "First name is required";
pub const LAST_NAME_REQUIRED: &str = "Last name is required";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const INVALID_DATE: &str = "Please enter a valid date";
pub const FUTURE_DATE_OF_BIRTH: &str = "Date of birth cannot be after today's date";
pub const CLASS_REQUIRED: &str = "Please select at least one class";
pub const CLASSES_UNAVAILABLE: &str = "Failed to load classes. Please try again.";

//=========================================================================================
// Fields and Errors
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    DateOfBirth,
    ClassIds,
    /// Not an input: the class picker itself, when the class list failed to load.
    Classes,
}

impl Field {
    /// The wire/form name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::DateOfBirth => "dateOfBirth",
            Field::ClassIds => "classIds",
            Field::Classes => "classes",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to message. A field with no entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drops the error for a field the user has just edited.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

//=========================================================================================
// Form State
//=========================================================================================

/// What the user has typed so far. Text fields are kept raw; trimming happens
/// in `to_request`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: String,
    pub class_ids: Vec<RecordId>,
}

impl StudentForm {
    /// A blank form for a new student.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A form prefilled from an existing student for editing.
    pub fn from_student(student: &Student) -> Self {
        Self {
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone().unwrap_or_default(),
            date_of_birth: student
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            class_ids: student.class_ids(),
        }
    }

    /// Sets a text field. Returns `false` for fields that are not free text.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        let slot = match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Email => &mut self.email,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::ClassIds | Field::Classes => return false,
        };
        *slot = value.into();
        true
    }

    /// Selects the class if it is not selected yet, otherwise deselects it.
    pub fn toggle_class(&mut self, id: RecordId) {
        match self.class_ids.iter().position(|c| *c == id) {
            Some(index) => {
                self.class_ids.remove(index);
            }
            None => self.class_ids.push(id),
        }
    }

    /// Validates with an explicit "today", compared date-only.
    pub fn validate_as_of(&self, today: NaiveDate) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.first_name.trim().is_empty() {
            errors.insert(Field::FirstName, FIRST_NAME_REQUIRED);
        }
        if self.last_name.trim().is_empty() {
            errors.insert(Field::LastName, LAST_NAME_REQUIRED);
        }
        if !self.email.is_empty() && !email_pattern().is_match(&self.email) {
            errors.insert(Field::Email, INVALID_EMAIL);
        }
        if !self.date_of_birth.is_empty() {
            match parse_date(&self.date_of_birth) {
                None => errors.insert(Field::DateOfBirth, INVALID_DATE),
                Some(date) if date > today => {
                    errors.insert(Field::DateOfBirth, FUTURE_DATE_OF_BIRTH)
                }
                Some(_) => {}
            }
        }
        if self.class_ids.is_empty() {
            errors.insert(Field::ClassIds, CLASS_REQUIRED);
        }

        errors
    }

    /// Builds the request body. Assumes `validate_as_of` passed.
    pub fn to_request(&self) -> StudentCreateUpdateRequest {
        StudentCreateUpdateRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            date_of_birth: parse_date(&self.date_of_birth),
            class_ids: self.class_ids.clone(),
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"))
}

/// Parses a calendar date from `YYYY-MM-DD` or a date-time string.
///
/// Date-times keep only their date part; offsets are not applied.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|date_time| date_time.date())
}
