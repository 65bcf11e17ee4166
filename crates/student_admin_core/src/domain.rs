//! crates/student_admin_core/src/domain.rs
//!
//! Defines the typed records the rest of the application works with.
//! Server payloads are decoded into these shapes once, on receipt, by the
//! `decode` module; nothing downstream inspects raw JSON again.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The identity of a record as issued by the backend.
///
/// Some deployments hand out integer keys, others strings, so both are kept
/// in the type the server used and sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(id) => RecordId::Int(id),
            Err(_) => RecordId::Text(s.to_string()),
        })
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

/// A class a student can be enrolled in. Read-only from this application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub id: RecordId,
    pub name: Option<String>,
}

impl Class {
    /// The label shown for this class, falling back to `Class {id}`.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Class {}", self.id),
        }
    }
}

/// A student as held in the local snapshot.
///
/// Never patched in place: every mutation round-trips through the server and
/// the whole snapshot is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub classes: Vec<Class>,
}

impl Student {
    /// First and last name joined, trimmed. Empty when both are blank.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn class_ids(&self) -> Vec<RecordId> {
        self.classes.iter().map(|c| c.id.clone()).collect()
    }
}

/// The body sent to the create and update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCreateUpdateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Sent as `""` when absent.
    #[serde(serialize_with = "date_or_empty")]
    pub date_of_birth: Option<NaiveDate>,
    /// Kept in selection order; uniqueness is not enforced here.
    pub class_ids: Vec<RecordId>,
}

fn date_or_empty<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => date.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}
