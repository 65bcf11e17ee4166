//! crates/student_admin_core/src/decode.rs
//!
//! Turns raw server records into typed `Student` and `Class` values.
//!
//! The backend is loose about naming (`classId` vs `id`, `className` vs
//! `name`) and about whether a student's classes are objects or bare ids.
//! All of that is settled here, once, with serde's untagged unions.
//! Records that cannot be decoded are logged and skipped.

use crate::domain::{Class, RecordId, Student};
use crate::validation::parse_date;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed {kind} record: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} record has no id")]
    MissingId(&'static str),
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentRecord {
    id: Option<RecordId>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    date_of_birth: Option<String>,
    /// Left raw so one bad class reference costs only that reference.
    #[serde(default)]
    classes: Option<Value>,
}

/// A class as it appears inside a student, or on its own.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassRefRecord {
    Bare(RecordId),
    Object(ClassRecord),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassRecord {
    #[serde(default)]
    id: Option<RecordId>,
    #[serde(default)]
    class_id: Option<RecordId>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    class_name: Option<Value>,
    #[serde(default)]
    code: Option<Value>,
}

/// Labels are taken from strings or numbers; anything else is ignored.
fn label(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

impl ClassRecord {
    fn into_domain(self) -> Option<Class> {
        let id = self.id.or(self.class_id)?;
        let name = [self.name, self.class_name, self.code]
            .into_iter()
            .flatten()
            .filter_map(label)
            .find(|n| !n.trim().is_empty());
        Some(Class { id, name })
    }
}

impl ClassRefRecord {
    fn into_domain(self) -> Option<Class> {
        match self {
            // A bare string is both the id and the label.
            ClassRefRecord::Bare(RecordId::Text(text)) => Some(Class {
                id: RecordId::Text(text.clone()),
                name: Some(text),
            }),
            ClassRefRecord::Bare(id) => Some(Class { id, name: None }),
            ClassRefRecord::Object(record) => record.into_domain(),
        }
    }
}

impl StudentRecord {
    fn into_domain(self) -> Result<Student, DecodeError> {
        let id = self.id.ok_or(DecodeError::MissingId("student"))?;
        let date_of_birth = self.date_of_birth.as_deref().and_then(parse_date);
        let refs = match self.classes {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(refs)) => refs,
            Some(other) => {
                warn!("Ignoring non-list classes on student {}: {}", id, other);
                Vec::new()
            }
        };
        let classes = refs
            .into_iter()
            .filter_map(|raw| match class(raw) {
                Ok(class) => Some(class),
                Err(e) => {
                    warn!("Dropping class reference on student {}: {}", id, e);
                    None
                }
            })
            .collect();

        Ok(Student {
            id,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.filter(|e| !e.is_empty()),
            date_of_birth,
            classes,
        })
    }
}

//=========================================================================================
// Public Decoders
//=========================================================================================

pub fn student(value: Value) -> Result<Student, DecodeError> {
    serde_json::from_value::<StudentRecord>(value)
        .map_err(|source| DecodeError::Malformed { kind: "student", source })?
        .into_domain()
}

pub fn class(value: Value) -> Result<Class, DecodeError> {
    serde_json::from_value::<ClassRefRecord>(value)
        .map_err(|source| DecodeError::Malformed { kind: "class", source })?
        .into_domain()
        .ok_or(DecodeError::MissingId("class"))
}

/// Decodes every record it can, in order, and logs the rest.
pub fn students(records: Vec<Value>) -> Vec<Student> {
    decode_all(records, student)
}

pub fn classes(records: Vec<Value>) -> Vec<Class> {
    decode_all(records, class)
}

fn decode_all<T>(
    records: Vec<Value>,
    decode: impl Fn(Value) -> Result<T, DecodeError>,
) -> Vec<T> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match decode(record) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Skipping record {}: {}", index, e);
                None
            }
        })
        .collect()
}
