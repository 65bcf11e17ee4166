//! crates/student_admin_core/src/normalize.rs
//!
//! Pulls the ordered list of records out of a collection response whose
//! envelope is not fixed. The rules are tried in order and the first match
//! wins; anything unrecognised degrades to an empty list instead of failing.

use serde_json::Value;
use tracing::debug;

/// Which rule located the records inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// The response is the list itself.
    Bare,
    /// A present `items` or `data` property. The key is the one that was used.
    Wrapped(&'static str),
    /// A present `students` property.
    Students,
    /// The first array-valued property in document order.
    FirstArray(String),
    /// Nothing usable.
    Unrecognised,
}

/// Decides which rule applies to `envelope` without extracting anything.
pub fn locate(envelope: &Value) -> EnvelopeShape {
    let object = match envelope {
        Value::Array(_) => return EnvelopeShape::Bare,
        Value::Object(object) => object,
        _ => return EnvelopeShape::Unrecognised,
    };

    for key in ["items", "data"] {
        if object.get(key).is_some_and(is_present) {
            return EnvelopeShape::Wrapped(key);
        }
    }

    if object.get("students").is_some_and(is_present) {
        return EnvelopeShape::Students;
    }

    let mut arrays = object.iter().filter(|(_, value)| value.is_array());
    match arrays.next() {
        Some((key, _)) => {
            // With several candidates the winner depends on key order.
            if let Some((other, _)) = arrays.next() {
                debug!(
                    "Envelope has several array properties; using '{}' over '{}'",
                    key, other
                );
            }
            EnvelopeShape::FirstArray(key.clone())
        }
        None => EnvelopeShape::Unrecognised,
    }
}

/// Consumes a collection response and returns its records in order.
///
/// A wrapped property that is present but not a list yields an empty list.
pub fn into_records(envelope: Value) -> Vec<Value> {
    let shape = locate(&envelope);
    debug!("Normalizing collection envelope: {:?}", shape);

    let selected = match (shape, envelope) {
        (EnvelopeShape::Bare, value) => value,
        (EnvelopeShape::Wrapped(key), Value::Object(mut object)) => {
            object.remove(key).unwrap_or(Value::Null)
        }
        (EnvelopeShape::Students, Value::Object(mut object)) => {
            object.remove("students").unwrap_or(Value::Null)
        }
        (EnvelopeShape::FirstArray(key), Value::Object(mut object)) => {
            object.remove(&key).unwrap_or(Value::Null)
        }
        _ => Value::Null,
    };

    match selected {
        Value::Array(records) => records,
        _ => Vec::new(),
    }
}

/// Whether a property counts as "present": not null, false, zero or empty text.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
