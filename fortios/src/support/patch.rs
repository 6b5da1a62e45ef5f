//! Classification of API values that fail to land in resource state
//!
//! Older firmware sometimes returns a field in a different shape than the
//! schema declares. Write failures for scalar and list values are tolerated;
//! anything else is a real error.

use serde_json::Value;

/// How a raw API field relates to the state attribute it feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPresence {
    /// Not in the response, or null. Nothing to write
    Absent,
    /// A string, number or list. A rejected write is tolerated
    Patchable,
    /// A bool or nested object. A rejected write is an error
    Unpatchable,
}

pub fn classify_field(value: Option<&Value>) -> FieldPresence {
    match value {
        None | Some(Value::Null) => FieldPresence::Absent,
        Some(Value::String(_)) | Some(Value::Number(_)) | Some(Value::Array(_)) => {
            FieldPresence::Patchable
        }
        Some(Value::Bool(_)) | Some(Value::Object(_)) => FieldPresence::Unpatchable,
    }
}

/// Whether a failed state write of `value` may be ignored
pub fn is_patchable(value: Option<&Value>) -> bool {
    classify_field(value) == FieldPresence::Patchable
}
