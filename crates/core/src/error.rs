use thiserror::Error;

/// Errors raised while building, copying, or decoding records
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Unknown type or field, or a value of the wrong kind for a field
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Invalid enum value: {value} is not a member of {enumeration}")]
    InvalidEnumValue { enumeration: String, value: String },

    #[error("Type mismatch: cannot use {found} where {expected} is required")]
    TypeMismatch { expected: String, found: String },

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}

impl RecordError {
    pub(crate) fn unknown_field(type_name: &str, field: &str) -> Self {
        RecordError::SchemaViolation(format!("{} has no field named '{}'", type_name, field))
    }

    pub(crate) fn invalid_enum(enumeration: &str, value: impl ToString) -> Self {
        RecordError::InvalidEnumValue {
            enumeration: enumeration.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn type_mismatch(expected: &str, found: &str) -> Self {
        RecordError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        RecordError::InvalidJson(err.to_string())
    }
}
