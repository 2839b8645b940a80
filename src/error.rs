use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormError {
    #[error("invalid norm schema: {reason}")]
    InvalidSchema { reason: SchemaViolation },

    #[error("specimen index {index} out of range (rows: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot remove the last remaining specimen")]
    LastSpecimen,

    #[error("unknown field: {field_id}")]
    UnknownField { field_id: String },

    #[error("malformed result payload: {reason}")]
    MalformedPayload { reason: String },
}

impl NormError {
    pub fn invalid_schema(reason: SchemaViolation) -> Self {
        NormError::InvalidSchema { reason }
    }
}

/// Reasons a norm schema is rejected at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    DuplicateFieldId(String),
    EmptyFieldId,
    SelectWithoutOptions(String),
    InvertedLimits { field_id: String, min: f64, max: f64 },
    ReservedFieldId(String),
    AmbiguousSpecimenKey { field_id: String, owner: String },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaViolation::DuplicateFieldId(id) => write!(f, "duplicate field id '{}'", id),
            SchemaViolation::EmptyFieldId => write!(f, "field id must not be empty"),
            SchemaViolation::SelectWithoutOptions(id) => {
                write!(f, "select field '{}' has no options", id)
            }
            SchemaViolation::InvertedLimits { field_id, min, max } => write!(
                f,
                "field '{}' has minLimit {} greater than maxLimit {}",
                field_id, min, max
            ),
            SchemaViolation::ReservedFieldId(id) => {
                write!(f, "field id '{}' collides with a reserved result key", id)
            }
            SchemaViolation::AmbiguousSpecimenKey { field_id, owner } => write!(
                f,
                "field id '{}' is indistinguishable from a specimen key of '{}'",
                field_id, owner
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, NormError>;
