//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`GatherError`]
//! via `#[from]`.

use crate::automation::FieldType;

/// Top-level error returned by every use-case.
#[derive(Debug, thiserror::Error)]
pub enum GatherError {
    /// Input rejected before touching any state.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The requested record does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The persistence capability failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Rejected input: schema mismatch, missing required data, unknown names.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("required field `{0}` is not set")]
    MissingField(&'static str),

    #[error("options schema for `{kind}` is not a flat record: {reason}")]
    InvalidSchema { kind: String, reason: String },

    #[error("action `{kind}` has no option named `{field}`")]
    UnknownField { kind: String, field: String },

    #[error("option `{field}` cannot be null")]
    NullNotAllowed { field: String },

    #[error("option `{field}` expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: FieldType,
    },

    #[error("option `{field}` holds a value that is not a scalar")]
    UnsupportedValue { field: String },

    #[error("action `{kind}` is missing required options: {}", missing.join(", "))]
    IncompleteConfiguration { kind: String, missing: Vec<String> },

    #[error("action document is malformed: {0}")]
    MalformedAction(String),

    #[error("new events must start in the upcoming status")]
    NotUpcoming,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
