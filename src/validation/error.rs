use thiserror::Error;

/// Per-request validation failures, rendered to callers verbatim
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is a required field")]
    MissingField { field: String },

    #[error("{field} {reason}")]
    InvalidFieldFormat { field: String, reason: String },

    #[error("you must provide only one field apart from the id")]
    InvalidUpdateShape,
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::MissingField { field: field.into() }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFieldFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Field the error is tagged with; shape violations have none
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField { field } => Some(field),
            ValidationError::InvalidFieldFormat { field, .. } => Some(field),
            ValidationError::InvalidUpdateShape => None,
        }
    }
}

/// Failures assembling a RuleSet from the registry. These indicate a wiring
/// mistake rather than a bad request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No rule registered for field '{0}'")]
    NotFound(String),

    #[error("Operation '{0}' has no static rule set")]
    DynamicOperation(crate::types::Operation),
}
