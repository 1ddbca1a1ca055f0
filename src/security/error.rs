//! Validation error taxonomy shared by the text and path validators

use thiserror::Error;

/// A rejected field.
///
/// Every variant carries the name of the offending field (`"message"`,
/// `"icon path"`, ...) so the rendered message tells the user which argument
/// to fix. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyField { field: String },

    #[error("{field} contains {what}")]
    IllegalCharacter { field: String, what: &'static str },

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} contains only invalid characters")]
    NoValidContent { field: String },

    #[error("{field} does not match required pattern. Must be an absolute Windows path ending with '.{extension}'")]
    InvalidPattern {
        field: String,
        extension: &'static str,
    },

    #[error("{field} contains potentially dangerous sequences")]
    DangerousSequence { field: String },

    #[error("{field} is invalid: {reason}")]
    InvalidPath { field: String, reason: String },

    #[error("{field} points to a restricted system directory")]
    RestrictedDirectory { field: String },
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::IllegalCharacter { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::NoValidContent { field }
            | ValidationError::InvalidPattern { field, .. }
            | ValidationError::DangerousSequence { field }
            | ValidationError::InvalidPath { field, .. }
            | ValidationError::RestrictedDirectory { field } => field,
        }
    }
}
