//! Tool-level errors and their exit codes

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::security::ValidationError;

/// Everything that can stop a run.
#[derive(Debug, Error)]
pub enum ToastError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Command line too long. Total arguments exceed {max} characters.")]
    CommandLineTooLong { max: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build toast payload: {0}")]
    Payload(String),

    #[error("failed to display notification: {0}")]
    Display(String),

    #[error("not supported: {0}")]
    NotSupported(String),
}

impl ToastError {
    /// 1 for bad input or configuration, 2 for anything unexpected
    pub fn exit_code(&self) -> u8 {
        match self {
            ToastError::Validation(_) | ToastError::CommandLineTooLong { .. } | ToastError::Config(_) => 1,
            ToastError::Payload(_) | ToastError::Display(_) | ToastError::NotSupported(_) => 2,
        }
    }

    /// Whether the user can fix this by changing arguments or configuration
    pub fn is_usage_error(&self) -> bool {
        self.exit_code() == 1
    }
}

pub type ToastResult<T> = Result<T, ToastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err: ToastError = ValidationError::EmptyField { field: "message".into() }.into();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "message cannot be empty");

        assert_eq!(ToastError::CommandLineTooLong { max: 1965 }.exit_code(), 1);
        assert_eq!(ToastError::Config(ConfigError::Invalid("x".into())).exit_code(), 1);
        assert_eq!(ToastError::Display("boom".into()).exit_code(), 2);
        assert!(!ToastError::NotSupported("linux".into()).is_usage_error());
    }
}
