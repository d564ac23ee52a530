//! CLI-level errors (wraps application errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode update: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("edit rejected: {0}")]
    Rejected(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(ApplicationError::Domain(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Io { .. } => crate::exitcode::NOINPUT,
            CliError::Json { .. } => crate::exitcode::DATAERR,
            CliError::Encode(_) => crate::exitcode::SOFTWARE,
            CliError::Rejected(_) => crate::exitcode::REJECTED,
            CliError::Application(e) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Domain(_) => crate::exitcode::DATAERR,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_domain_error_when_mapping_exit_code_then_reports_data_error() {
        let err = CliError::from(DomainError::EmptyInput);
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_rejected_edit_when_mapping_exit_code_then_reports_rejection() {
        let err = CliError::Rejected("move up".into());
        assert_eq!(err.exit_code(), crate::exitcode::REJECTED);
    }
}
