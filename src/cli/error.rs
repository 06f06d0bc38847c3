//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::from(ApplicationError::Domain(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::UnknownAlgorithm(_)) => {
                        crate::exitcode::USAGE
                    }
                    ApplicationError::Domain(DomainError::InvalidRange { .. })
                    | ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    ApplicationError::Render { .. } => crate::exitcode::IOERR,
                    ApplicationError::Cancelled
                    | ApplicationError::SortInProgress
                    | ApplicationError::ControlsLocked => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_error_layers_when_exit_code_then_maps_to_sysexits() {
        assert_eq!(CliError::Usage("x".into()).exit_code(), crate::exitcode::USAGE);
        assert_eq!(
            CliError::from(DomainError::EmptyDataset).exit_code(),
            crate::exitcode::DATAERR
        );
        assert_eq!(
            CliError::from(ApplicationError::Config { message: "bad".into() }).exit_code(),
            crate::exitcode::CONFIG
        );
        assert_eq!(
            CliError::from(ApplicationError::ControlsLocked).exit_code(),
            crate::exitcode::SOFTWARE
        );
        let io = InfraError::io("read stdin", std::io::Error::other("closed"));
        assert_eq!(CliError::from(io).exit_code(), crate::exitcode::IOERR);
    }
}
