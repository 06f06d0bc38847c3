//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add scheduling and session concerns.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("animation cancelled")]
    Cancelled,

    #[error("a sort is already running")]
    SortInProgress,

    #[error("controls are locked until the next generate or reset")]
    ControlsLocked,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("render failed: {context}")]
    Render {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
