//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, RecordKind};

/// Application errors wrap domain errors and add source/config context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("cannot fetch {location}: {source}")]
    Fetch {
        location: String,
        remote: bool,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {kind} payload from {location}: {message}")]
    Decode {
        kind: RecordKind,
        location: String,
        message: String,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
