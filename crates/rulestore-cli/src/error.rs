//! Error types for rulestore-cli.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a CLI command.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from the resolution engine or loader.
    #[error(transparent)]
    Engine(#[from] rulestore_core::Error),

    /// Bad command-line usage not caught by argument parsing.
    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// Stable snake_case code for the machine-parsable stderr line.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Engine(inner) => inner.code(),
            Error::Usage(_) => "usage",
        }
    }

    /// Process exit code under the CLI contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Engine(inner) => inner.exit_code(),
            Error::Usage(_) => 1,
        }
    }
}
