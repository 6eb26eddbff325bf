//! Error types for Rulestore.
//!
//! All fatal conditions in the engine map to a variant here. Each variant
//! carries a stable snake_case [`code`](Error::code) used for the CLI's
//! machine-parsable stderr line, and an [`exit_code`](Error::exit_code)
//! matching the CLI contract: `1` for store/load failures, `2` for
//! unresolved precedence conflicts in strict mode.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Rulestore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a rule store or resolving a query.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A document's metadata is missing or unparsable. Aborts the load.
    #[error("malformed document {}: {message}", path.display())]
    MalformedDocument {
        /// Path of the offending document.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// The extends graph contains a cycle. Aborts the load.
    ///
    /// The chain lists the document ids along the cycle, ending with a
    /// repeat of the first id (`a -> b -> a`). A self-extends produces a
    /// two-element chain.
    #[error("cyclic extends chain: {}", chain.join(" -> "))]
    CyclicExtends {
        /// The complete cycle, first id repeated at the end.
        chain: Vec<String>,
    },

    /// Two files map to the same document id. Aborts the load.
    #[error("duplicate document id '{id}': {} and {}", first.display(), second.display())]
    DuplicateId {
        /// The colliding id.
        id: String,
        /// The file that claimed the id first.
        first: PathBuf,
        /// The file that collided with it.
        second: PathBuf,
    },

    /// Same-tier documents contest a section and strict mode was requested.
    #[error("ambiguous precedence: {}", conflicts.join("; "))]
    AmbiguousPrecedence {
        /// One human-readable entry per unresolved conflict.
        conflicts: Vec<String>,
    },

    /// A document root does not exist.
    #[error("document root not found: {}", path.display())]
    RootNotFound {
        /// The missing root.
        path: PathBuf,
    },

    /// A document root exists but cannot be read (typically permissions).
    #[error("document root unreadable: {}: {source}", path.display())]
    RootUnreadable {
        /// The unreadable root.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The caller cancelled the load before all documents were parsed.
    #[error("load cancelled with {} document(s) unparsed", pending.len())]
    LoadCancelled {
        /// Documents that had not been parsed when cancellation hit.
        pending: Vec<PathBuf>,
    },

    /// A resolution query is structurally invalid.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// What is wrong with the query.
        message: String,
    },

    /// I/O failure on a specific file.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Generic parse failure not tied to a document path.
    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Creates a malformed-document error.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid-query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Error::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Classifies an I/O error on a document root.
    ///
    /// A missing root and an unreadable root are distinct failures for
    /// caller diagnostics.
    pub fn for_root(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::RootNotFound { path }
        } else {
            Error::RootUnreadable { path, source }
        }
    }

    /// Stable snake_case code for this error kind.
    ///
    /// Used verbatim in the CLI's `error: <code>: <explanation>` line.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedDocument { .. } => "malformed_document",
            Error::CyclicExtends { .. } => "cyclic_extends",
            Error::DuplicateId { .. } => "duplicate_id",
            Error::AmbiguousPrecedence { .. } => "ambiguous_precedence",
            Error::RootNotFound { .. } => "root_not_found",
            Error::RootUnreadable { .. } => "root_unreadable",
            Error::LoadCancelled { .. } => "load_cancelled",
            Error::InvalidQuery { .. } => "invalid_query",
            Error::Io { .. } => "io_failure",
            Error::Parse(_) => "parse_error",
        }
    }

    /// Process exit code for this error under the CLI contract.
    ///
    /// Unresolved conflicts in strict mode exit `2`; every other fatal
    /// condition exits `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::AmbiguousPrecedence { .. } => 2,
            _ => 1,
        }
    }
}
