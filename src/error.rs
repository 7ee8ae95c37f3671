//! Error types shared by the store, session and command layers.
//!
//! The projection core never returns these: malformed dates are recovered
//! locally and everything else it does is infallible.

use std::path::PathBuf;

/// Errors that can occur while reading, writing or resolving tasks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A date string could not be parsed.
    #[error("invalid date '{input}' (expected YYYY-MM-DD)")]
    InvalidDate {
        /// The raw text that failed to parse.
        input: String,
    },

    /// No task matches the given identifier.
    #[error("no task found for '{0}'")]
    NotFound(String),

    /// An identifier matched more than one task.
    #[error("'{identifier}' matches several tasks: {candidates}. Use a longer id prefix")]
    Ambiguous {
        /// The identifier as typed.
        identifier: String,
        /// Short ids and titles of the matching tasks.
        candidates: String,
    },

    /// A mutation was attempted without a signed-in identity.
    #[error("not signed in (run `tb login <user-id>` first)")]
    Unauthenticated,

    /// A payload broke the task data contract.
    #[error("invalid task: {0}")]
    Validation(String),

    /// Reading or writing a file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or written.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// A specialized Result type for taskboard operations.
pub type Result<T> = std::result::Result<T, Error>;
