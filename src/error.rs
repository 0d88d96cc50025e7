//! Error types for isrcsubmit-core

use thiserror::Error;

/// Common result type for isrcsubmit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an operation.
///
/// Parse-level problems (malformed lines, bad ISRC strings, unknown track
/// numbers, duplicate codes) are *not* represented here: they are logged,
/// counted, and reconciliation continues. Only failures that make an
/// operation impossible surface as `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend identifier not one of the recognized grammars
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// Backend handed the wrong kind of input source
    #[error("Backend {backend} expects a {expected} source")]
    SourceMismatch {
        /// The backend that was selected
        backend: String,
        /// "stream" or "sidecar file"
        expected: &'static str,
    },

    /// Disc snapshot failed structural validation
    #[error("Invalid disc snapshot: {0}")]
    Snapshot(String),
}
