//! Error types for reference operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The head file does not exist (not a repository).
    #[error("head pointer not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The head file already exists.
    #[error("head pointer already exists at {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// The head file holds something other than a digest.
    #[error("invalid head pointer at {}: {reason}", path.display())]
    InvalidHead { path: PathBuf, reason: String },

    /// I/O error during file-based ref operations.
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
