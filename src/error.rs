//! Error types for dirlock.
//!
//! Uses thiserror for derive macros. Expected contention is never an error:
//! protocol operations report it as `Ok(false)`. Only usage errors, corrupt
//! lock directories, and unexpected OS failures surface here.

use crate::exit_codes;
use crate::locks::Corruption;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dirlock operations.
#[derive(Error, Debug)]
pub enum DirlockError {
    /// Caller passed an argument the protocol can never accept (e.g. pid 0).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Lock is held by a live owner, or the caller is not its owner.
    ///
    /// Only the CLI turns contention into this error; the library reports it
    /// as a boolean.
    #[error("Lock acquisition failed: {0}")]
    Held(String),

    /// There is no lock to release.
    #[error("lock not held: {0}")]
    NotHeld(String),

    /// Lock directory has no usable ownership marker.
    #[error("corrupt lock '{}': {corruption}", .path.display())]
    Corrupt {
        path: PathBuf,
        corruption: Corruption,
    },

    /// Filesystem or process-table operation failed unexpectedly.
    #[error("{context}: {source}")]
    Os {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Failed to render a report.
    #[error("failed to serialize lock report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DirlockError {
    /// Wrap an I/O error with a description of what was being attempted.
    pub fn os(context: impl Into<String>, source: io::Error) -> Self {
        DirlockError::Os {
            context: context.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DirlockError::InvalidArgument(_) => exit_codes::USER_ERROR,
            DirlockError::Held(_) | DirlockError::NotHeld(_) => exit_codes::LOCK_HELD,
            DirlockError::Corrupt { .. } => exit_codes::CORRUPT_LOCK,
            DirlockError::Os { .. } => exit_codes::OS_FAILURE,
            DirlockError::Serialization(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for dirlock operations.
pub type Result<T> = std::result::Result<T, DirlockError>;
