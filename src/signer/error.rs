//! Error types for the signing core.
//!
//! Pipeline stages never return these to the caller of
//! [`SigningPipeline::run`](super::SigningPipeline::run); they are folded into
//! the outcome log. They surface directly only from the lower-level helpers
//! (path derivation, cleanup, worker plumbing).

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias for signing core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the signing core.
#[derive(Error, Debug)]
pub enum Error {
    /// The package path cannot be split into a directory and a file name.
    #[error("invalid package path {path:?}: {reason}")]
    InvalidPackagePath {
        /// Offending path as supplied by the caller
        path: PathBuf,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A filesystem operation failed.
    #[error("{context} {path:?}: {error}")]
    Fs {
        /// What was being attempted
        context: &'static str,
        /// Path the operation targeted
        path: PathBuf,
        /// Underlying IO error
        error: std::io::Error,
    },

    /// The signing worker has shut down.
    #[error("signing worker is no longer running")]
    WorkerStopped,

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

/// Attach filesystem context to IO results.
pub trait ErrorExt<T> {
    /// Wraps an IO error with a description and the path involved.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

