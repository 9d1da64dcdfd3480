//! Error types for the command line front end and settings persistence.
//!
//! Signing failures themselves are not errors at this level: the pipeline
//! always yields an outcome. These cover everything around it.

use thiserror::Error;

/// Result type alias for front end operations
pub type Result<T> = std::result::Result<T, SignerError>;

/// Main error type outside the signing core
#[derive(Error, Debug)]
pub enum SignerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Signing core errors
    #[error("Signer error: {0}")]
    Signer(#[from] crate::signer::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl SignerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Self::Json(_) => vec![
                "The saved settings file is not valid JSON".to_string(),
                "Run `apk_autosign config path` and delete or fix that file".to_string(),
            ],
            Self::Cli(CliError::MissingArgument { argument }) => {
                vec![format!("Pass --{argument} or set it once so it is remembered")]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
