//! APK alignment and signing automation.
//!
//! This library drives the Android build tools to turn a release APK into an
//! installable one:
//! - `zipalign -p 4` into `unSign-<name>`
//! - `apksigner sign` into `sign-<name>`
//! - removal of the intermediate on success
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod config;
pub mod error;
pub mod signer;

// Re-export commonly used types
pub use error::{CliError, Result, SignerError};
pub use signer::{PipelineOutcome, SigningPipeline, SigningRequest};
