//! APK signing core.
//!
//! Wraps the Android build tools `zipalign` and `apksigner`: a
//! [`SigningRequest`] goes in, the package is aligned to a 4-byte boundary
//! into `unSign-<name>`, signed into `sign-<name>` next to the input, and a
//! [`PipelineOutcome`] with the full log comes back.
//!
//! # Module Organization
//!
//! - [`request`] - Request parameters and derived output paths
//! - [`tools`] - Build tool lookup
//! - [`command`] - `zipalign` / `apksigner` argument construction
//! - [`runner`] - Child process execution with live output
//! - [`pipeline`] - Stage sequencing and outcome
//! - [`cleanup`] - Intermediate file removal
//! - [`worker`] - Serialized background execution

pub mod cleanup;
pub mod command;
mod error;
pub mod pipeline;
pub mod request;
pub mod runner;
pub mod tools;
pub mod worker;

pub use cleanup::{CleanupReport, remove_intermediate};
pub use command::{ToolCommand, build_align_command, build_sign_command};
pub use error::{Error, ErrorExt, Result};
pub use pipeline::{FailureKind, PipelineOutcome, SigningPipeline, Stage};
pub use request::{DerivedPaths, Secret, SigningRequest};
pub use runner::{CommandRunner, ExecutionResult, LineSink, ProcessRunner};
pub use tools::BuildTools;
pub use worker::{SigningJob, SigningWorker};
