//! Align-then-sign pipeline.
//!
//! This module provides the [`SigningPipeline`] that validates a
//! [`SigningRequest`], runs `zipalign` and `apksigner` one after the other and
//! folds everything that happened into a [`PipelineOutcome`].
//!
//! # Stages
//!
//! `Idle -> Validating -> Aligning -> Signing -> Succeeded | Failed`
//!
//! - A missing tools directory, keystore or package path fails the run
//!   before any process is started.
//! - A failing align stage is logged but does not stop the run; the sign
//!   stage exit code alone decides the outcome.
//! - On success the aligned intermediate file is removed. On failure it is
//!   kept for inspection.
//! - Each stage runs exactly once; there are no retries.
//!
//! # Example
//!
//! ```no_run
//! use apk_autosign::signer::{ProcessRunner, SigningPipeline, SigningRequest};
//!
//! # async fn example() {
//! let request = SigningRequest {
//!     tools_dir: "/opt/android-sdk/build-tools/34.0.0".into(),
//!     keystore_path: "/keys/release.jks".into(),
//!     package_path: "/out/app.apk".into(),
//!     key_password: "store-pass".into(),
//!     alias: "release".into(),
//!     alias_password: "key-pass".into(),
//! };
//!
//! let pipeline = SigningPipeline::new(ProcessRunner::new());
//! let outcome = pipeline.run(&request).await;
//! for line in &outcome.log {
//!     println!("{line}");
//! }
//! # }
//! ```

use super::cleanup::remove_intermediate;
use super::command::{build_align_command, build_sign_command};
use super::request::{DerivedPaths, SigningRequest};
use super::runner::{CommandRunner, ExecutionResult, LineSink, ProcessRunner};
use super::tools::BuildTools;
use std::fmt;
use std::path::PathBuf;

/// Log line opening every run.
pub const START_MARKER: &str = "Starting signing...";

/// Prefix of the log line closing a successful run.
pub const SUCCESS_MARKER: &str = "Signing succeeded";

/// Prefix of the log line closing a failed run.
pub const FAILURE_MARKER: &str = "Signing failed";

/// Position in the pipeline state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing has happened yet
    Idle,
    /// Checking the request
    Validating,
    /// Running `zipalign`
    Aligning,
    /// Running `apksigner`
    Signing,
    /// Signed package was produced
    Succeeded,
    /// Run ended without a signed package
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Aligning => "aligning",
            Self::Signing => "signing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A required path was empty; nothing was executed.
    ParameterMissing,
    /// The package path has no directory or file name; nothing was executed.
    InvalidPackagePath,
    /// `apksigner` could not be started.
    ProcessSpawnFailure,
    /// `apksigner` ran and exited non-zero.
    ToolExecutionFailure,
}

/// Final state of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Whether a signed package was produced
    pub succeeded: bool,
    /// Everything the run reported, in order
    pub log: Vec<String>,
    /// Terminal stage reached
    pub stage: Stage,
    /// Failure classification, `None` on success
    pub failure: Option<FailureKind>,
    /// Exit code of the sign stage, if it ran
    pub sign_exit_code: Option<i32>,
    /// Aligned intermediate package, if paths could be derived
    pub intermediate_path: Option<PathBuf>,
    /// Signed package, on success
    pub signed_path: Option<PathBuf>,
}

/// Outcome under construction; mirrors each appended line to the live sink.
struct OutcomeBuilder<'a> {
    outcome: PipelineOutcome,
    sink: &'a LineSink,
}

impl<'a> OutcomeBuilder<'a> {
    fn new(sink: &'a LineSink) -> Self {
        Self {
            outcome: PipelineOutcome {
                succeeded: false,
                log: Vec::new(),
                stage: Stage::Idle,
                failure: None,
                sign_exit_code: None,
                intermediate_path: None,
                signed_path: None,
            },
            sink,
        }
    }

    fn enter(&mut self, stage: Stage) {
        log::debug!("Pipeline stage: {} -> {}", self.outcome.stage, stage);
        self.outcome.stage = stage;
    }

    /// Appends a pipeline message and forwards it live.
    fn note(&mut self, line: impl Into<String>) {
        let line = line.into();
        self.sink.emit(&line);
        self.outcome.log.push(line);
    }

    /// Appends tool output that the runner already forwarded live.
    fn record(&mut self, result: &ExecutionResult) {
        self.outcome
            .log
            .extend(result.captured_output.iter().cloned());
        self.outcome.log.extend(result.stderr_lines.iter().cloned());
    }

    fn fail(mut self, kind: FailureKind, line: String) -> PipelineOutcome {
        log::error!("{}", line);
        self.note(line);
        self.enter(Stage::Failed);
        self.outcome.failure = Some(kind);
        self.outcome
    }
}

/// Runs the align and sign stages for a [`SigningRequest`].
#[derive(Debug, Clone)]
pub struct SigningPipeline<R = ProcessRunner> {
    runner: R,
}

impl Default for SigningPipeline {
    fn default() -> Self {
        Self::new(ProcessRunner::new())
    }
}

impl<R: CommandRunner> SigningPipeline<R> {
    /// Creates a pipeline executing commands through `runner`.
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Returns the command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs the pipeline, collecting output only into the outcome log.
    pub async fn run(&self, request: &SigningRequest) -> PipelineOutcome {
        self.run_with_progress(request, &LineSink::discard()).await
    }

    /// Runs the pipeline, additionally forwarding every log line to `sink`
    /// as soon as it is produced.
    pub async fn run_with_progress(
        &self,
        request: &SigningRequest,
        sink: &LineSink,
    ) -> PipelineOutcome {
        let mut out = OutcomeBuilder::new(sink);

        out.enter(Stage::Validating);
        let missing = request.missing_paths();
        if !missing.is_empty() {
            return out.fail(
                FailureKind::ParameterMissing,
                format!(
                    "Please fill in the required parameters first: {}",
                    missing.join(", ")
                ),
            );
        }

        // Tools run inside the package directory, so relative paths are
        // pinned to the caller's directory first.
        let request = match std::env::current_dir() {
            Ok(cwd) => request.resolved_against(&cwd),
            Err(e) => {
                log::warn!("Cannot read the current directory: {}", e);
                request.clone()
            }
        };

        let paths = match DerivedPaths::from_package_path(&request.package_path) {
            Ok(paths) => paths,
            Err(e) => return out.fail(FailureKind::InvalidPackagePath, e.to_string()),
        };
        out.outcome.intermediate_path = Some(paths.unsigned_aligned_path());

        let missing = request.missing_credentials();
        if !missing.is_empty() {
            log::warn!(
                "Empty {}; apksigner may reject the request",
                missing.join(", ")
            );
        }

        let tools = BuildTools::locate(&request.tools_dir);
        if !tools.is_complete() {
            log::warn!(
                "Build tools incomplete in {}",
                request.tools_dir.display()
            );
        }

        out.note(START_MARKER);

        out.enter(Stage::Aligning);
        let align = build_align_command(&tools, &request.package_path, &paths);
        out.note(format!("$ {}", align));
        let result = self
            .runner
            .execute(&align, &paths.working_dir, sink)
            .await;
        out.record(&result);
        if !result.success() {
            out.note(format!(
                "{} exited with code {}; continuing with signing",
                align.name(),
                result.exit_code
            ));
        }

        out.enter(Stage::Signing);
        let sign = build_sign_command(
            &tools,
            &request.keystore_path,
            &request.key_password,
            &request.alias,
            &request.alias_password,
            &paths,
        );
        out.note(format!("$ {}", sign));
        let result = self.runner.execute(&sign, &paths.working_dir, sink).await;
        out.record(&result);
        out.outcome.sign_exit_code = Some(result.exit_code);

        if !result.success() {
            let kind = if result.spawned {
                FailureKind::ToolExecutionFailure
            } else {
                FailureKind::ProcessSpawnFailure
            };
            return out.fail(
                kind,
                format!("{} (exit code {})", FAILURE_MARKER, result.exit_code),
            );
        }

        let signed = paths.signed_path();
        log::info!("Signed package written to {}", signed.display());
        out.note(format!("{}: {}", SUCCESS_MARKER, signed.display()));

        let report = remove_intermediate(&paths.unsigned_aligned_path()).await;
        out.note(report.message());

        out.enter(Stage::Succeeded);
        out.outcome.succeeded = true;
        out.outcome.signed_path = Some(signed);
        out.outcome
    }
}
