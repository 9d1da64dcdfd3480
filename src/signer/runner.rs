//! External process execution with live output capture.

use super::command::ToolCommand;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

/// Exit code reported when no real exit code exists (spawn failure,
/// termination by signal, timeout).
pub const NO_EXIT_CODE: i32 = -1;

/// Consecutive read errors after which a stream is given up on.
const MAX_READ_ERRORS: usize = 3;

/// Result of one external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Process exit code, [`NO_EXIT_CODE`] if there was none
    pub exit_code: i32,
    /// Standard output lines in the order they were produced
    pub captured_output: Vec<String>,
    /// Standard error lines in the order they were produced
    pub stderr_lines: Vec<String>,
    /// Whether the process was started at all
    pub spawned: bool,
}

impl ExecutionResult {
    /// Result for a command that could not be started.
    pub fn spawn_failure(message: String) -> Self {
        Self {
            exit_code: NO_EXIT_CODE,
            captured_output: vec![message],
            stderr_lines: Vec::new(),
            spawned: false,
        }
    }

    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Forwards output lines to a live consumer as they arrive.
///
/// A sink without a channel drops lines; send errors (receiver gone) are
/// ignored so a closed display never aborts a stage.
#[derive(Debug, Clone, Default)]
pub struct LineSink {
    tx: Option<UnboundedSender<String>>,
}

impl LineSink {
    /// A sink that discards everything.
    pub fn discard() -> Self {
        Self::default()
    }

    /// A sink that forwards to `tx`.
    pub fn channel(tx: UnboundedSender<String>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Forwards one line.
    pub fn emit(&self, line: &str) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(line.to_string());
        }
    }
}

/// Executes a [`ToolCommand`] to completion.
pub trait CommandRunner: Send + Sync {
    /// Runs `command` in `working_dir`, forwarding each output line to
    /// `sink` while it runs. Completes only after the process has exited.
    fn execute(
        &self,
        command: &ToolCommand,
        working_dir: &Path,
        sink: &LineSink,
    ) -> impl Future<Output = ExecutionResult> + Send;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Runner that waits for as long as the process runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that kills processes still running after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl CommandRunner for ProcessRunner {
    async fn execute(
        &self,
        command: &ToolCommand,
        working_dir: &Path,
        sink: &LineSink,
    ) -> ExecutionResult {
        log::info!("Running: {}", command);

        let mut child = match Command::new(command.program())
            .args(command.get_args())
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let message = format!(
                    "Failed to start {}: {}",
                    command.program().display(),
                    e
                );
                log::error!("{}", message);
                sink.emit(&message);
                return ExecutionResult::spawn_failure(message);
            }
        };

        let name = command.name();
        let stderr_tag = format!("{} stderr", name);
        let mut captured_output = Vec::new();
        let mut stderr_lines = Vec::new();

        // Both pipes are drained while the process runs; a tool blocked on a
        // full pipe would otherwise never exit.
        let drain = async {
            let (_, _, status) = tokio::join!(
                read_lines(child.stdout.take(), &name, sink, &mut captured_output),
                read_lines(child.stderr.take(), &stderr_tag, sink, &mut stderr_lines),
                child.wait(),
            );
            status
        };

        let status = match self.timeout {
            None => Some(drain.await),
            Some(limit) => tokio::time::timeout(limit, drain).await.ok(),
        };

        // Lines read before the deadline stay in the result.
        let Some(status) = status else {
            let message = format!(
                "{} timed out after {} seconds, terminating",
                name,
                self.timeout.map(|t| t.as_secs()).unwrap_or_default()
            );
            log::warn!("{}", message);
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill {}: {}", name, e);
            }
            sink.emit(&message);
            captured_output.push(message);
            return ExecutionResult {
                exit_code: NO_EXIT_CODE,
                captured_output,
                stderr_lines,
                spawned: true,
            };
        };

        let exit_code = match status {
            Ok(status) => status.code().unwrap_or(NO_EXIT_CODE),
            Err(e) => {
                log::error!("Failed to wait for {}: {}", name, e);
                NO_EXIT_CODE
            }
        };

        if exit_code == 0 {
            log::info!("{} completed successfully", name);
        } else {
            log::warn!("{} failed with exit code {}", name, exit_code);
        }

        ExecutionResult {
            exit_code,
            captured_output,
            stderr_lines,
            spawned: true,
        }
    }
}

/// Reads `stream` to the end, one line at a time.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the read,
/// so one odd line never hides the ones after it.
async fn read_lines<S>(stream: Option<S>, tag: &str, sink: &LineSink, captured: &mut Vec<String>)
where
    S: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return;
    };
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut errors = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => errors = 0,
            Err(e) => {
                log::warn!("[{}] read error: {}", tag, e);
                errors += 1;
                if errors >= MAX_READ_ERRORS {
                    break;
                }
                if buf.is_empty() {
                    continue;
                }
            }
        }

        let line = decode_line(&buf);
        log::debug!("[{}] {}", tag, line);
        sink.emit(&line);
        captured.push(line);
    }
}

/// Decodes one raw line, dropping the `\n` or `\r\n` terminator.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
