//! `open-dir` command: show the package's directory in the desktop file
//! manager.

use crate::cli::RuntimeConfig;
use crate::error::{CliError, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

#[cfg(target_os = "macos")]
const OPENER: &str = "open";

#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: &str = "xdg-open";

/// Directory holding `apk`, which must already exist.
pub fn output_dir(apk: Option<&Path>) -> Result<PathBuf> {
    let apk = apk
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| CliError::MissingArgument {
            argument: "apk".to_string(),
        })?;

    match apk.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && dir.is_dir() => Ok(dir.to_path_buf()),
        _ => Err(CliError::InvalidArguments {
            reason: format!(
                "Select the package first: the directory of {} does not exist",
                apk.display()
            ),
        }
        .into()),
    }
}

/// Opens the directory of `apk`. Returns the process exit code.
pub async fn open_dir(apk: Option<&Path>, runtime: &RuntimeConfig) -> Result<i32> {
    let dir = output_dir(apk)?;
    log::info!("Opening {} with {}", dir.display(), OPENER);

    let status = tokio::process::Command::new(OPENER)
        .arg(&dir)
        .status()
        .await
        .with_context(|| format!("failed to launch {}", OPENER))?;

    // explorer.exe exits non-zero even when the window opened
    if !status.success() && !cfg!(target_os = "windows") {
        return Err(CliError::ExecutionFailed {
            command: format!("{} {}", OPENER, dir.display()),
            reason: format!("exited with {}", status),
        }
        .into());
    }

    runtime.success(&format!("Opened {}", dir.display()))?;
    Ok(0)
}
