//! Removal of the aligned intermediate package after a successful signing.
//!
//! Cleanup is best-effort: whatever happens is reported and logged, never
//! turned into a signing failure.

use std::io;
use std::path::{Path, PathBuf};

/// What happened to the intermediate file.
#[derive(Debug)]
pub enum CleanupReport {
    /// The file existed and was deleted.
    Removed(PathBuf),
    /// There was no file to delete.
    Missing(PathBuf),
    /// The file exists but could not be deleted.
    Failed(PathBuf, io::Error),
}

impl CleanupReport {
    /// One-line description for the outcome log.
    pub fn message(&self) -> String {
        match self {
            Self::Removed(path) => format!("Removed intermediate file {}", path.display()),
            Self::Missing(path) => {
                format!("Intermediate file {} does not exist", path.display())
            }
            Self::Failed(path, e) => {
                format!("Could not remove intermediate file {}: {}", path.display(), e)
            }
        }
    }
}

/// Deletes `path` if it exists.
pub async fn remove_intermediate(path: &Path) -> CleanupReport {
    let report = match tokio::fs::remove_file(path).await {
        Ok(()) => CleanupReport::Removed(path.to_path_buf()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => CleanupReport::Missing(path.to_path_buf()),
        Err(e) => CleanupReport::Failed(path.to_path_buf(), e),
    };

    match &report {
        CleanupReport::Removed(_) => log::info!("{}", report.message()),
        CleanupReport::Missing(_) => log::debug!("{}", report.message()),
        CleanupReport::Failed(..) => log::warn!("{}", report.message()),
    }

    report
}
