//! Location of the Android build tools used by the pipeline.
//!
//! Resolution goes through `which::which_in` restricted to the configured
//! build-tools directory, which picks up `zipalign.exe` and `apksigner.bat`
//! on Windows without special casing.

use std::path::{Path, PathBuf};

/// Alignment tool name.
pub const ZIPALIGN: &str = "zipalign";

/// Signing tool name.
pub const APKSIGNER: &str = "apksigner";

/// Resolved paths of the build tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTools {
    dir: PathBuf,
    zipalign: PathBuf,
    apksigner: PathBuf,
    complete: bool,
}

impl BuildTools {
    /// Resolves both tools inside `tools_dir`.
    ///
    /// A tool that cannot be found falls back to `tools_dir/<name>`; the
    /// missing executable then shows up as a spawn failure in the stage
    /// output rather than as a separate error path.
    pub fn locate(tools_dir: &Path) -> Self {
        let (zipalign, found_zipalign) = resolve(tools_dir, ZIPALIGN);
        let (apksigner, found_apksigner) = resolve(tools_dir, APKSIGNER);

        Self {
            dir: tools_dir.to_path_buf(),
            zipalign,
            apksigner,
            complete: found_zipalign && found_apksigner,
        }
    }

    /// Directory the tools were looked up in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `zipalign`.
    pub fn zipalign(&self) -> &Path {
        &self.zipalign
    }

    /// Path of `apksigner`.
    pub fn apksigner(&self) -> &Path {
        &self.apksigner
    }

    /// Whether both tools were found as executables.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

fn resolve(tools_dir: &Path, name: &str) -> (PathBuf, bool) {
    match which::which_in(name, Some(tools_dir), tools_dir) {
        Ok(path) => {
            log::debug!("Found {} at: {}", name, path.display());
            (path, true)
        }
        Err(e) => {
            log::warn!(
                "{} not found in {}: {}. The stage using it will fail.",
                name,
                tools_dir.display(),
                e
            );
            (tools_dir.join(name), false)
        }
    }
}
