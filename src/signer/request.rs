//! Signing request parameters and the paths derived from them.

use super::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix of the aligned but not yet signed intermediate package.
pub const UNSIGNED_ALIGNED_PREFIX: &str = "unSign-";

/// Prefix of the final signed package.
pub const SIGNED_PREFIX: &str = "sign-";

/// A password or other credential that must never be printed.
///
/// `Debug` is redacted; the plain value is only reachable through
/// [`Secret::expose`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a credential.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain credential.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<empty>)")
        } else {
            f.write_str("Secret(******)")
        }
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Everything needed for one align + sign run.
#[derive(Debug, Clone, Default)]
pub struct SigningRequest {
    /// Android SDK build-tools directory containing `zipalign` and `apksigner`
    pub tools_dir: PathBuf,
    /// Keystore (`.jks` / `.keystore`) holding the signing key
    pub keystore_path: PathBuf,
    /// Package to align and sign
    pub package_path: PathBuf,
    /// Keystore password
    pub key_password: Secret,
    /// Key entry alias inside the keystore
    pub alias: String,
    /// Password of the key entry
    pub alias_password: Secret,
}

impl SigningRequest {
    /// Names of the required path parameters that are empty.
    ///
    /// Credentials are not checked here; `apksigner` rejects them itself
    /// when they are actually needed.
    pub fn missing_paths(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.tools_dir.as_os_str().is_empty() {
            missing.push("tools directory");
        }
        if self.keystore_path.as_os_str().is_empty() {
            missing.push("keystore path");
        }
        if self.package_path.as_os_str().is_empty() {
            missing.push("package path");
        }
        missing
    }

    /// Copy with relative paths joined onto `base`.
    ///
    /// Tools run inside the package directory, so paths the caller gave
    /// relative to its own directory must be pinned down first.
    pub fn resolved_against(&self, base: &Path) -> Self {
        let resolve = |path: &Path| {
            if path.as_os_str().is_empty() || path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };
        Self {
            tools_dir: resolve(&self.tools_dir),
            keystore_path: resolve(&self.keystore_path),
            package_path: resolve(&self.package_path),
            ..self.clone()
        }
    }

    /// Names of the credential parameters that are empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.key_password.is_empty() {
            missing.push("keystore password");
        }
        if self.alias.is_empty() {
            missing.push("key alias");
        }
        if self.alias_password.is_empty() {
            missing.push("key password");
        }
        missing
    }
}

/// File names and directory computed from the package path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPaths {
    /// File name of the input package, e.g. `app.apk`
    pub package_name: String,
    /// `unSign-<package_name>`
    pub unsigned_aligned_name: String,
    /// `sign-<package_name>`
    pub signed_name: String,
    /// Directory holding the input package; all outputs land here
    pub working_dir: PathBuf,
}

impl DerivedPaths {
    /// Derives output names from a package path.
    ///
    /// Fails when the path has no file name or no directory component, so
    /// that no command is ever built against an undefined working directory.
    pub fn from_package_path(package_path: &Path) -> Result<Self> {
        let invalid = |reason| Error::InvalidPackagePath {
            path: package_path.to_path_buf(),
            reason,
        };

        let package_name = package_path
            .file_name()
            .ok_or_else(|| invalid("no file name"))?
            .to_str()
            .ok_or_else(|| invalid("file name is not valid UTF-8"))?
            .to_string();

        let working_dir = match package_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => return Err(invalid("no directory component")),
        };

        Ok(Self {
            unsigned_aligned_name: format!("{UNSIGNED_ALIGNED_PREFIX}{package_name}"),
            signed_name: format!("{SIGNED_PREFIX}{package_name}"),
            package_name,
            working_dir,
        })
    }

    /// Full path of the aligned intermediate package.
    pub fn unsigned_aligned_path(&self) -> PathBuf {
        self.working_dir.join(&self.unsigned_aligned_name)
    }

    /// Full path of the signed package.
    pub fn signed_path(&self) -> PathBuf {
        self.working_dir.join(&self.signed_name)
    }
}
