//! Remembered signing settings.
//!
//! The last used tools directory, keystore, alias and passwords are kept in a
//! small JSON file so they do not have to be typed again on the next run.
//! The package path is not stored.
//!
//! Passwords are stored in plain text, readable by anyone who can read the
//! file. Use `--no-save` or point `--config` somewhere private when that
//! matters.

use crate::error::Result;
use crate::signer::{ErrorExt, Secret, SigningRequest};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the settings file inside the system temp directory.
pub const CONFIG_FILE_NAME: &str = "auto_sign_config.json";

/// Persisted settings. Field names match the on-disk JSON keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignerConfig {
    /// Build-tools directory
    pub build_tools_dir: String,
    /// Keystore path
    pub jks_path: String,
    /// Key alias
    pub alias: String,
    /// Keystore password
    pub key_password: String,
    /// Key entry password
    pub alias_password: String,
}

impl SignerConfig {
    /// Builds a request for `package_path` from these settings.
    pub fn to_request(&self, package_path: PathBuf) -> SigningRequest {
        SigningRequest {
            tools_dir: PathBuf::from(&self.build_tools_dir),
            keystore_path: PathBuf::from(&self.jks_path),
            package_path,
            key_password: Secret::new(self.key_password.as_str()),
            alias: self.alias.clone(),
            alias_password: Secret::new(self.alias_password.as_str()),
        }
    }

    /// Copy with passwords masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |s: &str| {
            if s.is_empty() {
                String::new()
            } else {
                "******".to_string()
            }
        };
        Self {
            key_password: mask(&self.key_password),
            alias_password: mask(&self.alias_password),
            ..self.clone()
        }
    }
}

/// Location of the settings file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join(CONFIG_FILE_NAME))
    }
}

impl ConfigStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings, `Ok(None)` if nothing was saved yet.
    pub async fn load(&self) -> Result<Option<SignerConfig>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No saved settings at {}", self.path.display());
                return Ok(None);
            }
            read => read.fs_context("reading settings file", &self.path)?,
        };
        if text.trim().is_empty() {
            return Ok(None);
        }

        let config = serde_json::from_str(&text)?;
        log::debug!("Loaded settings from {}", self.path.display());
        Ok(Some(config))
    }

    /// Writes the settings, replacing any previous file.
    pub async fn save(&self, config: &SignerConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating settings directory", parent)?;
        }

        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, json)
            .await
            .fs_context("writing settings file", &self.path)?;

        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
