//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation and
//! merging of flags over remembered settings.

use crate::config::SignerConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Align and sign Android packages with zipalign and apksigner
#[derive(Parser, Debug)]
#[command(
    name = "apk_autosign",
    version,
    about = "Align and sign Android packages with zipalign and apksigner",
    long_about = "Aligns an APK with zipalign, signs it with apksigner and removes the intermediate file.

Outputs are written next to the input package:
  unSign-<name>   aligned, unsigned (removed after a successful signing)
  sign-<name>     aligned and signed

Usage:
  apk_autosign sign --apk out/app.apk --tools-dir $ANDROID_HOME/build-tools/34.0.0 \\
      --keystore release.jks --alias release --key-password ... --alias-password ...
  apk_autosign sign --apk out/app.apk      # reuses the settings remembered from last time
  apk_autosign open-dir --apk out/app.apk

Exit code 0 = signed package exists at sign-<name>."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Print debug-level progress messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Settings file (default: <temp dir>/auto_sign_config.json)
    #[arg(long, global = true, value_name = "PATH", env = "APK_AUTOSIGN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Align and sign a package
    Sign(SignArgs),

    /// Open the directory containing a package
    OpenDir {
        /// Package whose directory to open
        #[arg(short, long, value_name = "APK")]
        apk: Option<PathBuf>,
    },

    /// Inspect remembered settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the remembered settings with passwords masked
    Show,
    /// Print the settings file location
    Path,
}

/// Arguments of `sign`. Anything omitted falls back to the remembered value.
#[derive(clap::Args, Debug, Default)]
pub struct SignArgs {
    /// Package to sign
    #[arg(short, long, value_name = "APK")]
    pub apk: Option<PathBuf>,

    /// Android SDK build-tools directory containing zipalign and apksigner
    #[arg(short, long, value_name = "DIR", env = "APK_AUTOSIGN_TOOLS_DIR")]
    pub tools_dir: Option<PathBuf>,

    /// Keystore file
    #[arg(short, long, value_name = "PATH", env = "APK_AUTOSIGN_KEYSTORE")]
    pub keystore: Option<PathBuf>,

    /// Key alias inside the keystore
    #[arg(long, env = "APK_AUTOSIGN_ALIAS")]
    pub alias: Option<String>,

    /// Keystore password
    #[arg(long, env = "APK_AUTOSIGN_KEY_PASSWORD", hide_env_values = true)]
    pub key_password: Option<String>,

    /// Key entry password
    #[arg(long, env = "APK_AUTOSIGN_ALIAS_PASSWORD", hide_env_values = true)]
    pub alias_password: Option<String>,

    /// Kill a tool that runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Do not remember the settings used for this run
    #[arg(long)]
    pub no_save: bool,
}

impl SignArgs {
    /// Overlays the given flags onto `stored`.
    pub fn merge(&self, stored: SignerConfig) -> SignerConfig {
        let path = |p: &Option<PathBuf>, old: String| {
            p.as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or(old)
        };
        SignerConfig {
            build_tools_dir: path(&self.tools_dir, stored.build_tools_dir),
            jks_path: path(&self.keystore, stored.jks_path),
            alias: self.alias.clone().unwrap_or(stored.alias),
            key_password: self.key_password.clone().unwrap_or(stored.key_password),
            alias_password: self.alias_password.clone().unwrap_or(stored.alias_password),
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Sign(sign) = &self.command {
            if sign.timeout_secs == Some(0) {
                return Err("--timeout-secs must be greater than zero".to_string());
            }
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print error message
    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_override_stored_settings() {
        let args = SignArgs {
            keystore: Some("/new.jks".into()),
            alias: Some("new".into()),
            ..Default::default()
        };
        let stored = SignerConfig {
            build_tools_dir: "/tools".into(),
            jks_path: "/old.jks".into(),
            alias: "old".into(),
            key_password: "p1".into(),
            alias_password: "p2".into(),
        };

        let merged = args.merge(stored);

        assert_eq!(merged.build_tools_dir, "/tools");
        assert_eq!(merged.jks_path, "/new.jks");
        assert_eq!(merged.alias, "new");
        assert_eq!(merged.key_password, "p1");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = Args::try_parse_from(["apk_autosign", "sign", "--timeout-secs", "0"]).unwrap();

        assert!(args.validate().is_err());
    }

    #[test]
    fn parses_open_dir() {
        let args = Args::try_parse_from(["apk_autosign", "open-dir", "--apk", "/out/app.apk"])
            .unwrap();

        match args.command {
            Command::OpenDir { apk } => assert_eq!(apk, Some(PathBuf::from("/out/app.apk"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
