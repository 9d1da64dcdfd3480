//! Command line interface for apk_autosign.
//!
//! This module provides the CLI front end: argument parsing, settings
//! lookup, command dispatch and terminal output.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, ConfigAction, RuntimeConfig, SignArgs};
pub use output::OutputManager;

use crate::config::ConfigStore;
use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(args).await
}

/// Runs already parsed arguments.
pub async fn execute(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let runtime = RuntimeConfig::from(&args);
    let store = args
        .config
        .clone()
        .map(ConfigStore::new)
        .unwrap_or_default();
    log::debug!("Using settings file {}", store.path().display());

    match &args.command {
        Command::Sign(sign) => commands::sign(sign, &store, &runtime).await,
        Command::OpenDir { apk } => commands::open_dir(apk.as_deref(), &runtime).await,
        Command::Config { action } => commands::config(*action, &store, &runtime).await,
    }
}
