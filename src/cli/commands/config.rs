//! `config` command: inspect the remembered settings.

use crate::cli::RuntimeConfig;
use crate::cli::args::ConfigAction;
use crate::config::ConfigStore;
use crate::error::Result;

/// Runs a `config` action. Returns the process exit code.
pub async fn config(action: ConfigAction, store: &ConfigStore, runtime: &RuntimeConfig) -> Result<i32> {
    match action {
        ConfigAction::Path => {
            println!("{}", store.path().display());
        }
        ConfigAction::Show => match store.load().await? {
            Some(config) => {
                println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            }
            None => {
                runtime.warn(&format!(
                    "No saved settings at {}",
                    store.path().display()
                ))?;
            }
        },
    }
    Ok(0)
}
