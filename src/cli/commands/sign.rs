//! `sign` command: run the pipeline on a background worker and render its
//! log as it arrives.

use crate::cli::args::SignArgs;
use crate::cli::RuntimeConfig;
use crate::config::{ConfigStore, SignerConfig};
use crate::error::Result;
use crate::signer::{ProcessRunner, SigningPipeline, SigningWorker};
use std::time::Duration;

/// Signs the package named in `args`. Returns the process exit code.
pub async fn sign(args: &SignArgs, store: &ConfigStore, runtime: &RuntimeConfig) -> Result<i32> {
    let stored = match store.load().await {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            log::warn!("Ignoring unreadable settings at {}: {}", store.path().display(), e);
            runtime.warn(&format!(
                "Ignoring saved settings ({}): {}",
                store.path().display(),
                e
            ))?;
            SignerConfig::default()
        }
    };
    let config = args.merge(stored);

    // Remembered even when the run fails validation, so a half-filled form
    // is not lost.
    if !args.no_save {
        match store.save(&config).await {
            Ok(()) => runtime.verbose_println(&format!(
                "Settings saved to {}",
                store.path().display()
            ))?,
            Err(e) => {
                log::warn!("Could not save settings: {}", e);
                runtime.warn(&format!("Could not save settings: {}", e))?;
            }
        }
    }

    let request = config.to_request(args.apk.clone().unwrap_or_default());

    let runner = match args.timeout_secs {
        Some(secs) => ProcessRunner::with_timeout(Duration::from_secs(secs)),
        None => ProcessRunner::new(),
    };
    let worker = SigningWorker::spawn(SigningPipeline::new(runner));

    runtime.section(&format!("Signing {}", request.package_path.display()))?;
    let mut job = worker.submit(request)?;
    while let Some(line) = job.progress.recv().await {
        runtime.indent(&line)?;
    }
    let outcome = job.outcome().await?;
    worker.shutdown().await?;

    if outcome.succeeded {
        if let Some(signed) = &outcome.signed_path {
            runtime.success(&format!("Signed package: {}", signed.display()))?;
        }
        Ok(0)
    } else {
        let detail = match outcome.sign_exit_code {
            Some(code) => format!("signing failed (apksigner exit code {})", code),
            None => "signing did not start".to_string(),
        };
        runtime.error(&detail)?;
        if let Some(kept) = &outcome.intermediate_path {
            if kept.exists() {
                runtime.verbose_println(&format!("Aligned package kept at {}", kept.display()))?;
            }
        }
        Ok(1)
    }
}
