// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "CLIENTDESK_LOG";

/// Sends tracing output to `path`. The terminal belongs to the TUI, so
/// nothing is written to stderr.
pub fn init_logging(path: &Path, default_filter: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = build_filter(default_filter)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}

fn build_filter(default_filter: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid [log].filter {default_filter:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::build_filter;

    #[test]
    fn bad_default_filter_is_reported() {
        let error = build_filter("clientdesk=notalevel").expect_err("bad filter should fail");
        assert!(error.to_string().contains("[log].filter"));
    }

    #[test]
    fn plain_level_filter_is_accepted() {
        assert!(build_filter("debug").is_ok());
    }
}
