// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LOG_ENV};

/// Routes `tracing` output to the log file; the terminal belongs to the UI.
pub fn init(config: &Config) -> Result<()> {
    let path = config.log_file()?;
    let filter = resolve_filter(env::var(LOG_ENV).ok().as_deref(), config.log_level())?;
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow::anyhow!("install log subscriber: {error}"))?;
    Ok(())
}

/// `AIDESK_LOG` wins over `[logging].level` when it holds a valid filter.
fn resolve_filter(from_env: Option<&str>, configured: &str) -> Result<EnvFilter> {
    if let Some(directives) = from_env.filter(|value| !value.trim().is_empty()) {
        return EnvFilter::try_new(directives)
            .with_context(|| format!("{LOG_ENV}={directives:?} is not a valid log filter"));
    }
    EnvFilter::try_new(configured)
        .with_context(|| format!("logging.level {configured:?} is not a valid log filter"))
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [logging].file to a writable path",
                path.display()
            )
        })
}
