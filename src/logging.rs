//! Tracing subscriber setup.
//!
//! Events go to stderr so stdout stays reserved for machine-readable output
//! (the `RESULT:` line of `docsort resolve`). `RUST_LOG` overrides the
//! configured level. With `[logging].directory` set, the same events are
//! also appended to `Logs_<timestamp>.log` in that directory.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. Returns the log file path, if any.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid logging.level: '{}'", config.level))?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, log_path) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let path = dir.join(log_file_name(chrono::Local::now()));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .with_context(|| "Failed to install tracing subscriber")?;

    Ok(log_path)
}

fn log_file_name<Tz: chrono::TimeZone>(now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("Logs_%Y%m%d%H%M%S.log").to_string()
}
