//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// No subscriber is installed.
    Off,
    Stderr,
    /// Appended to a file, without ANSI colours.
    File(PathBuf),
}

impl LogTarget {
    /// The TUI owns the terminal, so it only ever logs to a file.
    pub fn for_tui(log_file: Option<PathBuf>) -> Self {
        log_file.map(LogTarget::File).unwrap_or(LogTarget::Off)
    }

    /// Non-interactive modes log to stderr unless a file is given.
    pub fn for_batch(log_file: Option<PathBuf>) -> Self {
        log_file.map(LogTarget::File).unwrap_or(LogTarget::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber for `target`.
pub fn init(target: &LogTarget) -> Result<()> {
    let result = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}
