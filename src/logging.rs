//! Tracing subscriber setup for the `fv` binary.
//!
//! Diagnostics go to stderr and optionally to a log file. User-facing
//! messages use [`crate::output::Notifier`] instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber: stderr always, plus `file` when given.
///
/// `RUST_LOG` refines the level from settings or `-v` flags.
pub fn init(level: &str, file: Option<&Path>) -> Result<()> {
    let level = parse_level(level).unwrap_or(LevelFilter::WARN);

    let stderr_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_filter(stderr_filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let file_filter = EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy();
            let file_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_filter(file_filter);
            registry.with(file_layer).try_init()?;
        }
        None => registry.try_init()?,
    }
    Ok(())
}

/// Level name for a `-v` count, or `None` to keep the configured level.
pub fn level_for_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}
