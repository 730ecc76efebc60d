//! Struct definitions and serde defaults for tool settings.

use serde::{Deserialize, Serialize};

/// Which back-end turns the views config into a [`crate::config::Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// Strip comments and parse as JSON.
    Jsonc,
    /// Validate and export through the `cue` CLI.
    Cue,
}

/// Root of the tool settings, deserialized from `config.toml`.
///
/// Fields use serde defaults so focused-views runs with sensible defaults
/// when no settings file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Views config parser back-end.
    #[serde(default = "default_parser")]
    pub parser: ParserKind,
    /// Timeout applied to every git invocation, in seconds.
    #[serde(default = "default_git_timeout")]
    pub git_timeout_secs: u64,
    /// Executable used by the `cue` parser.
    #[serde(default = "default_cue_binary")]
    pub cue_binary: String,
    /// Editor command for `fv open`; falls back to `$VISUAL` then `$EDITOR`.
    #[serde(default)]
    pub editor: Option<String>,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Log level and optional log file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written (without colors) to this file.
    #[serde(default)]
    pub file: Option<std::path::PathBuf>,
}

fn default_parser() -> ParserKind {
    ParserKind::Jsonc
}

fn default_git_timeout() -> u64 {
    crate::constants::GIT_TIMEOUT_DEFAULT_SECS
}

fn default_cue_binary() -> String {
    crate::constants::CUE_DEFAULT_BINARY.to_string()
}

fn default_log_level() -> String {
    crate::constants::LOG_LEVEL_DEFAULT.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parser: default_parser(),
            git_timeout_secs: default_git_timeout(),
            cue_binary: default_cue_binary(),
            editor: None,
            logging: LoggingSettings::default(),
        }
    }
}
