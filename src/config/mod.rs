//! Views configuration: discovery, parsing and typed representation.
//!
//! A workspace declares its views in a JSON-with-comments file such as
//! `.focusedviews.json`, searched for in the root, `.vscode/` and
//! `examples/` (see [`locate`]).

pub mod cue;
pub mod locate;
pub mod parser;
mod types;

use std::path::PathBuf;

use thiserror::Error;

pub use types::{Config, View, ViewOptions, Views};

/// A config file that exists but could not be turned into a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation of {} failed: {message}", .path.display())]
    Validator { path: PathBuf, message: String },
}
