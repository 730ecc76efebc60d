//! Views config parsers.
//!
//! Both back-ends implement [`ConfigParser`]: [`JsoncParser`] strips
//! comments and parses strict JSON, [`super::cue::CueParser`] delegates
//! validation and export to an external CLI.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{Config, ConfigError};

static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//[^\r\n]*").expect("valid regex"));

static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

/// Turns the located config file into a typed [`Config`].
#[async_trait::async_trait]
pub trait ConfigParser: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn parse(&self, path: &Path) -> Result<Config, ConfigError>;
}

/// Removes `//` line comments, then `/* */` block comments.
///
/// Not string-aware: a `//` inside a JSON string (e.g. `"http://x"`) is
/// treated as a comment and truncates the rest of that line.
pub fn strip_comments(content: &str) -> String {
    let without_lines = LINE_COMMENT_RE.replace_all(content, "");
    BLOCK_COMMENT_RE.replace_all(&without_lines, "").into_owned()
}

/// Parses JSON-with-comments text into a [`Config`].
pub fn parse_jsonc(content: &str, path: &Path) -> Result<Config, ConfigError> {
    let stripped = strip_comments(content);
    serde_json::from_str(&stripped).map_err(|source| {
        debug!(path = %path.display(), "rejected config content after comment stripping:\n{}", stripped);
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Default parser: comment stripping plus strict JSON.
pub struct JsoncParser;

#[async_trait::async_trait]
impl ConfigParser for JsoncParser {
    fn name(&self) -> &'static str {
        "jsonc"
    }

    async fn parse(&self, path: &Path) -> Result<Config, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        parse_jsonc(&content, path)
    }
}
