//! Schema-validated config parsing through the `cue` CLI.
//!
//! The source file is exported to a JSON file next to it, that file is
//! read back and then removed. Any failure of the external tool (missing
//! binary, validation error, timeout) discards the config.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tracing::{debug, warn};

use super::parser::ConfigParser;
use super::{Config, ConfigError};
use crate::constants::CUE_EXPORT_SUFFIX;

pub struct CueParser {
    binary: String,
    timeout: Duration,
}

impl CueParser {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Where the exported JSON is written for a given source file.
    pub fn export_path(source: &Path) -> PathBuf {
        let mut name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(CUE_EXPORT_SUFFIX);
        source.with_file_name(name)
    }

    async fn export(&self, source: &Path, out: &Path) -> Result<(), ConfigError> {
        let validator = |message: String| ConfigError::Validator {
            path: source.to_path_buf(),
            message,
        };

        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.arg("export")
            .arg(source)
            .args(["--out", "json", "--force", "--outfile"])
            .arg(out)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = source.parent() {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| validator(format!("failed to run {}: {}", self.binary, e)))?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => Err(validator(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
            Ok(Err(e)) => Err(validator(format!("failed to run {}: {}", self.binary, e))),
            Err(_) => Err(validator(format!(
                "{} timed out after {}s",
                self.binary,
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait::async_trait]
impl ConfigParser for CueParser {
    fn name(&self) -> &'static str {
        "cue"
    }

    async fn parse(&self, path: &Path) -> Result<Config, ConfigError> {
        let out = Self::export_path(path);
        debug!(source = %path.display(), out = %out.display(), "exporting config with {}", self.binary);

        let result = match self.export(path, &out).await {
            Ok(()) => match tokio::fs::read_to_string(&out).await {
                Ok(json) => serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }),
                Err(source) => Err(ConfigError::Read {
                    path: out.clone(),
                    source,
                }),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = tokio::fs::remove_file(&out).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %out.display(), "failed to remove exported config: {}", e);
            }
        }

        result
    }
}
