//! Git CLI access.
//!
//! Every git invocation goes through the [`GitRunner`] trait so the loader
//! and resolver can be exercised without a real repository. [`SystemGit`]
//! spawns the `git` binary with a bounded timeout; [`Git`] is the facade
//! that knows the handful of commands focused-views needs.

#[cfg(test)]
pub mod mock;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Failure of a single git invocation.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git {command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },
    #[error("git {command} failed: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Runs git with the given arguments in `cwd` and returns its stdout.
#[async_trait::async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError>;
}

/// [`GitRunner`] backed by the `git` executable.
///
/// Runs non-interactively: stdin is closed and terminal prompts are
/// disabled. A call that exceeds the timeout is killed.
pub struct SystemGit {
    program: String,
    timeout: Duration,
}

impl SystemGit {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: crate::constants::GIT_BINARY.to_string(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        debug!(cwd = %cwd.display(), "git {}", command);

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(args)
            .current_dir(cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| GitError::Spawn {
            command: command.clone(),
            source,
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => return Err(GitError::Spawn { command, source }),
            Err(_) => {
                return Err(GitError::Timeout {
                    command,
                    secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(GitError::Failed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// The git commands focused-views issues, all run in the workspace root.
#[derive(Clone)]
pub struct Git {
    runner: Arc<dyn GitRunner>,
    root: PathBuf,
}

impl Git {
    pub fn new(runner: Arc<dyn GitRunner>, root: PathBuf) -> Self {
        Self { runner, root }
    }

    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        self.runner.run(&self.root, args).await
    }

    /// Checks that a git binary exists and the root is inside a work tree.
    ///
    /// Any failure means git-backed features are off; this is a normal
    /// condition, not an error.
    pub async fn probe(&self) -> bool {
        if let Err(e) = self.run(&["--version"]).await {
            debug!("git --version failed: {}", e);
            return false;
        }
        match self.run(&["rev-parse", "--is-inside-work-tree"]).await {
            Ok(out) => out.trim() == "true",
            Err(e) => {
                debug!("not inside a git work tree: {}", e);
                false
            }
        }
    }

    /// Name of the currently checked-out branch (`HEAD` when detached).
    pub async fn current_branch(&self) -> Result<String, GitError> {
        let out = self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(out.trim().to_string())
    }

    /// Every path in `branch`'s tree, relative to the repository root.
    ///
    /// NUL-separated output keeps non-ASCII and newline-containing paths
    /// unquoted.
    pub async fn list_tree(&self, branch: &str) -> Result<Vec<String>, GitError> {
        let out = self
            .run(&["ls-tree", "-r", "-z", "--name-only", "--end-of-options", branch])
            .await?;
        Ok(out
            .split('\0')
            .filter(|path| !path.is_empty())
            .map(String::from)
            .collect())
    }

    /// Creates `new_branch` from `source`'s tip and switches to it.
    pub async fn checkout_new_branch(&self, new_branch: &str, source: &str) -> Result<(), GitError> {
        self.run(&["checkout", "-b", new_branch, "--end-of-options", source])
            .await?;
        Ok(())
    }

    /// URL of the named remote.
    pub async fn remote_url(&self, remote: &str) -> Result<String, GitError> {
        let out = self.run(&["remote", "get-url", remote]).await?;
        Ok(out.trim().to_string())
    }

    /// Contents of `relative_path` as stored on `branch`.
    pub async fn show_file(&self, branch: &str, relative_path: &str) -> Result<String, GitError> {
        let spec = format!("{}:{}", branch, relative_path);
        self.run(&["show", &spec]).await
    }
}
