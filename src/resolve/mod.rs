//! Expansion of a view's glob patterns into absolute file paths.
//!
//! Views without a branch (or when git is unavailable) are resolved
//! against the working tree with a real glob engine. Views bound to a
//! branch other than the checked-out one are resolved against that
//! branch's `git ls-tree` listing using [`glob_regex`].
//!
//! A pattern that fails is logged and skipped; it never aborts the rest
//! of the view. Duplicates across patterns are kept.

pub mod glob_regex;

use std::path::{Path, PathBuf};

use glob::MatchOptions;
use tracing::{debug, warn};

use crate::git::Git;

/// Resolves patterns relative to one workspace root.
pub struct PatternResolver<'a> {
    root: &'a Path,
    /// `None` when git is unavailable.
    git: Option<&'a Git>,
}

impl<'a> PatternResolver<'a> {
    pub fn new(root: &'a Path, git: Option<&'a Git>) -> Self {
        Self { root, git }
    }

    /// Resolves one view's patterns, honoring its optional branch.
    pub async fn resolve_view(
        &self,
        view_id: &str,
        patterns: &[PathBuf],
        branch: Option<&str>,
    ) -> Vec<PathBuf> {
        let patterns: Vec<String> = patterns
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        match (branch, self.git) {
            (Some(branch), Some(git)) => {
                debug!(view = view_id, branch, "resolving files from branch");
                self.resolve_from_branch(git, branch, &patterns).await
            }
            _ => {
                debug!(view = view_id, "resolving file patterns from working tree");
                self.resolve_working_tree(&patterns)
            }
        }
    }

    /// Expands patterns on disk: case-sensitive, `**` recursive,
    /// directories excluded, absolute paths in glob order.
    pub fn resolve_working_tree(&self, patterns: &[String]) -> Vec<PathBuf> {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };

        // The root is literal; only the configured pattern is glob syntax.
        let root = PathBuf::from(glob::Pattern::escape(&self.root.to_string_lossy()));
        let mut files = Vec::new();
        for pattern in patterns {
            let full = root.join(pattern);
            let full = full.to_string_lossy();
            let entries = match glob::glob_with(&full, options) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(pattern = %pattern, "error resolving pattern: {}", e);
                    continue;
                }
            };
            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(e) => debug!(pattern = %pattern, "skipping unreadable entry: {}", e),
                }
            }
        }
        files
    }

    /// Filters `branch`'s tree listing against each pattern.
    ///
    /// When `branch` is the checked-out branch the working tree already
    /// reflects it, so the working-tree resolver is used instead. Any git
    /// failure yields an empty list.
    pub async fn resolve_from_branch(
        &self,
        git: &Git,
        branch: &str,
        patterns: &[String],
    ) -> Vec<PathBuf> {
        let current = match git.current_branch().await {
            Ok(current) => current,
            Err(e) => {
                warn!("error getting current git branch: {}", e);
                return Vec::new();
            }
        };
        if current == branch {
            return self.resolve_working_tree(patterns);
        }

        let listing = match git.list_tree(branch).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(branch, "error getting files from branch: {}", e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        for pattern in patterns {
            let regex = match glob_regex::glob_to_regex(pattern) {
                Ok(regex) => regex,
                Err(e) => {
                    warn!(pattern = %pattern, "error resolving pattern: {}", e);
                    continue;
                }
            };
            files.extend(
                listing
                    .iter()
                    .filter(|file| regex.is_match(file))
                    .map(|file| self.root.join(file)),
            );
        }
        files
    }
}
