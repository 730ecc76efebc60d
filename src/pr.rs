//! Pull request URLs for edit branches.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::constants::EDIT_BRANCH_PREFIX;

static EDIT_BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{}/(.+)/edit-[^/]*$", EDIT_BRANCH_PREFIX)).expect("valid regex")
});

#[derive(Debug, Error, PartialEq)]
pub enum PrUrlError {
    #[error("branch '{0}' is not an edit branch created by focused-views")]
    NotEditBranch(String),
    #[error("unsupported remote '{0}': only GitHub, GitLab and Bitbucket are supported")]
    UnsupportedRemote(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Host {
    GitHub,
    GitLab,
    Bitbucket,
}

impl Host {
    fn detect(remote: &str) -> Option<Self> {
        if remote.contains("github.com") {
            Some(Self::GitHub)
        } else if remote.contains("gitlab.com") {
            Some(Self::GitLab)
        } else if remote.contains("bitbucket.org") {
            Some(Self::Bitbucket)
        } else {
            None
        }
    }

    fn domain(self) -> &'static str {
        match self {
            Self::GitHub => "github.com",
            Self::GitLab => "gitlab.com",
            Self::Bitbucket => "bitbucket.org",
        }
    }
}

/// The branch an edit branch was cut from, e.g. `develop` for
/// `edit/develop/edit-feature.ts-2025-03-01T12-00-00-000Z`.
pub fn source_branch_of_edit(branch: &str) -> Option<&str> {
    EDIT_BRANCH_RE
        .captures(branch)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Page that opens a pull (or merge) request from `branch` into its
/// source branch on the host behind `remote`.
pub fn pull_request_url(remote: &str, branch: &str) -> Result<String, PrUrlError> {
    let branch = branch.trim();
    let target = source_branch_of_edit(branch)
        .ok_or_else(|| PrUrlError::NotEditBranch(branch.to_string()))?;
    let remote = remote.trim();
    let host =
        Host::detect(remote).ok_or_else(|| PrUrlError::UnsupportedRemote(remote.to_string()))?;

    let base = https_base(remote, host);
    Ok(match host {
        Host::GitHub => format!("{}/compare/{}...{}?expand=1", base, target, branch),
        Host::GitLab => format!(
            "{}/-/merge_requests/new?merge_request[source_branch]={}&merge_request[target_branch]={}",
            base, branch, target
        ),
        Host::Bitbucket => format!(
            "{}/pull-requests/new?source={}&dest={}",
            base, branch, target
        ),
    })
}

fn https_base(remote: &str, host: Host) -> String {
    let trimmed = remote.strip_suffix(".git").unwrap_or(remote);
    let ssh_prefix = format!("git@{}:", host.domain());
    match trimmed.strip_prefix(&ssh_prefix) {
        Some(path) => format!("https://{}/{}", host.domain(), path),
        None => trimmed.to_string(),
    }
}
