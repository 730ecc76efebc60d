//! Edit branches and the decision of how a file may be opened.
//!
//! A file owned by a view bound to another branch, whose view forbids
//! direct edits, is never opened editable as-is. The user either branches
//! off the view's branch first or looks at the branch's copy read-only.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use crate::constants::{EDIT_BRANCH_PREFIX, PROMPT_CREATE_BRANCH, PROMPT_VIEW_ONLY};
use crate::loader::ConfigLoader;

/// `edit/<source>/edit-<basename>-<timestamp>`, where the timestamp is
/// RFC 3339 UTC with milliseconds and every `:` and `.` replaced by `-`.
pub fn edit_branch_name(source_branch: &str, file_path: &Path, now: DateTime<Utc>) -> String {
    let base = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string_lossy().into_owned());
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}/{}/edit-{}-{}", EDIT_BRANCH_PREFIX, source_branch, base, stamp)
}

/// How an open request must be handled.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenDecision {
    /// Unowned, same branch, or the view allows direct edits.
    Direct,
    /// Owned by a view on another branch that forbids direct edits.
    Prompt { view_id: String, branch: String },
}

/// The user's answer to the edit prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditChoice {
    CreateBranch,
    ViewOnly,
    Cancel,
}

/// Asks the user how to open a restricted file.
pub trait EditPrompt {
    fn choose(&self, path: &Path, branch: &str) -> Result<EditChoice>;
}

/// What [`open_file`] ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenAction {
    Editable(PathBuf),
    EditableOnNewBranch { path: PathBuf, branch: String },
    /// The file's content on `branch`; nothing is written to disk.
    ReadOnly {
        path: PathBuf,
        branch: String,
        contents: String,
    },
    Cancelled,
}

pub async fn decide(loader: &ConfigLoader, path: &Path) -> OpenDecision {
    let Some(view_id) = loader.find_view(path) else {
        return OpenDecision::Direct;
    };
    if !loader.is_file_from_different_branch(path).await
        || loader.are_direct_edits_allowed(&view_id)
    {
        return OpenDecision::Direct;
    }
    match loader.branch_for_view(&view_id) {
        Some(branch) => OpenDecision::Prompt { view_id, branch },
        None => OpenDecision::Direct,
    }
}

/// Runs the open flow for `path`, prompting when the file is restricted.
///
/// # Errors
///
/// Fails when the prompt cannot be read, the edit branch cannot be
/// created, or the branch copy cannot be read. No branch is left checked
/// out on failure.
pub async fn open_file(
    loader: &ConfigLoader,
    path: &Path,
    prompt: &dyn EditPrompt,
) -> Result<OpenAction> {
    let (view_id, branch) = match decide(loader, path).await {
        OpenDecision::Direct => return Ok(OpenAction::Editable(path.to_path_buf())),
        OpenDecision::Prompt { view_id, branch } => (view_id, branch),
    };
    debug!(view = %view_id, branch = %branch, path = %path.display(), "file is edit-restricted");

    match prompt.choose(path, &branch)? {
        EditChoice::CreateBranch => {
            let new_branch = loader
                .create_branch_for_edit(&view_id, path)
                .await
                .context("Failed to create branch for edit")?;
            let Some(new_branch) = new_branch else {
                bail!("View '{}' has no branch to edit from", view_id);
            };
            loader.refresh().await;
            info!(branch = %new_branch, "opening on edit branch");
            Ok(OpenAction::EditableOnNewBranch {
                path: path.to_path_buf(),
                branch: new_branch,
            })
        }
        EditChoice::ViewOnly => {
            let relative = relative_to_root(loader.root(), path)?;
            let contents = loader
                .git()
                .show_file(&branch, &relative)
                .await
                .with_context(|| format!("Failed to read {} from {}", relative, branch))?;
            Ok(OpenAction::ReadOnly {
                path: path.to_path_buf(),
                branch,
                contents,
            })
        }
        EditChoice::Cancel => Ok(OpenAction::Cancelled),
    }
}

/// `path` relative to `root` with `/` separators, as git expects.
fn relative_to_root(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Reads the choice from stdin; anything but the two options cancels.
pub struct TerminalPrompt;

impl EditPrompt for TerminalPrompt {
    fn choose(&self, path: &Path, branch: &str) -> Result<EditChoice> {
        eprint!(
            "\nThis file is from branch '{}' and is not on your current branch.\n{}\n\n[1] {} / [2] {} / anything else to cancel: ",
            branch,
            path.display(),
            PROMPT_CREATE_BRANCH,
            PROMPT_VIEW_ONLY
        );
        io::stderr().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;
        Ok(parse_choice(&response))
    }
}

fn parse_choice(response: &str) -> EditChoice {
    match response.trim().to_lowercase().as_str() {
        "1" | "c" | "create" => EditChoice::CreateBranch,
        "2" | "v" | "view" => EditChoice::ViewOnly,
        _ => EditChoice::Cancel,
    }
}
