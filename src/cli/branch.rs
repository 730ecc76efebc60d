//! Branch-aware commands: open, edit-branch, status and pr-url.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::debug;

use super::absolute_file;
use crate::constants::PR_REMOTE;
use crate::edit::{open_file, OpenAction, TerminalPrompt};
use crate::loader::ConfigLoader;
use crate::pr::{pull_request_url, source_branch_of_edit};
use crate::settings::Settings;

pub(super) async fn open(loader: &ConfigLoader, settings: &Settings, file: &Path) -> Result<ExitCode> {
    let file = absolute_file(file)?;
    match open_file(loader, &file, &TerminalPrompt).await? {
        OpenAction::Editable(path) => launch_editor(settings, &path).await?,
        OpenAction::EditableOnNewBranch { path, branch } => {
            println!("{} {}", "Created branch".green().bold(), branch);
            launch_editor(settings, &path).await?;
        }
        OpenAction::ReadOnly {
            path,
            branch,
            contents,
        } => {
            println!(
                "{}",
                format!("--- {} @ {} (read-only) ---", path.display(), branch).dimmed()
            );
            print!("{}", contents);
        }
        OpenAction::Cancelled => eprintln!("{}", "Cancelled".dimmed()),
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs the configured editor on `path`, or prints the path when none is set.
async fn launch_editor(settings: &Settings, path: &Path) -> Result<()> {
    let editor = settings
        .editor
        .clone()
        .or_else(|| std::env::var("VISUAL").ok())
        .or_else(|| std::env::var("EDITOR").ok())
        .filter(|editor| !editor.trim().is_empty());
    let Some(editor) = editor else {
        println!("{}", path.display());
        return Ok(());
    };

    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("Editor command is empty");
    };
    debug!(editor = %editor, path = %path.display(), "launching editor");
    let status = tokio::process::Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .await
        .with_context(|| format!("Failed to open editor '{}'", editor))?;
    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

pub(super) async fn edit_branch(loader: &ConfigLoader, view_id: &str, file: &Path) -> Result<ExitCode> {
    if loader.view(view_id).is_none() {
        bail!("Unknown view '{}'", view_id);
    }
    let file = absolute_file(file)?;
    let created = loader
        .create_branch_for_edit(view_id, &file)
        .await
        .context("Failed to create branch for edit")?;
    let Some(branch) = created else {
        if !loader.is_git_available() {
            bail!("Git is not available in {}", loader.root().display());
        }
        bail!("View '{}' does not have a git branch configured", view_id);
    };
    loader.refresh().await;
    println!("{}", branch);
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn status(loader: &ConfigLoader) -> Result<ExitCode> {
    if !loader.is_git_available() {
        println!("Git is not available in {}", loader.root().display());
        return Ok(ExitCode::SUCCESS);
    }
    let Some(current) = loader.current_branch().await else {
        bail!("Could not determine the current branch");
    };
    println!("{} {}", "Branch:".bold(), current.cyan());
    if let Some(path) = loader.config_path() {
        println!("{} {}", "Config:".bold(), path.display());
    }
    match source_branch_of_edit(&current) {
        Some(source) => {
            println!("{} {}", "Edit branch from:".bold(), source.cyan());
            println!(
                "{}",
                "Run `fv pr-url` to get a link for opening a pull request".dimmed()
            );
        }
        None => println!("{}", "Not an edit branch".dimmed()),
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn pr_url(loader: &ConfigLoader) -> Result<ExitCode> {
    if !loader.is_git_available() {
        bail!("Git is not available in {}", loader.root().display());
    }
    let Some(current) = loader.current_branch().await else {
        bail!("Could not determine the current branch");
    };
    let remote = loader
        .git()
        .remote_url(PR_REMOTE)
        .await
        .context("Could not determine the remote repository URL")?;
    println!("{}", pull_request_url(&remote, &current)?);
    Ok(ExitCode::SUCCESS)
}
