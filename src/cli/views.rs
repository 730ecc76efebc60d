//! Read-only view commands: list, files, which, branch, init and watch.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::{debug, info};

use super::absolute_file;
use crate::config::locate;
use crate::constants::{SAMPLE_CONFIG, SAMPLE_CONFIG_FILENAME};
use crate::loader::{ConfigLoader, RefreshOutcome};
use crate::tree::Tree;
use crate::watch::ConfigWatcher;

fn render(loader: &ConfigLoader, expand: bool) -> String {
    let snapshot = loader.config();
    Tree::build(loader.root(), snapshot.as_ref().map(|loaded| &loaded.config)).render(expand)
}

pub(super) fn list(loader: &ConfigLoader, expand: bool) -> Result<ExitCode> {
    print!("{}", render(loader, expand));
    if loader.config().is_some() && loader.views().is_empty() {
        eprintln!("{}", "The configuration defines no views".dimmed());
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) fn files(loader: &ConfigLoader, view_id: &str) -> Result<ExitCode> {
    if loader.view(view_id).is_none() {
        bail!("Unknown view '{}'", view_id);
    }
    for file in loader.files_for_view(view_id) {
        println!("{}", file.display());
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) fn which(loader: &ConfigLoader, file: &Path) -> Result<ExitCode> {
    let file = absolute_file(file)?;
    match loader.find_view(&file) {
        Some(view_id) => {
            println!("{}", view_id);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

pub(super) async fn branch(loader: &ConfigLoader, view_id: &str) -> Result<ExitCode> {
    let Some(view) = loader.view(view_id) else {
        bail!("Unknown view '{}'", view_id);
    };
    match &view.git_branch {
        Some(branch) => {
            println!(
                "View '{}' shows files from branch {}",
                view.name,
                branch.cyan().bold()
            );
            if !loader.view_options(view_id).allow_direct_edits() {
                println!("Direct edits are disabled; opening a file offers an edit branch");
            }
            if let Some(current) = loader.current_branch().await {
                if &current != branch {
                    println!("{}", format!("Current branch is {}", current).dimmed());
                }
            }
        }
        None => println!("View '{}' does not have a git branch configured", view.name),
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) fn init(root: &Path, force: bool) -> Result<ExitCode> {
    let path = root.join(SAMPLE_CONFIG_FILENAME);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(&path, SAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} {}", "Created".green().bold(), path.display());
    if let Some(active) = locate::locate(root) {
        if active != path {
            println!(
                "{}",
                format!("Note: {} takes precedence over it", active.display()).yellow()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn watch(loader: &ConfigLoader) -> Result<ExitCode> {
    let mut watcher = ConfigWatcher::start(loader.root())?;
    print!("{}", render(loader, false));
    eprintln!("{}", "Watching for config changes (Ctrl-C to stop)".dimmed());

    loop {
        tokio::select! {
            changed = watcher.changed() => {
                let Some(path) = changed else { break };
                info!(path = %path.display(), "config changed");
                match loader.refresh().await {
                    RefreshOutcome::Coalesced => continue,
                    RefreshOutcome::Loaded { path, views } => eprintln!(
                        "{}",
                        format!("Reloaded {} ({} views)", path.display(), views).dimmed()
                    ),
                    RefreshOutcome::NotFound => {
                        eprintln!("{}", "Configuration file removed".dimmed())
                    }
                    RefreshOutcome::Failed(e) => debug!("refresh failed: {}", e),
                }
                println!();
                print!("{}", render(loader, false));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(ExitCode::SUCCESS)
}
