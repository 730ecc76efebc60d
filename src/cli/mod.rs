//! Command-line interface definition and dispatch for focused-views.
//!
//! Uses [`clap`] for argument parsing with derive macros. View listing and
//! lookups live in [`views`]; branch-changing commands live in [`branch`].

mod branch;
mod views;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::cue::CueParser;
use crate::config::parser::{ConfigParser, JsoncParser};
use crate::git::SystemGit;
use crate::loader::ConfigLoader;
use crate::logging;
use crate::output::{Notifier, StderrNotifier};
use crate::settings::{Overrides, ParserKind, Settings};

/// Top-level CLI structure for focused-views.
#[derive(Parser)]
#[command(
    name = "fv",
    version,
    about = "Curated, branch-aware views over a repository's files"
)]
pub struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Views config parser (overrides settings)
    #[arg(long, global = true, value_enum)]
    pub parser: Option<ParserKind>,

    /// Timeout for each git invocation, in seconds (overrides settings)
    #[arg(long = "git-timeout", global = true, value_name = "SECS")]
    pub git_timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands. The `///` doc comments on variants double as
/// `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Show every view and its files
    List {
        /// Also show files of views configured to start collapsed
        #[arg(long)]
        expand: bool,
    },
    /// Print the resolved files of one view
    Files { view: String },
    /// Print the view a file belongs to
    Which { file: PathBuf },
    /// Open a file, asking first if it belongs to another branch
    Open { file: PathBuf },
    /// Create an edit branch for a file from its view's branch
    EditBranch { view: String, file: PathBuf },
    /// Show the branch a view is bound to
    Branch { view: String },
    /// Show the current branch and, on an edit branch, its source
    Status,
    /// Print the URL for opening a pull request from the current edit branch
    PrUrl,
    /// Write a sample .focusedviews.json to the workspace root
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Re-render the views whenever a config file changes
    Watch,
    /// Inspect tool settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show effective settings and the settings file path
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Loads settings, sets up logging and dispatches the parsed command.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let overrides = Overrides {
        parser: cli.parser,
        git_timeout_secs: cli.git_timeout,
        log_level: logging::level_for_verbosity(cli.verbose).map(String::from),
    };
    let settings = Settings::load(overrides)?;
    logging::init(&settings.logging.level, settings.logging.file.as_deref())?;

    let root = workspace_root(cli.root.as_deref())?;
    let notifier: Arc<dyn Notifier> = if cli.verbose > 0 {
        Arc::new(StderrNotifier::new())
    } else {
        Arc::new(StderrNotifier::quiet())
    };

    let workspace = || open_workspace(root.clone(), &settings, notifier.clone());

    match cli.command {
        Commands::List { expand } => views::list(&workspace().await, expand),
        Commands::Files { view } => views::files(&workspace().await, &view),
        Commands::Which { file } => views::which(&workspace().await, &file),
        Commands::Branch { view } => views::branch(&workspace().await, &view).await,
        Commands::Watch => views::watch(&workspace().await).await,
        Commands::Init { force } => views::init(&root, force),
        Commands::Open { file } => branch::open(&workspace().await, &settings, &file).await,
        Commands::EditBranch { view, file } => {
            branch::edit_branch(&workspace().await, &view, &file).await
        }
        Commands::Status => branch::status(&workspace().await).await,
        Commands::PrUrl => branch::pr_url(&workspace().await).await,
        Commands::Settings { action } => match action {
            SettingsAction::Show => show_settings(&settings),
        },
    }
}

async fn open_workspace(
    root: PathBuf,
    settings: &Settings,
    notifier: Arc<dyn Notifier>,
) -> ConfigLoader {
    let runner = Arc::new(SystemGit::new(settings.git_timeout()));
    ConfigLoader::new(root, runner, config_parser(settings), notifier).await
}

fn config_parser(settings: &Settings) -> Box<dyn ConfigParser> {
    match settings.parser {
        ParserKind::Jsonc => Box::new(JsoncParser),
        ParserKind::Cue => Box::new(CueParser::new(
            settings.cue_binary.clone(),
            settings.git_timeout(),
        )),
    }
}

fn workspace_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("Workspace root {} does not exist", root.display()))
}

/// Makes a user-supplied file argument comparable with resolved paths.
pub(crate) fn absolute_file(file: &Path) -> Result<PathBuf> {
    let file = if file.is_absolute() {
        file.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read current directory")?
            .join(file)
    };
    Ok(file.canonicalize().unwrap_or(file))
}

fn show_settings(settings: &Settings) -> Result<ExitCode> {
    let path = Settings::settings_path()?;
    println!("{} {}", "Settings path:".bold(), path.display());
    println!();
    println!("{}", toml::to_string_pretty(settings)?);
    Ok(ExitCode::SUCCESS)
}
