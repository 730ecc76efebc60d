//! Entry point for focused-views, curated branch-aware views over a
//! repository's files.
//!
//! Parses CLI arguments via [`cli`] and dispatches to the chosen
//! subcommand handler.

mod cli;
mod config;
mod constants;
mod edit;
mod git;
mod loader;
mod logging;
mod output;
mod pr;
mod resolve;
mod settings;
mod tree;
mod watch;

use std::process::ExitCode;

use anyhow::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = cli::parse();
    cli::run(cli).await
}
