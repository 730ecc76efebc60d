//! User-facing message output.
//!
//! Defines the [`Notifier`] trait that separates user-visible messages
//! from diagnostic logs. [`StderrNotifier`] prints colored lines to the
//! terminal; tests use a recording implementation.

use colored::Colorize;

/// Sink for messages the user should see, as opposed to tracing logs.
pub trait Notifier: Send + Sync {
    /// Informational message (e.g. which config file is in use).
    fn info(&self, message: &str);

    /// An operation failed.
    fn error(&self, message: &str);
}

/// Prints messages to stderr, keeping stdout for command output.
#[derive(Debug, Default)]
pub struct StderrNotifier {
    quiet: bool,
}

impl StderrNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress informational messages; warnings and errors still print.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Notifier for StderrNotifier {
    fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message.dimmed());
        }
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }
}
