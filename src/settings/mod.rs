//! Tool settings for focused-views.
//!
//! Settings live as TOML at the platform's XDG config path
//! (e.g. `~/.config/focused-views/config.toml` on Linux). They control how
//! the views config is parsed and how git is invoked, not which views exist.

mod loader;
mod types;

pub use loader::Overrides;
pub use types::{ParserKind, Settings};

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{APP_NAME, SETTINGS_FILENAME};

impl Settings {
    /// Load settings with precedence: command line > settings file > defaults.
    pub fn load(overrides: Overrides) -> Result<Self> {
        let path = Self::settings_path()?;
        Ok(Self::load_from(&path)?.merge(overrides))
    }

    /// `<config dir>/focused-views/config.toml`; the file itself is optional.
    ///
    /// # Errors
    ///
    /// Fails when the platform has no config directory.
    pub fn settings_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(base.join(APP_NAME).join(SETTINGS_FILENAME))
    }

    /// Timeout applied to each git invocation.
    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }
}
