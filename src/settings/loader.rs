//! Settings file loading and CLI overrides.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{ParserKind, Settings};

/// Values given on the command line; `Some` wins over the settings file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub parser: Option<ParserKind>,
    pub git_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Loads settings from `path`, or defaults when the file is absent.
    pub(super) fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings at {:?}", path))?;
        Ok(settings)
    }

    /// Apply command-line overrides on top of file settings.
    pub(super) fn merge(mut self, overrides: Overrides) -> Settings {
        if let Some(parser) = overrides.parser {
            self.parser = parser;
        }
        if let Some(secs) = overrides.git_timeout_secs {
            self.git_timeout_secs = secs;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.parser, ParserKind::Jsonc);
        assert_eq!(settings.git_timeout_secs, 5);
        assert_eq!(settings.cue_binary, "cue");
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "parser = \"cue\"\n\n[logging]\nfile = \"/tmp/fv.log\"\n").unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.parser, ParserKind::Cue);
        assert_eq!(settings.git_timeout_secs, 5);
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(
            settings.logging.file.as_deref(),
            Some(Path::new("/tmp/fv.log"))
        );
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "parser = [").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let merged = Settings::default().merge(Overrides {
            parser: Some(ParserKind::Cue),
            git_timeout_secs: Some(30),
            log_level: None,
        });
        assert_eq!(merged.parser, ParserKind::Cue);
        assert_eq!(merged.git_timeout_secs, 30);
        assert_eq!(merged.logging.level, "warn");
    }
}
