//! Centralized constants for focused-views.
//!
//! File names, search locations, timeouts and defaults live here so they
//! can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "focused-views";

/// Tool settings filename under the XDG config directory.
pub const SETTINGS_FILENAME: &str = "config.toml";

// --- Views config discovery ---

/// Accepted views config filenames, in search order.
pub const CONFIG_FILENAMES: &[&str] = &[
    ".focusedviews",
    ".focusedviews.json",
    ".focusedviews.jsonc",
    "focusedviews.json",
    "focusedviews.jsonc",
];

/// Directories searched for a views config, relative to the workspace
/// root, in search order. The empty string is the root itself.
pub const CONFIG_SEARCH_DIRS: &[&str] = &["", ".vscode", "examples"];

/// Filename used by `fv init`.
pub const SAMPLE_CONFIG_FILENAME: &str = ".focusedviews.json";

/// Sample views config written by `fv init`.
///
/// Patterns avoid `*/`, which comment stripping would treat as the end of
/// a block comment.
pub const SAMPLE_CONFIG: &str = r#"{
  "version": "1.0.0",
  "views": {
    "main": {
      "name": "Main View",
      "description": "Main files",
      "files": [
        "src/*.ts",
        "src/*.js"
      ],
      "options": {
        "showFullPath": false,
        "numberFiles": true
      }
    },
    "docs": {
      "name": "Documentation",
      "description": "Documentation files",
      "files": [
        "README.md",
        "docs/*.md"
      ],
      "options": {
        "showFullPath": true
      }
    }
  }
}
"#;

/// README shown at the top of views with `viewReadme` enabled.
pub const README_FILENAME: &str = "README.md";

// --- Git ---

/// Git executable name.
pub const GIT_BINARY: &str = "git";

/// Default timeout for a single git invocation.
pub const GIT_TIMEOUT_DEFAULT_SECS: u64 = 5;

/// Remote used to derive pull request URLs.
pub const PR_REMOTE: &str = "origin";

/// First path component of every generated edit branch.
pub const EDIT_BRANCH_PREFIX: &str = "edit";

// --- Alternate (schema-validated) parser ---

/// Default schema-export CLI.
pub const CUE_DEFAULT_BINARY: &str = "cue";

/// Suffix of the JSON file exported next to the source config.
pub const CUE_EXPORT_SUFFIX: &str = ".export.json";

// --- Logging ---

/// Default log level when neither settings nor flags say otherwise.
pub const LOG_LEVEL_DEFAULT: &str = "warn";

// --- Watch mode ---

/// Debounce window for config file events.
pub const WATCH_DEBOUNCE_MS: u64 = 200;

/// Capacity of the watcher's event channel.
pub const WATCH_CHANNEL_CAPACITY: usize = 16;

// --- Edit prompt ---

/// Affirmative prompt choice: create an edit branch, then open editable.
pub const PROMPT_CREATE_BRANCH: &str = "Create Branch & Edit";

/// Affirmative prompt choice: open as a read-only preview.
pub const PROMPT_VIEW_ONLY: &str = "View Only";
