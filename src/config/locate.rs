//! Views config discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::{CONFIG_FILENAMES, CONFIG_SEARCH_DIRS};

/// Every candidate config path under `root`, in search order.
pub fn candidates(root: &Path) -> Vec<PathBuf> {
    CONFIG_SEARCH_DIRS
        .iter()
        .flat_map(|dir| {
            let base = if dir.is_empty() {
                root.to_path_buf()
            } else {
                root.join(dir)
            };
            CONFIG_FILENAMES.iter().map(move |name| base.join(name))
        })
        .collect()
}

/// Returns the first candidate that exists as a regular file.
///
/// `None` means "no configuration", which is distinct from a config that
/// exists but fails to parse.
pub fn locate(root: &Path) -> Option<PathBuf> {
    let found = candidates(root).into_iter().find(|path| {
        let is_file = path.metadata().map(|m| m.is_file()).unwrap_or(false);
        debug!(path = %path.display(), is_file, "checked config candidate");
        is_file
    });
    if found.is_none() {
        debug!(root = %root.display(), "no views config found");
    }
    found
}

/// Whether `name` is one of the accepted config filenames.
pub fn is_config_filename(name: &str) -> bool {
    CONFIG_FILENAMES.contains(&name)
}
