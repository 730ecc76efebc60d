//! Typed views configuration.
//!
//! The JSON shape is validated at the parse boundary: `views` and each
//! view's `name` and `files` must be present and correctly typed, while
//! `version`, `description`, `gitBranch` and `options` are optional.
//! Unknown keys are ignored so editors can add `$schema` and the like.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Root of a views config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    pub views: Views,
}

/// Views keyed by id, kept in file order (which is display order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Views(Vec<(String, View)>);

/// A named, ordered set of files, optionally bound to a git branch.
///
/// `files` holds glob patterns as parsed and absolute paths once the
/// loader has resolved them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub files: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ViewOptions>,
}

/// Presentation and edit-policy flags for a view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_files: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_readme: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_full_path: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_git_branch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_on_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_direct_edits: Option<bool>,
}

impl ViewOptions {
    pub fn number_files(&self) -> bool {
        self.number_files.unwrap_or(false)
    }

    pub fn view_readme(&self) -> bool {
        self.view_readme.unwrap_or(false)
    }

    pub fn show_full_path(&self) -> bool {
        self.show_full_path.unwrap_or(false)
    }

    pub fn show_git_branch(&self) -> bool {
        self.show_git_branch.unwrap_or(false)
    }

    pub fn collapse_on_open(&self) -> bool {
        self.collapse_on_open.unwrap_or(false)
    }

    /// Edits are allowed unless explicitly set to `false`.
    pub fn allow_direct_edits(&self) -> bool {
        self.allow_direct_edits != Some(false)
    }
}

impl View {
    /// Options with defaults filled in when the view has none.
    pub fn options(&self) -> ViewOptions {
        self.options.clone().unwrap_or_default()
    }

    /// Whether `path` is one of this view's files, compared byte for byte.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.as_os_str() == path.as_os_str())
    }
}

impl Views {
    pub fn get(&self, id: &str) -> Option<&View> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &View)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut View)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts a view; a repeated id replaces the earlier view in place.
    pub fn insert(&mut self, id: String, view: View) {
        match self.0.iter_mut().find(|(k, _)| *k == id) {
            Some(slot) => slot.1 = view,
            None => self.0.push((id, view)),
        }
    }
}

impl Serialize for Views {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, view) in &self.0 {
            map.serialize_entry(id, view)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Views {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ViewsVisitor;

        impl<'de> Visitor<'de> for ViewsVisitor {
            type Value = Views;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping view ids to views")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Views, A::Error> {
                let mut views = Views::default();
                while let Some((id, view)) = access.next_entry::<String, View>()? {
                    views.insert(id, view);
                }
                Ok(views)
            }
        }

        deserializer.deserialize_map(ViewsVisitor)
    }
}
