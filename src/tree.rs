//! Two-level tree of views and their files, and its terminal rendering.

use std::fmt::Write as _;
use std::path::Path;

use colored::Colorize;

use crate::config::{Config, View};
use crate::constants::README_FILENAME;

#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    /// No config is loaded.
    Placeholder { label: String, description: String },
    Views(Vec<ViewNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    pub id: String,
    pub label: String,
    pub description: String,
    pub collapsed: bool,
    pub children: Vec<FileNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    pub label: String,
    pub description: Option<String>,
    pub is_readme: bool,
}

impl Tree {
    pub fn build(root: &Path, config: Option<&Config>) -> Self {
        let Some(config) = config else {
            return Self::Placeholder {
                label: "No .focusedviews file found".into(),
                description: "Create a .focusedviews file in your workspace root".into(),
            };
        };
        Self::Views(
            config
                .views
                .iter()
                .map(|(id, view)| view_node(root, id, view))
                .collect(),
        )
    }

    /// Renders the tree; collapsed views show their files only with `expand`.
    pub fn render(&self, expand: bool) -> String {
        let mut out = String::new();
        match self {
            Self::Placeholder { label, description } => {
                let _ = writeln!(out, "{}  {}", label.yellow(), description.dimmed());
            }
            Self::Views(views) => {
                for view in views {
                    let marker = if view.collapsed && !expand { "▸" } else { "▾" };
                    let _ = write!(
                        out,
                        "{} {} {}",
                        marker,
                        view.label.bold(),
                        format!("[{}]", view.id).dimmed()
                    );
                    if !view.description.is_empty() {
                        let _ = write!(out, "  {}", view.description.dimmed());
                    }
                    out.push('\n');
                    if view.collapsed && !expand {
                        continue;
                    }
                    for file in &view.children {
                        let label = if file.is_readme {
                            file.label.cyan().to_string()
                        } else {
                            file.label.clone()
                        };
                        let _ = write!(out, "    {}", label);
                        if let Some(description) = &file.description {
                            let _ = write!(out, "  {}", description.dimmed());
                        }
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}

fn view_node(root: &Path, id: &str, view: &View) -> ViewNode {
    let options = view.options();

    let mut description = view.description.clone().unwrap_or_default();
    if let (true, Some(branch)) = (options.show_git_branch(), &view.git_branch) {
        description = if description.is_empty() {
            format!("Branch: {}", branch)
        } else {
            format!("{} ({})", description, branch)
        };
    }

    let mut children = Vec::new();
    if options.view_readme() {
        let readme = root.join(README_FILENAME);
        if readme.is_file() {
            children.push(FileNode {
                label: README_FILENAME.into(),
                description: None,
                is_readme: true,
            });
        }
    }

    for (index, path) in view.files.iter().enumerate() {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let label = if options.show_full_path() {
            relative.to_string_lossy().into_owned()
        } else {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| relative.to_string_lossy().into_owned())
        };
        let label = if options.number_files() {
            format!("{}. {}", index + 1, label)
        } else {
            label
        };
        let description = if options.show_full_path() {
            None
        } else {
            relative
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(|parent| parent.to_string_lossy().into_owned())
        };
        children.push(FileNode {
            label,
            description,
            is_readme: false,
        });
    }

    ViewNode {
        id: id.to_string(),
        label: view.name.clone(),
        description,
        collapsed: options.collapse_on_open(),
        children,
    }
}
