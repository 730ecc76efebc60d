//! In-memory [`GitRunner`] for tests.
//!
//! Simulates a repository with `main` and `develop` branches and records
//! every invocation together with its working directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{GitError, GitRunner};

struct State {
    current: String,
    head_unreadable: bool,
    branches: HashMap<String, Vec<String>>,
    calls: Vec<(PathBuf, Vec<String>)>,
}

pub struct MockGit {
    state: Mutex<State>,
    has_binary: bool,
    is_repo: bool,
    remote: Option<String>,
}

impl MockGit {
    pub fn new() -> Self {
        let mut branches = HashMap::new();
        branches.insert(
            "main".to_string(),
            vec!["src/main.ts".into(), "src/utils.ts".into(), "README.md".into()],
        );
        branches.insert(
            "develop".to_string(),
            vec![
                "src/main.ts".into(),
                "src/utils.ts".into(),
                "src/feature.ts".into(),
                "README.md".into(),
            ],
        );
        Self {
            state: Mutex::new(State {
                current: "main".into(),
                head_unreadable: false,
                branches,
                calls: Vec::new(),
            }),
            has_binary: true,
            is_repo: true,
            remote: Some("https://github.com/acme/widgets.git".into()),
        }
    }

    pub fn without_binary(mut self) -> Self {
        self.has_binary = false;
        self
    }

    pub fn not_a_repo(mut self) -> Self {
        self.is_repo = false;
        self
    }

    pub fn with_remote(mut self, remote: Option<&str>) -> Self {
        self.remote = remote.map(String::from);
        self
    }

    pub fn set_current_branch(&self, branch: &str) {
        let mut state = self.state.lock().unwrap();
        if !state.branches.contains_key(branch) {
            let files = state.branches["main"].clone();
            state.branches.insert(branch.to_string(), files);
        }
        state.current = branch.to_string();
    }

    /// Makes `rev-parse --abbrev-ref HEAD` fail from now on.
    pub fn set_head_unreadable(&self) {
        self.state.lock().unwrap().head_unreadable = true;
    }

    pub fn add_branch(&self, branch: &str, files: &[&str]) {
        let files = files.iter().map(|f| f.to_string()).collect();
        self.state
            .lock()
            .unwrap()
            .branches
            .insert(branch.to_string(), files);
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_args(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|(_, args)| args).collect()
    }

    pub fn count(&self, subcommand: &str) -> usize {
        self.calls_args()
            .iter()
            .filter(|args| args.first().map(String::as_str) == Some(subcommand))
            .count()
    }

    fn fail(args: &[&str], stderr: &str) -> GitError {
        GitError::Failed {
            command: args.join(" "),
            code: Some(128),
            stderr: stderr.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl GitRunner for MockGit {
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((
            cwd.to_path_buf(),
            args.iter().map(|a| a.to_string()).collect(),
        ));

        if !self.has_binary {
            return Err(GitError::Spawn {
                command: args.join(" "),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "git not found"),
            });
        }

        match args {
            ["--version"] => Ok("git version 2.39.1\n".into()),
            ["rev-parse", "--is-inside-work-tree"] => {
                if self.is_repo {
                    Ok("true\n".into())
                } else {
                    Err(Self::fail(args, "fatal: not a git repository"))
                }
            }
            ["rev-parse", "--abbrev-ref", "HEAD"] => {
                if state.head_unreadable {
                    Err(Self::fail(args, "fatal: ambiguous argument 'HEAD'"))
                } else {
                    Ok(format!("{}\n", state.current))
                }
            }
            ["ls-tree", "-r", "-z", "--name-only", "--end-of-options", branch] => {
                match state.branches.get(*branch) {
                    Some(files) => Ok(files.iter().map(|f| format!("{}\0", f)).collect()),
                    None => Err(Self::fail(args, "fatal: Not a valid object name")),
                }
            }
            ["checkout", "-b", new_branch, "--end-of-options", source] => {
                if state.branches.contains_key(*new_branch) {
                    return Err(Self::fail(args, "fatal: a branch with that name already exists"));
                }
                let Some(files) = state.branches.get(*source).cloned() else {
                    return Err(Self::fail(args, "fatal: invalid reference"));
                };
                state.branches.insert(new_branch.to_string(), files);
                state.current = new_branch.to_string();
                Ok(String::new())
            }
            ["remote", "get-url", _] => match &self.remote {
                Some(url) => Ok(format!("{}\n", url)),
                None => Err(Self::fail(args, "error: No such remote")),
            },
            ["show", spec] => {
                let (branch, path) = spec.split_once(':').unwrap_or((*spec, ""));
                match state.branches.get(branch) {
                    Some(files) if files.iter().any(|f| f == path) => {
                        Ok(format!("{} @ {}\n", path, branch))
                    }
                    _ => Err(Self::fail(args, "fatal: path does not exist")),
                }
            }
            _ => Err(Self::fail(args, "unsupported mock command")),
        }
    }
}
