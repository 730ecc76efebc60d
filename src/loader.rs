//! The config loader: owns the resolved views config for one workspace.
//!
//! [`ConfigLoader`] locates and parses the views config, resolves every
//! view's patterns to absolute paths and keeps the result as an immutable
//! snapshot. A refresh builds a complete replacement and swaps it in with
//! a single write, so readers never observe a half-resolved config.
//! Refreshes are serialized; a refresh requested while another one runs
//! is coalesced with the next run.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::parser::ConfigParser;
use crate::config::{locate, Config, ConfigError, View, ViewOptions, Views};
use crate::edit::edit_branch_name;
use crate::git::{Git, GitError, GitRunner};
use crate::output::Notifier;
use crate::resolve::PatternResolver;

/// A parsed and resolved config together with the file it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: Config,
}

/// What a call to [`ConfigLoader::refresh`] did.
#[derive(Debug)]
pub enum RefreshOutcome {
    Loaded { path: PathBuf, views: usize },
    /// No config file in any searched location.
    NotFound,
    /// A config file exists but was discarded.
    Failed(ConfigError),
    /// A refresh that started after this request already completed.
    Coalesced,
}

pub struct ConfigLoader {
    root: PathBuf,
    git: Git,
    git_available: bool,
    parser: Box<dyn ConfigParser>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<Option<Arc<LoadedConfig>>>,
    /// Request number covered by the last completed refresh.
    refresh_gate: tokio::sync::Mutex<u64>,
    requested: AtomicU64,
}

impl ConfigLoader {
    /// Probes git, then performs the first refresh.
    pub async fn new(
        root: PathBuf,
        runner: Arc<dyn GitRunner>,
        parser: Box<dyn ConfigParser>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let git = Git::new(runner, root.clone());
        let git_available = git.probe().await;
        if git_available {
            info!("git is available");
        } else {
            info!("git is not available, branch-aware features are disabled");
        }

        let loader = Self {
            root,
            git,
            git_available,
            parser,
            notifier,
            state: RwLock::new(None),
            refresh_gate: tokio::sync::Mutex::new(0),
            requested: AtomicU64::new(0),
        };
        loader.refresh().await;
        loader
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    pub fn is_git_available(&self) -> bool {
        self.git_available
    }

    /// Discards the current config and rebuilds it from disk.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let mut completed = self.refresh_gate.lock().await;
        if *completed >= ticket {
            debug!(ticket, "refresh coalesced");
            return RefreshOutcome::Coalesced;
        }
        let covers = self.requested.load(Ordering::SeqCst);

        info!("refreshing configuration");
        let (loaded, outcome) = self.load().await;
        self.replace(loaded);
        *completed = covers;
        outcome
    }

    fn replace(&self, loaded: Option<Arc<LoadedConfig>>) {
        match self.state.write() {
            Ok(mut state) => *state = loaded,
            Err(poisoned) => *poisoned.into_inner() = loaded,
        }
    }

    async fn load(&self) -> (Option<Arc<LoadedConfig>>, RefreshOutcome) {
        let Some(path) = locate::locate(&self.root) else {
            self.notifier.info(
                "No configuration file found. Create a .focusedviews.json file in your workspace root.",
            );
            return (None, RefreshOutcome::NotFound);
        };
        info!(path = %path.display(), parser = self.parser.name(), "loading config");
        self.notifier
            .info(&format!("Using configuration file at {}", path.display()));

        let mut config = match self.parser.parse(&path).await {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to load config: {}", e);
                self.notifier
                    .error(&format!("Error parsing configuration file: {}", e));
                return (None, RefreshOutcome::Failed(e));
            }
        };

        let git = self.git_available.then_some(&self.git);
        let resolver = PatternResolver::new(&self.root, git);
        for (id, view) in config.views.iter_mut() {
            let files = resolver
                .resolve_view(id, &view.files, view.git_branch.as_deref())
                .await;
            debug!(view = id, count = files.len(), "resolved files");
            view.files = files;
        }

        let views = config.views.len();
        let loaded = LoadedConfig {
            path: path.clone(),
            config,
        };
        (Some(Arc::new(loaded)), RefreshOutcome::Loaded { path, views })
    }

    /// Snapshot of the current config; `None` when absent or invalid.
    pub fn config(&self) -> Option<Arc<LoadedConfig>> {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.config().map(|loaded| loaded.path.clone())
    }

    /// All views in display order; empty when no config is loaded.
    pub fn views(&self) -> Views {
        self.config()
            .map(|loaded| loaded.config.views.clone())
            .unwrap_or_default()
    }

    pub fn view(&self, view_id: &str) -> Option<View> {
        self.config()
            .and_then(|loaded| loaded.config.views.get(view_id).cloned())
    }

    pub fn files_for_view(&self, view_id: &str) -> Vec<PathBuf> {
        self.view(view_id).map(|v| v.files).unwrap_or_default()
    }

    pub fn view_options(&self, view_id: &str) -> ViewOptions {
        self.view(view_id).map(|v| v.options()).unwrap_or_default()
    }

    pub fn branch_for_view(&self, view_id: &str) -> Option<String> {
        self.view(view_id).and_then(|v| v.git_branch)
    }

    /// `false` only when the view explicitly sets `allowDirectEdits: false`;
    /// unknown views allow edits.
    pub fn are_direct_edits_allowed(&self, view_id: &str) -> bool {
        self.view(view_id)
            .map(|v| v.options().allow_direct_edits())
            .unwrap_or(true)
    }

    /// Id of the first view (in display order) listing exactly `path`.
    pub fn find_view(&self, path: &Path) -> Option<String> {
        let loaded = self.config()?;
        let id = loaded
            .config
            .views
            .iter()
            .find(|(_, view)| view.contains(path))
            .map(|(id, _)| id.to_string());
        id
    }

    /// Checked-out branch, or `None` when git is unavailable or fails.
    pub async fn current_branch(&self) -> Option<String> {
        if !self.git_available {
            return None;
        }
        match self.git.current_branch().await {
            Ok(branch) => Some(branch),
            Err(e) => {
                warn!("error getting current git branch: {}", e);
                None
            }
        }
    }

    /// Whether `path`'s owning view is bound to a branch other than the
    /// checked-out one. Unowned files and views without a branch are not.
    /// An unreadable current branch counts as different.
    pub async fn is_file_from_different_branch(&self, path: &Path) -> bool {
        if !self.git_available {
            return false;
        }
        let Some(view_branch) = self
            .find_view(path)
            .and_then(|id| self.branch_for_view(&id))
        else {
            return false;
        };
        match self.current_branch().await {
            Some(current) => current != view_branch,
            None => true,
        }
    }

    /// Creates and checks out an edit branch for `path` from the view's
    /// branch. `Ok(None)` means not applicable: git is unavailable, or the
    /// view is unknown or has no branch.
    pub async fn create_branch_for_edit(
        &self,
        view_id: &str,
        path: &Path,
    ) -> Result<Option<String>, GitError> {
        self.create_branch_for_edit_at(view_id, path, Utc::now())
            .await
    }

    /// [`Self::create_branch_for_edit`] with an explicit timestamp.
    pub async fn create_branch_for_edit_at(
        &self,
        view_id: &str,
        path: &Path,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, GitError> {
        if !self.git_available {
            return Ok(None);
        }
        let Some(source) = self.branch_for_view(view_id) else {
            return Ok(None);
        };

        let new_branch = edit_branch_name(&source, path, now);
        match self.git.checkout_new_branch(&new_branch, &source).await {
            Ok(()) => {
                info!(branch = %new_branch, source = %source, "created edit branch");
                Ok(Some(new_branch))
            }
            Err(e) => {
                warn!(branch = %new_branch, "error creating branch for edit: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::parser::JsoncParser;
    use crate::git::mock::MockGit;
    use crate::output::recording::{Level, RecordingNotifier};
    use chrono::TimeZone;
    use std::fs;

    pub(crate) const BRANCH_CONFIG: &str = r#"{
        // two views over the same files
        "version": "1.0.0",
        "views": {
            "main": {
                "name": "Main",
                "description": "Main branch files",
                "files": ["src/*.ts", "README.md"],
                "gitBranch": "main",
                "options": { "allowDirectEdits": true }
            },
            "develop": {
                "name": "Dev",
                "description": "Development branch files",
                "files": ["src/*.ts", "README.md"],
                "gitBranch": "develop",
                "options": { "allowDirectEdits": false }
            },
            "docs": {
                "name": "Docs",
                "files": ["*.md"]
            }
        }
    }"#;

    pub(crate) struct Fixture {
        pub dir: tempfile::TempDir,
        pub mock: Arc<MockGit>,
        pub notifier: Arc<RecordingNotifier>,
        pub loader: ConfigLoader,
    }

    impl Fixture {
        pub fn root(&self) -> &Path {
            self.dir.path()
        }
    }

    pub(crate) fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    pub(crate) async fn fixture_with(config: Option<&str>, mock: MockGit) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/main.ts");
        touch(dir.path(), "src/utils.ts");
        touch(dir.path(), "README.md");
        if let Some(config) = config {
            fs::write(dir.path().join(".focusedviews.jsonc"), config).unwrap();
        }
        let mock = Arc::new(mock);
        let notifier = Arc::new(RecordingNotifier::default());
        let loader = ConfigLoader::new(
            dir.path().to_path_buf(),
            mock.clone(),
            Box::new(JsoncParser),
            notifier.clone(),
        )
        .await;
        Fixture {
            dir,
            mock,
            notifier,
            loader,
        }
    }

    pub(crate) async fn fixture() -> Fixture {
        fixture_with(Some(BRANCH_CONFIG), MockGit::new()).await
    }

    #[tokio::test]
    async fn test_resolves_other_branch_from_listing() {
        let fx = fixture().await;
        let root = fx.root();
        assert_eq!(
            fx.loader.files_for_view("develop"),
            vec![
                root.join("src/main.ts"),
                root.join("src/utils.ts"),
                root.join("src/feature.ts"),
                root.join("README.md"),
            ]
        );
        assert!(fx.mock.calls().contains(&(
            root.to_path_buf(),
            vec![
                "ls-tree".to_string(),
                "-r".into(),
                "-z".into(),
                "--name-only".into(),
                "--end-of-options".into(),
                "develop".into()
            ]
        )));
    }

    #[tokio::test]
    async fn test_current_branch_view_uses_working_tree() {
        let fx = fixture().await;
        let root = fx.root();
        let mut files = fx.loader.files_for_view("main");
        files.sort();
        assert_eq!(
            files,
            vec![
                root.join("README.md"),
                root.join("src/main.ts"),
                root.join("src/utils.ts"),
            ]
        );
        assert_eq!(fx.mock.count("ls-tree"), 1);
    }

    #[tokio::test]
    async fn test_without_git_everything_comes_from_working_tree() {
        let fx = fixture_with(Some(BRANCH_CONFIG), MockGit::new().not_a_repo()).await;
        assert!(!fx.loader.is_git_available());
        let mut files = fx.loader.files_for_view("develop");
        files.sort();
        assert_eq!(
            files,
            vec![
                fx.root().join("README.md"),
                fx.root().join("src/main.ts"),
                fx.root().join("src/utils.ts"),
            ]
        );
        assert_eq!(fx.mock.count("ls-tree"), 0);
        assert!(!fx.loader.is_file_from_different_branch(&fx.root().join("src/feature.ts")).await);
    }

    #[tokio::test]
    async fn test_views_keep_display_order() {
        let fx = fixture().await;
        let ids: Vec<String> = fx.loader.views().iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec!["main", "develop", "docs"]);
        assert_eq!(
            fx.loader.config_path(),
            Some(fx.root().join(".focusedviews.jsonc"))
        );
    }

    #[tokio::test]
    async fn test_are_direct_edits_allowed() {
        let fx = fixture().await;
        assert!(fx.loader.are_direct_edits_allowed("main"));
        assert!(!fx.loader.are_direct_edits_allowed("develop"));
        assert!(fx.loader.are_direct_edits_allowed("docs"));
        assert!(fx.loader.are_direct_edits_allowed("nonexistent"));
    }

    #[tokio::test]
    async fn test_find_view_first_match_wins() {
        let fx = fixture().await;
        let root = fx.root();
        assert_eq!(
            fx.loader.find_view(&root.join("src/main.ts")).as_deref(),
            Some("main")
        );
        assert_eq!(
            fx.loader.find_view(&root.join("src/feature.ts")).as_deref(),
            Some("develop")
        );
        assert_eq!(fx.loader.find_view(&root.join("nonexistent.ts")), None);
        assert_eq!(fx.loader.find_view(Path::new("src/main.ts")), None);
    }

    #[tokio::test]
    async fn test_is_file_from_different_branch() {
        let fx = fixture().await;
        let feature = fx.root().join("src/feature.ts");
        assert!(fx.loader.is_file_from_different_branch(&feature).await);

        fx.mock.set_current_branch("develop");
        assert!(!fx.loader.is_file_from_different_branch(&feature).await);

        assert!(
            !fx.loader
                .is_file_from_different_branch(&fx.root().join("nonexistent.ts"))
                .await
        );
    }

    #[tokio::test]
    async fn test_unreadable_current_branch_counts_as_different() {
        let fx = fixture().await;
        fx.mock.set_head_unreadable();
        assert_eq!(fx.loader.current_branch().await, None);
        assert!(
            fx.loader
                .is_file_from_different_branch(&fx.root().join("src/main.ts"))
                .await
        );
        assert!(
            !fx.loader
                .is_file_from_different_branch(&fx.root().join("nonexistent.ts"))
                .await
        );
    }

    #[tokio::test]
    async fn test_view_without_branch_is_never_from_different_branch() {
        let config = r#"{"views": {"docs": {"name": "Docs", "files": ["*.md"]}}}"#;
        let fx = fixture_with(Some(config), MockGit::new()).await;
        let readme = fx.root().join("README.md");
        assert_eq!(fx.loader.find_view(&readme).as_deref(), Some("docs"));
        assert!(!fx.loader.is_file_from_different_branch(&readme).await);
    }

    #[tokio::test]
    async fn test_create_branch_for_edit_at_fixed_instant() {
        let fx = fixture().await;
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let path = Path::new("/ws/src/feature.ts");

        let branch = fx
            .loader
            .create_branch_for_edit_at("develop", path, now)
            .await
            .unwrap();
        let expected = "edit/develop/edit-feature.ts-2025-03-01T12-00-00-000Z";
        assert_eq!(branch.as_deref(), Some(expected));
        assert!(fx.mock.calls().contains(&(
            fx.root().to_path_buf(),
            vec![
                "checkout".to_string(),
                "-b".into(),
                expected.into(),
                "--end-of-options".into(),
                "develop".into()
            ]
        )));
        assert_eq!(fx.loader.current_branch().await.as_deref(), Some(expected));
    }

    #[tokio::test]
    async fn test_create_branch_not_applicable_without_branch() {
        let fx = fixture().await;
        let path = fx.root().join("README.md");
        assert_eq!(fx.loader.create_branch_for_edit("docs", &path).await.unwrap(), None);
        assert_eq!(fx.loader.create_branch_for_edit("missing", &path).await.unwrap(), None);
        assert_eq!(fx.mock.count("checkout"), 0);
    }

    #[tokio::test]
    async fn test_create_branch_failure_is_reported() {
        let fx = fixture().await;
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let path = Path::new("/ws/src/feature.ts");
        fx.loader
            .create_branch_for_edit_at("develop", path, now)
            .await
            .unwrap();
        fx.mock.set_current_branch("main");

        let err = fx
            .loader
            .create_branch_for_edit_at("develop", path, now)
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::Failed { .. }));
        assert_eq!(fx.loader.current_branch().await.as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let fx = fixture().await;
        let first = fx.loader.views();
        fx.loader.refresh().await;
        assert_eq!(fx.loader.views(), first);
    }

    #[tokio::test]
    async fn test_malformed_config_is_discarded_with_one_error() {
        let fx = fixture_with(Some("{ \"views\": { \"a\": "), MockGit::new()).await;
        assert!(fx.loader.config().is_none());
        assert!(fx.loader.views().is_empty());
        assert_eq!(fx.notifier.count(Level::Error), 1);
        let (_, message) = fx
            .notifier
            .messages()
            .into_iter()
            .find(|(level, _)| *level == Level::Error)
            .unwrap();
        assert!(message.starts_with("Error parsing configuration file"));
    }

    #[tokio::test]
    async fn test_refresh_after_config_breaks_drops_old_views() {
        let fx = fixture().await;
        assert!(fx.loader.config().is_some());
        fs::write(fx.root().join(".focusedviews.jsonc"), "{ nope").unwrap();

        let outcome = fx.loader.refresh().await;
        assert!(matches!(outcome, RefreshOutcome::Failed(ConfigError::Parse { .. })));
        assert!(fx.loader.config().is_none());
        assert_eq!(fx.notifier.count(Level::Error), 1);
    }

    #[tokio::test]
    async fn test_missing_config_is_not_an_error() {
        let fx = fixture_with(None, MockGit::new()).await;
        assert!(fx.loader.config().is_none());
        assert_eq!(fx.notifier.count(Level::Error), 0);
        assert_eq!(fx.notifier.count(Level::Info), 1);
        assert!(matches!(fx.loader.refresh().await, RefreshOutcome::NotFound));
        assert_eq!(fx.loader.view_options("any"), ViewOptions::default());
    }

    /// Parses like [`JsoncParser`], but only while the gate is open.
    struct GatedParser {
        open: tokio::sync::watch::Receiver<bool>,
    }

    #[async_trait::async_trait]
    impl ConfigParser for GatedParser {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn parse(&self, path: &Path) -> Result<Config, ConfigError> {
            let mut open = self.open.clone();
            let _ = open.wait_for(|open| *open).await;
            JsoncParser.parse(path).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_coalesce() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/main.ts");
        fs::write(dir.path().join(".focusedviews.jsonc"), BRANCH_CONFIG).unwrap();
        let (gate, open) = tokio::sync::watch::channel(true);
        let loader = ConfigLoader::new(
            dir.path().to_path_buf(),
            Arc::new(MockGit::new()),
            Box::new(GatedParser { open }),
            Arc::new(RecordingNotifier::default()),
        )
        .await;
        assert!(loader.config().is_some());

        // `a` holds the refresh while `b` and `c` queue behind it.
        gate.send_replace(false);
        let (a, b, c, ()) = tokio::join!(loader.refresh(), loader.refresh(), loader.refresh(), async {
            gate.send_replace(true);
        });
        assert!(matches!(a, RefreshOutcome::Loaded { views: 3, .. }));
        assert!(matches!(b, RefreshOutcome::Loaded { views: 3, .. }));
        assert!(matches!(c, RefreshOutcome::Coalesced));
        assert!(loader.config().is_some());
    }
}
