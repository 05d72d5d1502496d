//! Local checkout backend
//!
//! Serves the file tree of a directory on disk. History, releases and
//! settings live on the hosting platform, so those methods are
//! unsupported and checks needing them are skipped in file-based mode.

use super::{
    AccessMode, BranchRef, CheckRun, Commit, ProviderError, ProviderResult, Release, RepoClient,
    User,
};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

const BACKEND: &str = "local";

pub struct LocalDirClient {
    root: PathBuf,
    display_name: String,
    files: OnceLock<Vec<String>>,
}

impl LocalDirClient {
    pub fn new(root: impl AsRef<Path>) -> ProviderResult<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|e| {
            ProviderError::NotFound(format!("{}: {}", root.display(), e))
        })?;
        if !root.is_dir() {
            return Err(ProviderError::NotFound(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            display_name: root.display().to_string(),
            root,
            files: OnceLock::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every file under the root, relative and `/`-separated.
    ///
    /// Hidden files are included (`.github/` holds workflows) but `.git/`
    /// and anything ignored by `.gitignore` is not.
    fn all_files(&self) -> &[String] {
        self.files.get_or_init(|| {
            let mut builder = WalkBuilder::new(&self.root);
            builder
                .hidden(false)
                .git_ignore(true)
                .git_global(false)
                .git_exclude(true)
                .require_git(false)
                .filter_entry(|e| e.file_name() != ".git");

            let mut files: Vec<String> = builder
                .build()
                .flatten()
                .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
                .filter_map(|e| {
                    e.path()
                        .strip_prefix(&self.root)
                        .ok()
                        .map(|p| p.to_string_lossy().replace('\\', "/"))
                })
                .collect();
            files.sort();
            debug!("Indexed {} files under {}", files.len(), self.display_name);
            files
        })
    }

    /// Resolve a repository-relative path, refusing to leave the root
    fn resolve(&self, path: &str) -> ProviderResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ProviderError::NotFound(format!(
                "{path} is outside the repository"
            )));
        }
        Ok(self.root.join(relative))
    }

    fn unsupported<T>(operation: &'static str) -> ProviderResult<T> {
        Err(ProviderError::Unsupported {
            operation,
            backend: BACKEND,
        })
    }
}

impl RepoClient for LocalDirClient {
    fn repo_name(&self) -> &str {
        &self.display_name
    }

    fn repo_url(&self) -> String {
        format!("file://{}", self.display_name)
    }

    fn access_mode(&self) -> AccessMode {
        AccessMode::FileBased
    }

    fn default_branch(&self) -> ProviderResult<BranchRef> {
        Self::unsupported("default_branch")
    }

    fn get_branch(&self, _name: &str) -> ProviderResult<Option<BranchRef>> {
        Self::unsupported("get_branch")
    }

    fn list_branches(&self) -> ProviderResult<Vec<BranchRef>> {
        Self::unsupported("list_branches")
    }

    fn list_releases(&self) -> ProviderResult<Vec<Release>> {
        Self::unsupported("list_releases")
    }

    fn list_commits(&self) -> ProviderResult<Vec<Commit>> {
        Self::unsupported("list_commits")
    }

    fn list_check_runs_for_ref(&self, _sha: &str) -> ProviderResult<Vec<CheckRun>> {
        Self::unsupported("list_check_runs_for_ref")
    }

    fn list_files(&self, predicate: &dyn Fn(&str) -> bool) -> ProviderResult<Vec<String>> {
        Ok(self
            .all_files()
            .iter()
            .filter(|p| predicate(p))
            .cloned()
            .collect())
    }

    fn get_file_content(&self, path: &str) -> ProviderResult<Vec<u8>> {
        let full = self.resolve(path)?;
        match std::fs::read(&full) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ProviderError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_contributors(&self) -> ProviderResult<Vec<User>> {
        Self::unsupported("list_contributors")
    }

    fn head_commit(&self) -> ProviderResult<String> {
        let repo = git2::Repository::discover(&self.root).map_err(|e| {
            ProviderError::NotFound(format!("git repository at {}: {}", self.display_name, e))
        })?;
        let head = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| ProviderError::NotFound(format!("HEAD commit: {}", e)))?;
        Ok(head.id().to_string())
    }
}
