//! Memoized evidence shared by every check of a run
//!
//! Each piece of evidence is fetched at most once per run. The first
//! caller fetches, concurrent callers for the same key block on the same
//! slot, and failures are memoized too so every check sees the same error.

use crate::checker::{CheckError, CheckRequest};
use crate::clients::{BranchRef, CheckRun, Commit, ProviderError, ProviderResult, Release, User};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Kinds of evidence a collector can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EvidenceKind {
    DefaultBranch,
    Branch,
    Releases,
    Commits,
    CheckRuns,
    FileList,
    FileContent,
    Contributors,
    CodeOwners,
    HeadCommit,
    Vulnerabilities,
    Badge,
}

impl std::fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EvidenceKind::DefaultBranch => "default-branch",
            EvidenceKind::Branch => "branch",
            EvidenceKind::Releases => "releases",
            EvidenceKind::Commits => "commits",
            EvidenceKind::CheckRuns => "check-runs",
            EvidenceKind::FileList => "file-list",
            EvidenceKind::FileContent => "file-content",
            EvidenceKind::Contributors => "contributors",
            EvidenceKind::CodeOwners => "code-owners",
            EvidenceKind::HeadCommit => "head-commit",
            EvidenceKind::Vulnerabilities => "vulnerabilities",
            EvidenceKind::Badge => "badge",
        };
        write!(f, "{name}")
    }
}

/// Cache key: evidence kind plus an argument such as a branch name or SHA
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvidenceKey {
    pub kind: EvidenceKind,
    pub arg: String,
}

impl EvidenceKey {
    pub fn new(kind: EvidenceKind) -> Self {
        Self {
            kind,
            arg: String::new(),
        }
    }

    pub fn with_arg(kind: EvidenceKind, arg: impl Into<String>) -> Self {
        Self {
            kind,
            arg: arg.into(),
        }
    }
}

/// One cached value. Clones are cheap.
#[derive(Debug, Clone)]
enum Evidence {
    Branch(Option<BranchRef>),
    Releases(Arc<Vec<Release>>),
    Commits(Arc<Vec<Commit>>),
    CheckRuns(Arc<Vec<CheckRun>>),
    Paths(Arc<Vec<String>>),
    Bytes(Arc<Vec<u8>>),
    Users(Arc<Vec<User>>),
    Text(String),
    Ids(Arc<Vec<String>>),
    MaybeText(Option<String>),
}

type Slot = Arc<OnceLock<Result<Evidence, ProviderError>>>;

/// Thread-safe evidence cache
#[derive(Default)]
pub struct RawResults {
    slots: DashMap<EvidenceKey, Slot>,
    fetches: AtomicUsize,
}

fn mismatch(key: &EvidenceKey) -> CheckError {
    CheckError::UnhandledCase(format!("cached {} evidence has an unexpected shape", key.kind))
}

impl RawResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of provider fetches performed so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn get_or_fetch(
        &self,
        req: &CheckRequest,
        key: EvidenceKey,
        fetch: impl FnOnce() -> ProviderResult<Evidence>,
    ) -> Result<Evidence, CheckError> {
        req.cancel.check()?;

        // Clone the slot out so the fetch runs without holding the shard lock
        let slot: Slot = Arc::clone(&*self.slots.entry(key.clone()).or_default());
        slot.get_or_init(|| {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            debug!("Fetching {} evidence {}", key.kind, key.arg);
            fetch()
        })
        .clone()
        .map_err(CheckError::from)
    }

    pub fn default_branch(&self, req: &CheckRequest) -> Result<BranchRef, CheckError> {
        let key = EvidenceKey::new(EvidenceKind::DefaultBranch);
        match self.get_or_fetch(req, key.clone(), || {
            req.repo.default_branch().map(|b| Evidence::Branch(Some(b)))
        })? {
            Evidence::Branch(Some(branch)) => Ok(branch),
            _ => Err(mismatch(&key)),
        }
    }

    /// A branch by name; `None` when it does not exist
    pub fn branch(&self, req: &CheckRequest, name: &str) -> Result<Option<BranchRef>, CheckError> {
        let key = EvidenceKey::with_arg(EvidenceKind::Branch, name);
        match self.get_or_fetch(req, key.clone(), || req.repo.get_branch(name).map(Evidence::Branch))? {
            Evidence::Branch(branch) => Ok(branch),
            _ => Err(mismatch(&key)),
        }
    }

    pub fn releases(&self, req: &CheckRequest) -> Result<Arc<Vec<Release>>, CheckError> {
        let key = EvidenceKey::new(EvidenceKind::Releases);
        match self.get_or_fetch(req, key.clone(), || {
            req.repo.list_releases().map(|r| Evidence::Releases(Arc::new(r)))
        })? {
            Evidence::Releases(releases) => Ok(releases),
            _ => Err(mismatch(&key)),
        }
    }

    pub fn commits(&self, req: &CheckRequest) -> Result<Arc<Vec<Commit>>, CheckError> {
        let key = EvidenceKey::new(EvidenceKind::Commits);
        match self.get_or_fetch(req, key.clone(), || {
            req.repo.list_commits().map(|c| Evidence::Commits(Arc::new(c)))
        })? {
            Evidence::Commits(commits) => Ok(commits),
            _ => Err(mismatch(&key)),
        }
    }

    pub fn check_runs(&self, req: &CheckRequest, sha: &str) -> Result<Arc<Vec<CheckRun>>, CheckError> {
        let key = EvidenceKey::with_arg(EvidenceKind::CheckRuns, sha);
        match self.get_or_fetch(req, key.clone(), || {
            req.repo
                .list_check_runs_for_ref(sha)
                .map(|r| Evidence::CheckRuns(Arc::new(r)))
        })? {
            Evidence::CheckRuns(runs) => Ok(runs),
            _ => Err(mismatch(&key)),
        }
    }

    /// Every file in the snapshot; callers filter locally
    pub fn files(&self, req: &CheckRequest) -> Result<Arc<Vec<String>>, CheckError> {
        let key = EvidenceKey::new(EvidenceKind::FileList);
        match self.get_or_fetch(req, key.clone(), || {
            req.repo.list_files(&|_| true).map(|f| Evidence::Paths(Arc::new(f)))
        })? {
            Evidence::Paths(paths) => Ok(paths),
            _ => Err(mismatch(&key)),
        }
    }

    /// Files accepted by `predicate`, from the cached listing
    pub fn files_matching(
        &self,
        req: &CheckRequest,
        predicate: impl Fn(&str) -> bool,
    ) -> Result<Vec<String>, CheckError> {
        Ok(self
            .files(req)?
            .iter()
            .filter(|p| predicate(p))
            .cloned()
            .collect())
    }

    /// File content; a missing file is `Ok(None)`
    pub fn file_content(
        &self,
        req: &CheckRequest,
        path: &str,
    ) -> Result<Option<Arc<Vec<u8>>>, CheckError> {
        let key = EvidenceKey::with_arg(EvidenceKind::FileContent, path);
        let fetched = self.get_or_fetch(req, key.clone(), || {
            req.repo
                .get_file_content(path)
                .map(|b| Evidence::Bytes(Arc::new(b)))
        });
        match fetched {
            Ok(Evidence::Bytes(bytes)) => Ok(Some(bytes)),
            Ok(_) => Err(mismatch(&key)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn contributors(&self, req: &CheckRequest) -> Result<Arc<Vec<User>>, CheckError> {
        let key = EvidenceKey::new(EvidenceKind::Contributors);
        match self.get_or_fetch(req, key.clone(), || {
            req.repo.list_contributors().map(|u| Evidence::Users(Arc::new(u)))
        })? {
            Evidence::Users(users) => Ok(users),
            _ => Err(mismatch(&key)),
        }
    }

    pub fn code_owners(&self, req: &CheckRequest) -> Result<Arc<Vec<User>>, CheckError> {
        let key = EvidenceKey::new(EvidenceKind::CodeOwners);
        match self.get_or_fetch(req, key.clone(), || {
            req.repo.list_code_owners().map(|u| Evidence::Users(Arc::new(u)))
        })? {
            Evidence::Users(users) => Ok(users),
            _ => Err(mismatch(&key)),
        }
    }

    pub fn head_commit(&self, req: &CheckRequest) -> Result<String, CheckError> {
        let key = EvidenceKey::new(EvidenceKind::HeadCommit);
        match self.get_or_fetch(req, key.clone(), || req.repo.head_commit().map(Evidence::Text))? {
            Evidence::Text(sha) => Ok(sha),
            _ => Err(mismatch(&key)),
        }
    }

    /// Known vulnerabilities at `sha`; fails when no vulnerability client is configured
    pub fn vulnerabilities(&self, req: &CheckRequest, sha: &str) -> Result<Arc<Vec<String>>, CheckError> {
        let client = req.vulns.as_ref().ok_or(ProviderError::Unsupported {
            operation: "query_by_commit",
            backend: "unconfigured",
        })?;
        let key = EvidenceKey::with_arg(EvidenceKind::Vulnerabilities, sha);
        match self.get_or_fetch(req, key.clone(), || {
            client.query_by_commit(sha).map(|ids| Evidence::Ids(Arc::new(ids)))
        })? {
            Evidence::Ids(ids) => Ok(ids),
            _ => Err(mismatch(&key)),
        }
    }

    /// Best Practices badge level for `repo_url`
    pub fn badge(&self, req: &CheckRequest, repo_url: &str) -> Result<Option<String>, CheckError> {
        let client = req.badges.as_ref().ok_or(ProviderError::Unsupported {
            operation: "badge_level",
            backend: "unconfigured",
        })?;
        let key = EvidenceKey::with_arg(EvidenceKind::Badge, repo_url);
        match self.get_or_fetch(req, key.clone(), || {
            client.badge_level(repo_url).map(Evidence::MaybeText)
        })? {
            Evidence::MaybeText(level) => Ok(level),
            _ => Err(mismatch(&key)),
        }
    }
}
