//! In-memory clients for unit tests

use super::{
    AccessMode, BadgeClient, BranchRef, CheckRun, Commit, ProviderError, ProviderResult, Release,
    RepoClient, User, VulnerabilityClient, VulnerabilityId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Canned repository. Every list method counts its calls so tests can
/// assert on memoization.
pub struct FakeRepoClient {
    pub name: String,
    pub mode: AccessMode,
    pub default_branch: Option<BranchRef>,
    pub branches: Vec<BranchRef>,
    pub releases: Vec<Release>,
    pub commits: Vec<Commit>,
    pub check_runs: HashMap<String, Vec<CheckRun>>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub contributors: Vec<User>,
    pub head: Option<String>,
    /// Makes `list_commits` fail with this error
    pub commits_error: Option<ProviderError>,
    pub commit_calls: AtomicUsize,
    pub file_list_calls: AtomicUsize,
    pub release_calls: AtomicUsize,
}

impl Default for FakeRepoClient {
    fn default() -> Self {
        Self {
            name: "github.com/acme/widget".to_string(),
            mode: AccessMode::Commit,
            default_branch: None,
            branches: Vec::new(),
            releases: Vec::new(),
            commits: Vec::new(),
            check_runs: HashMap::new(),
            files: BTreeMap::new(),
            contributors: Vec::new(),
            head: Some("0123456789abcdef0123456789abcdef01234567".to_string()),
            commits_error: None,
            commit_calls: AtomicUsize::new(0),
            file_list_calls: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeRepoClient {
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.as_bytes().to_vec());
        self
    }

    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }
}

impl RepoClient for FakeRepoClient {
    fn repo_name(&self) -> &str {
        &self.name
    }

    fn access_mode(&self) -> AccessMode {
        self.mode
    }

    fn default_branch(&self) -> ProviderResult<BranchRef> {
        self.default_branch
            .clone()
            .ok_or_else(|| ProviderError::NotFound("default branch".to_string()))
    }

    fn get_branch(&self, name: &str) -> ProviderResult<Option<BranchRef>> {
        Ok(self
            .default_branch
            .iter()
            .chain(self.branches.iter())
            .find(|b| b.name == name)
            .cloned())
    }

    fn list_branches(&self) -> ProviderResult<Vec<BranchRef>> {
        Ok(self.branches.clone())
    }

    fn list_releases(&self) -> ProviderResult<Vec<Release>> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.releases.clone())
    }

    fn list_commits(&self) -> ProviderResult<Vec<Commit>> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.commits_error {
            return Err(err.clone());
        }
        Ok(self.commits.clone())
    }

    fn list_check_runs_for_ref(&self, sha: &str) -> ProviderResult<Vec<CheckRun>> {
        Ok(self.check_runs.get(sha).cloned().unwrap_or_default())
    }

    fn list_files(&self, predicate: &dyn Fn(&str) -> bool) -> ProviderResult<Vec<String>> {
        self.file_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.files.keys().filter(|p| predicate(p)).cloned().collect())
    }

    fn get_file_content(&self, path: &str) -> ProviderResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }

    fn list_contributors(&self) -> ProviderResult<Vec<User>> {
        Ok(self.contributors.clone())
    }

    fn head_commit(&self) -> ProviderResult<String> {
        self.head
            .clone()
            .ok_or_else(|| ProviderError::NotFound("HEAD".to_string()))
    }
}

#[derive(Default)]
pub struct FakeVulnerabilityClient {
    pub by_commit: HashMap<String, Vec<VulnerabilityId>>,
}

impl VulnerabilityClient for FakeVulnerabilityClient {
    fn query_by_commit(&self, sha: &str) -> ProviderResult<Vec<VulnerabilityId>> {
        Ok(self.by_commit.get(sha).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeBadgeClient {
    pub level: Option<String>,
}

impl BadgeClient for FakeBadgeClient {
    fn badge_level(&self, _repo_url: &str) -> ProviderResult<Option<String>> {
        Ok(self.level.clone())
    }
}
