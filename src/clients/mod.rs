//! Evidence providers
//!
//! Collectors never talk to a hosting platform directly. They go through the
//! [`RepoClient`] capability trait, which every backend implements:
//!
//! - [`GitHubClient`] - GitHub REST API (commit-based access)
//! - [`LocalDirClient`] - a checkout on disk (file-based access only)
//!
//! Two narrower providers answer questions that are not about the
//! repository contents themselves:
//!
//! - [`VulnerabilityClient`] - OSV.dev lookups by commit
//! - [`BadgeClient`] - OpenSSF Best Practices badge level
//!
//! Every method returns plain Rust values or a typed [`ProviderError`];
//! nothing above this layer ever re-parses raw JSON.

mod bestpractices;
mod github;
mod local;
mod osv;

#[cfg(test)]
pub(crate) mod fake;

pub use bestpractices::BestPracticesClient;
pub use github::GitHubClient;
pub use local::LocalDirClient;
pub use osv::OsvClient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How much of a repository a client can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Full API access: history, pull requests, releases, settings
    Commit,
    /// File tree snapshot only (e.g. a local checkout without network)
    FileBased,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessMode::Commit => write!(f, "commit-based"),
            AccessMode::FileBased => write!(f, "file-based"),
        }
    }
}

/// Errors returned by evidence providers.
///
/// `Clone` so a memoized failure can be handed to every check that asked
/// for the same evidence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("failed to parse response from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("operation '{operation}' is not supported by the {backend} client")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ProviderError {
    fn from(e: std::io::Error) -> Self {
        ProviderError::Io(e.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A setting that may not have been observable with the current credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tristate {
    True,
    False,
    #[default]
    Unknown,
}

impl Tristate {
    pub fn is_true(&self) -> bool {
        matches!(self, Tristate::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Tristate::False)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tristate::Unknown)
    }

    /// The negated setting, keeping `Unknown` unknown
    pub fn not(self) -> Self {
        match self {
            Tristate::True => Tristate::False,
            Tristate::False => Tristate::True,
            Tristate::Unknown => Tristate::Unknown,
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        value.map(Tristate::from).unwrap_or(Tristate::Unknown)
    }
}

/// Branch protection settings as far as the client could observe them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BranchProtectionRule {
    pub allow_force_pushes: Tristate,
    pub allow_deletions: Tristate,
    /// `None` when the count is not visible
    pub required_approving_review_count: Option<u32>,
    pub require_code_owner_reviews: Tristate,
    pub dismiss_stale_reviews: Tristate,
    pub require_last_push_approval: Tristate,
    pub require_linear_history: Tristate,
    pub enforce_admins: Tristate,
    /// Branch must be up to date before merging
    pub require_up_to_date_before_merge: Tristate,
    /// `None` when the list is not visible
    pub required_status_checks: Option<Vec<String>>,
}

impl BranchProtectionRule {
    /// Rule for a branch known to be unprotected: every setting is off.
    pub fn unprotected() -> Self {
        Self {
            allow_force_pushes: Tristate::True,
            allow_deletions: Tristate::True,
            required_approving_review_count: Some(0),
            require_code_owner_reviews: Tristate::False,
            dismiss_stale_reviews: Tristate::False,
            require_last_push_approval: Tristate::False,
            require_linear_history: Tristate::False,
            enforce_admins: Tristate::False,
            require_up_to_date_before_merge: Tristate::False,
            required_status_checks: Some(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    pub name: String,
    pub protected: Tristate,
    pub rule: BranchProtectionRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    /// Branch name or commit SHA the tag was cut from
    pub target_commitish: String,
    pub url: String,
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub state: String,
    pub author: Option<String>,
}

/// Pull/merge request a commit landed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub number: u64,
    pub author: Option<String>,
    pub head_sha: String,
    pub merged_by: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author: Option<String>,
    pub committed_at: Option<DateTime<Utc>>,
    pub change_request: Option<ChangeRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
    /// Slug of the app that reported the run (e.g. `github-code-scanning`)
    pub app_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub num_contributions: u32,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub is_bot: bool,
}

pub type VulnerabilityId = String;

/// Capability set every repository backend implements.
///
/// Methods a backend cannot answer return [`ProviderError::Unsupported`].
pub trait RepoClient: Send + Sync {
    /// Display name, e.g. `github.com/owner/repo` or a local path
    fn repo_name(&self) -> &str;

    /// Canonical URL used when asking third parties about this repository
    fn repo_url(&self) -> String {
        format!("https://{}", self.repo_name())
    }

    fn access_mode(&self) -> AccessMode;

    fn default_branch(&self) -> ProviderResult<BranchRef>;

    /// Look up one branch; `Ok(None)` when it does not exist
    fn get_branch(&self, name: &str) -> ProviderResult<Option<BranchRef>>;

    fn list_branches(&self) -> ProviderResult<Vec<BranchRef>>;

    /// Most recent releases first
    fn list_releases(&self) -> ProviderResult<Vec<Release>>;

    /// Recent commits on the default branch, newest first
    fn list_commits(&self) -> ProviderResult<Vec<Commit>>;

    fn list_check_runs_for_ref(&self, sha: &str) -> ProviderResult<Vec<CheckRun>>;

    /// Repository-relative paths accepted by `predicate`
    fn list_files(&self, predicate: &dyn Fn(&str) -> bool) -> ProviderResult<Vec<String>>;

    fn get_file_content(&self, path: &str) -> ProviderResult<Vec<u8>>;

    fn list_contributors(&self) -> ProviderResult<Vec<User>>;

    /// Users and teams named in the CODEOWNERS file
    fn list_code_owners(&self) -> ProviderResult<Vec<User>> {
        for path in CODEOWNERS_PATHS {
            match self.get_file_content(path) {
                Ok(bytes) => return Ok(parse_code_owners(&String::from_utf8_lossy(&bytes))),
                Err(ProviderError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(Vec::new())
    }

    /// SHA of the commit the snapshot was taken from
    fn head_commit(&self) -> ProviderResult<String>;
}

/// Looks up OSV vulnerabilities affecting a commit.
pub trait VulnerabilityClient: Send + Sync {
    fn query_by_commit(&self, sha: &str) -> ProviderResult<Vec<VulnerabilityId>>;
}

/// Looks up a project's OpenSSF Best Practices badge.
pub trait BadgeClient: Send + Sync {
    /// Raw badge level string, `None` when the project has no entry
    fn badge_level(&self, repo_url: &str) -> ProviderResult<Option<String>>;
}

/// Locations GitHub reads CODEOWNERS from, in precedence order
pub const CODEOWNERS_PATHS: &[&str] = &[".github/CODEOWNERS", "CODEOWNERS", "docs/CODEOWNERS"];

/// Extract `@owner` entries from a CODEOWNERS file, first-seen order.
pub fn parse_code_owners(content: &str) -> Vec<User> {
    let mut seen = std::collections::HashSet::new();
    let mut owners = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line.split_whitespace().skip(1) {
            if token.starts_with('#') {
                break;
            }
            let Some(login) = token.strip_prefix('@') else {
                continue;
            };
            if seen.insert(login.to_string()) {
                owners.push(User {
                    login: login.to_string(),
                    num_contributions: 0,
                    company: None,
                    organizations: Vec::new(),
                    is_bot: false,
                });
            }
        }
    }
    owners
}
