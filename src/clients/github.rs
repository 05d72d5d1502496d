//! GitHub REST API client
//!
//! Sync HTTP via ureq, one agent per client. Branch protection is read from
//! the admin-only protection endpoint first; tokens without admin rights fall
//! back to the rulesets endpoint, which exposes a subset of the settings.
//! Anything neither endpoint shows stays [`Tristate::Unknown`].

use super::{
    AccessMode, BranchProtectionRule, BranchRef, ChangeRequest, CheckRun, Commit, ProviderError,
    ProviderResult, Release, ReleaseAsset, RepoClient, Review, Tristate, User,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Commits inspected by history-based checks
const COMMIT_LOOKBACK: usize = 30;
/// Contributors whose profile and organizations are resolved
const CONTRIBUTOR_LOOKBACK: usize = 30;

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Status codes are mapped to ProviderError below
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

pub struct GitHubClient {
    owner: String,
    name: String,
    display_name: String,
    api_url: String,
    token: Option<String>,
    agent: ureq::Agent,
    default_branch: OnceLock<ProviderResult<String>>,
    tree: OnceLock<ProviderResult<Arc<Vec<String>>>>,
    contents: DashMap<String, Arc<Vec<u8>>>,
}

impl GitHubClient {
    /// Create a client for `owner/name` (a `github.com/` prefix is accepted)
    pub fn new(slug: &str, token: Option<String>) -> ProviderResult<Self> {
        let trimmed = slug
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("github.com/")
            .trim_end_matches('/')
            .trim_end_matches(".git");
        let mut parts = trimmed.splitn(2, '/');
        let (Some(owner), Some(name)) = (parts.next(), parts.next()) else {
            return Err(ProviderError::NotFound(format!(
                "'{slug}' is not an owner/name repository slug"
            )));
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(ProviderError::NotFound(format!(
                "'{slug}' is not an owner/name repository slug"
            )));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            display_name: format!("github.com/{owner}/{name}"),
            api_url: DEFAULT_API_URL.to_string(),
            token,
            agent: make_agent(Duration::from_secs(30)),
            default_branch: OnceLock::new(),
            tree: OnceLock::new(),
            contents: DashMap::new(),
        })
    }

    /// Point the client at a GitHub Enterprise or mock API
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = make_agent(timeout);
        self
    }

    fn repo_path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{}", self.owner, self.name, suffix)
    }

    fn request(&self, path: &str, accept: &str) -> ProviderResult<(u16, ureq::http::Response<ureq::Body>)> {
        let url = format!("{}{}", self.api_url, path);
        debug!("GET {}", url);

        let mut req = self
            .agent
            .get(&url)
            .header("Accept", accept)
            .header("User-Agent", concat!("trustcheck/", env!("CARGO_PKG_VERSION")))
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }

        let response = req.call().map_err(|e| ProviderError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;
        Ok((response.status().as_u16(), response))
    }

    /// GET returning `Ok(None)` on 404
    fn get_optional<T: DeserializeOwned>(&self, path: &str) -> ProviderResult<Option<T>> {
        let (status, response) = self.request(path, "application/vnd.github+json")?;
        if status == 404 {
            return Ok(None);
        }
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(ProviderError::Http {
                status,
                url: path.to_string(),
                message,
            });
        }
        response
            .into_body()
            .read_json::<T>()
            .map(Some)
            .map_err(|e| ProviderError::Parse {
                source_name: path.to_string(),
                message: e.to_string(),
            })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> ProviderResult<T> {
        self.get_optional(path)?
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }

    fn default_branch_name(&self) -> ProviderResult<String> {
        self.default_branch
            .get_or_init(|| {
                let repo: ApiRepository = self.get_json(&self.repo_path(""))?;
                Ok(repo.default_branch)
            })
            .clone()
    }

    /// Protection settings for a branch GitHub reports as protected
    fn protection_rule(&self, branch: &str) -> ProviderResult<BranchProtectionRule> {
        let path = self.repo_path(&format!("/branches/{branch}/protection"));
        let (status, response) = self.request(&path, "application/vnd.github+json")?;
        match status {
            200 => {
                let protection: ApiProtection =
                    response
                        .into_body()
                        .read_json()
                        .map_err(|e| ProviderError::Parse {
                            source_name: path.clone(),
                            message: e.to_string(),
                        })?;
                Ok(protection.into_rule())
            }
            401 | 403 | 404 => {
                debug!(
                    "Branch protection for '{}' needs admin access (HTTP {}), using rulesets",
                    branch, status
                );
                self.ruleset_rule(branch)
            }
            _ => {
                let message = response.into_body().read_to_string().unwrap_or_default();
                Err(ProviderError::Http {
                    status,
                    url: path,
                    message,
                })
            }
        }
    }

    /// Settings visible to any reader through the rulesets endpoint.
    ///
    /// Admin-only settings stay unknown. An empty ruleset list means the
    /// branch is protected by classic rules we cannot read, so every
    /// setting stays unknown.
    fn ruleset_rule(&self, branch: &str) -> ProviderResult<BranchProtectionRule> {
        let rules: Vec<ApiRule> = self
            .get_optional(&self.repo_path(&format!("/rules/branches/{branch}")))?
            .unwrap_or_default();
        if rules.is_empty() {
            return Ok(BranchProtectionRule::default());
        }

        let mut rule = BranchProtectionRule {
            allow_force_pushes: Tristate::True,
            allow_deletions: Tristate::True,
            required_approving_review_count: Some(0),
            require_code_owner_reviews: Tristate::False,
            dismiss_stale_reviews: Tristate::False,
            require_linear_history: Tristate::False,
            ..Default::default()
        };
        for r in rules {
            match r.rule_type.as_str() {
                "non_fast_forward" => rule.allow_force_pushes = Tristate::False,
                "deletion" => rule.allow_deletions = Tristate::False,
                "required_linear_history" => rule.require_linear_history = Tristate::True,
                "pull_request" => {
                    let p = r.parameters.unwrap_or_default();
                    rule.required_approving_review_count =
                        Some(p.required_approving_review_count.unwrap_or(0));
                    rule.require_code_owner_reviews =
                        p.require_code_owner_review.unwrap_or(false).into();
                    rule.dismiss_stale_reviews =
                        p.dismiss_stale_reviews_on_push.unwrap_or(false).into();
                }
                other => debug!("Ignoring ruleset rule '{}'", other),
            }
        }
        Ok(rule)
    }

    fn branch(&self, name: &str) -> ProviderResult<Option<BranchRef>> {
        let Some(api) = self.get_optional::<ApiBranch>(&self.repo_path(&format!("/branches/{name}")))?
        else {
            return Ok(None);
        };
        let rule = if api.protected {
            self.protection_rule(&api.name)?
        } else {
            BranchProtectionRule::unprotected()
        };
        Ok(Some(BranchRef {
            name: api.name,
            protected: api.protected.into(),
            rule,
        }))
    }

    fn file_tree(&self) -> ProviderResult<Arc<Vec<String>>> {
        self.tree
            .get_or_init(|| {
                let branch = self.default_branch_name()?;
                let tree: ApiTree =
                    self.get_json(&self.repo_path(&format!("/git/trees/{branch}?recursive=1")))?;
                if tree.truncated {
                    warn!(
                        "File tree for {} was truncated by the API; some files are not listed",
                        self.display_name
                    );
                }
                Ok(Arc::new(
                    tree.tree
                        .into_iter()
                        .filter(|e| e.entry_type == "blob")
                        .map(|e| e.path)
                        .collect(),
                ))
            })
            .clone()
    }

    fn change_request_for(&self, sha: &str) -> ProviderResult<Option<ChangeRequest>> {
        let pulls: Vec<ApiPull> = self
            .get_optional(&self.repo_path(&format!("/commits/{sha}/pulls")))?
            .unwrap_or_default();
        let Some(pull) = pulls.into_iter().find(|p| p.merged_at.is_some()) else {
            return Ok(None);
        };
        let reviews: Vec<ApiReview> = self
            .get_optional(&self.repo_path(&format!("/pulls/{}/reviews", pull.number)))?
            .unwrap_or_default();

        Ok(Some(ChangeRequest {
            number: pull.number,
            author: pull.user.map(|u| u.login),
            head_sha: pull.head.sha,
            merged_by: pull.merged_by.map(|u| u.login),
            merged_at: pull.merged_at,
            reviews: reviews
                .into_iter()
                .map(|r| Review {
                    state: r.state,
                    author: r.user.map(|u| u.login),
                })
                .collect(),
        }))
    }
}

impl RepoClient for GitHubClient {
    fn repo_name(&self) -> &str {
        &self.display_name
    }

    fn access_mode(&self) -> AccessMode {
        AccessMode::Commit
    }

    fn default_branch(&self) -> ProviderResult<BranchRef> {
        let name = self.default_branch_name()?;
        self.branch(&name)?
            .ok_or_else(|| ProviderError::NotFound(format!("default branch '{name}'")))
    }

    fn get_branch(&self, name: &str) -> ProviderResult<Option<BranchRef>> {
        self.branch(name)
    }

    fn list_branches(&self) -> ProviderResult<Vec<BranchRef>> {
        let branches: Vec<ApiBranch> = self.get_json(&self.repo_path("/branches?per_page=100"))?;
        Ok(branches
            .into_iter()
            .map(|b| BranchRef {
                name: b.name,
                protected: b.protected.into(),
                rule: BranchProtectionRule::default(),
            })
            .collect())
    }

    fn list_releases(&self) -> ProviderResult<Vec<Release>> {
        let releases: Vec<ApiRelease> = self.get_json(&self.repo_path("/releases?per_page=30"))?;
        Ok(releases
            .into_iter()
            .map(|r| Release {
                tag_name: r.tag_name,
                target_commitish: r.target_commitish,
                url: r.html_url,
                assets: r
                    .assets
                    .into_iter()
                    .map(|a| ReleaseAsset {
                        name: a.name,
                        url: a.browser_download_url,
                    })
                    .collect(),
            })
            .collect())
    }

    fn list_commits(&self) -> ProviderResult<Vec<Commit>> {
        let branch = self.default_branch_name()?;
        let commits: Vec<ApiCommit> = self.get_json(&self.repo_path(&format!(
            "/commits?sha={branch}&per_page={COMMIT_LOOKBACK}"
        )))?;

        let mut out = Vec::with_capacity(commits.len());
        for c in commits {
            let change_request = self.change_request_for(&c.sha)?;
            out.push(Commit {
                message: c.commit.message,
                committed_at: c.commit.committer.and_then(|a| a.date),
                author: c.author.map(|u| u.login),
                change_request,
                sha: c.sha,
            });
        }
        Ok(out)
    }

    fn list_check_runs_for_ref(&self, sha: &str) -> ProviderResult<Vec<CheckRun>> {
        let runs: ApiCheckRuns =
            self.get_json(&self.repo_path(&format!("/commits/{sha}/check-runs?per_page=100")))?;
        Ok(runs
            .check_runs
            .into_iter()
            .map(|r| CheckRun {
                name: r.name,
                status: r.status,
                conclusion: r.conclusion,
                app_slug: r.app.map(|a| a.slug),
            })
            .collect())
    }

    fn list_files(&self, predicate: &dyn Fn(&str) -> bool) -> ProviderResult<Vec<String>> {
        Ok(self
            .file_tree()?
            .iter()
            .filter(|p| predicate(p))
            .cloned()
            .collect())
    }

    fn get_file_content(&self, path: &str) -> ProviderResult<Vec<u8>> {
        if let Some(content) = self.contents.get(path) {
            return Ok(content.as_ref().clone());
        }

        let api_path = self.repo_path(&format!("/contents/{path}"));
        let (status, response) = self.request(&api_path, "application/vnd.github.raw")?;
        if status == 404 {
            return Err(ProviderError::NotFound(path.to_string()));
        }
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(ProviderError::Http {
                status,
                url: api_path,
                message,
            });
        }
        let bytes = response
            .into_body()
            .read_to_vec()
            .map_err(|e| ProviderError::Transport {
                url: api_path,
                message: e.to_string(),
            })?;
        self.contents
            .insert(path.to_string(), Arc::new(bytes.clone()));
        Ok(bytes)
    }

    fn list_contributors(&self) -> ProviderResult<Vec<User>> {
        let contributors: Vec<ApiContributor> =
            self.get_json(&self.repo_path("/contributors?per_page=100"))?;

        let mut users = Vec::new();
        for c in contributors.into_iter().take(CONTRIBUTOR_LOOKBACK) {
            let is_bot = c.user_type.as_deref() == Some("Bot");
            let (company, organizations) = if is_bot {
                (None, Vec::new())
            } else {
                let profile: Option<ApiUserProfile> =
                    self.get_optional(&format!("/users/{}", c.login))?;
                let orgs: Vec<ApiOrg> = self
                    .get_optional(&format!("/users/{}/orgs", c.login))?
                    .unwrap_or_default();
                (
                    profile.and_then(|p| p.company),
                    orgs.into_iter().map(|o| o.login).collect(),
                )
            };
            users.push(User {
                login: c.login,
                num_contributions: c.contributions,
                company,
                organizations,
                is_bot,
            });
        }
        Ok(users)
    }

    fn head_commit(&self) -> ProviderResult<String> {
        let branch = self.default_branch_name()?;
        let commit: ApiCommitRef = self.get_json(&self.repo_path(&format!("/commits/{branch}")))?;
        Ok(commit.sha)
    }
}

// GitHub REST API types

#[derive(Deserialize)]
struct ApiRepository {
    default_branch: String,
}

#[derive(Deserialize)]
struct ApiBranch {
    name: String,
    #[serde(default)]
    protected: bool,
}

#[derive(Deserialize, Default)]
struct ApiEnabled {
    #[serde(default)]
    enabled: bool,
}

#[derive(Deserialize)]
struct ApiStatusChecks {
    #[serde(default)]
    strict: bool,
    #[serde(default)]
    contexts: Vec<String>,
}

#[derive(Deserialize)]
struct ApiPullRequestReviews {
    #[serde(default)]
    dismiss_stale_reviews: bool,
    #[serde(default)]
    require_code_owner_reviews: bool,
    #[serde(default)]
    required_approving_review_count: u32,
    #[serde(default)]
    require_last_push_approval: bool,
}

#[derive(Deserialize)]
struct ApiProtection {
    required_status_checks: Option<ApiStatusChecks>,
    enforce_admins: Option<ApiEnabled>,
    required_pull_request_reviews: Option<ApiPullRequestReviews>,
    required_linear_history: Option<ApiEnabled>,
    allow_force_pushes: Option<ApiEnabled>,
    allow_deletions: Option<ApiEnabled>,
}

impl ApiProtection {
    fn into_rule(self) -> BranchProtectionRule {
        let enabled = |v: Option<ApiEnabled>| Tristate::from(v.map(|e| e.enabled).unwrap_or(false));
        let reviews = self.required_pull_request_reviews;
        let checks = self.required_status_checks;
        BranchProtectionRule {
            allow_force_pushes: enabled(self.allow_force_pushes),
            allow_deletions: enabled(self.allow_deletions),
            required_approving_review_count: Some(
                reviews
                    .as_ref()
                    .map(|r| r.required_approving_review_count)
                    .unwrap_or(0),
            ),
            require_code_owner_reviews: reviews
                .as_ref()
                .map(|r| r.require_code_owner_reviews)
                .unwrap_or(false)
                .into(),
            dismiss_stale_reviews: reviews
                .as_ref()
                .map(|r| r.dismiss_stale_reviews)
                .unwrap_or(false)
                .into(),
            require_last_push_approval: reviews
                .as_ref()
                .map(|r| r.require_last_push_approval)
                .unwrap_or(false)
                .into(),
            require_linear_history: enabled(self.required_linear_history),
            enforce_admins: enabled(self.enforce_admins),
            require_up_to_date_before_merge: checks.as_ref().map(|c| c.strict).unwrap_or(false).into(),
            required_status_checks: Some(checks.map(|c| c.contexts).unwrap_or_default()),
        }
    }
}

#[derive(Deserialize, Default)]
struct ApiRuleParameters {
    required_approving_review_count: Option<u32>,
    require_code_owner_review: Option<bool>,
    dismiss_stale_reviews_on_push: Option<bool>,
}

#[derive(Deserialize)]
struct ApiRule {
    #[serde(rename = "type")]
    rule_type: String,
    parameters: Option<ApiRuleParameters>,
}

#[derive(Deserialize)]
struct ApiAsset {
    name: String,
    #[serde(default)]
    browser_download_url: String,
}

#[derive(Deserialize)]
struct ApiRelease {
    tag_name: String,
    #[serde(default)]
    target_commitish: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    assets: Vec<ApiAsset>,
}

#[derive(Deserialize)]
struct ApiLogin {
    login: String,
}

#[derive(Deserialize)]
struct ApiGitSignature {
    date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ApiCommitDetail {
    message: String,
    committer: Option<ApiGitSignature>,
}

#[derive(Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
    author: Option<ApiLogin>,
}

#[derive(Deserialize)]
struct ApiCommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct ApiHead {
    sha: String,
}

#[derive(Deserialize)]
struct ApiPull {
    number: u64,
    user: Option<ApiLogin>,
    head: ApiHead,
    merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    merged_by: Option<ApiLogin>,
}

#[derive(Deserialize)]
struct ApiReview {
    state: String,
    user: Option<ApiLogin>,
}

#[derive(Deserialize)]
struct ApiApp {
    slug: String,
}

#[derive(Deserialize)]
struct ApiCheckRun {
    name: String,
    status: String,
    conclusion: Option<String>,
    app: Option<ApiApp>,
}

#[derive(Deserialize)]
struct ApiCheckRuns {
    #[serde(default)]
    check_runs: Vec<ApiCheckRun>,
}

#[derive(Deserialize)]
struct ApiTreeEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
}

#[derive(Deserialize)]
struct ApiTree {
    #[serde(default)]
    tree: Vec<ApiTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct ApiContributor {
    login: String,
    #[serde(default)]
    contributions: u32,
    #[serde(rename = "type")]
    user_type: Option<String>,
}

#[derive(Deserialize)]
struct ApiUserProfile {
    company: Option<String>,
}

#[derive(Deserialize)]
struct ApiOrg {
    login: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_parsing() {
        let client = GitHubClient::new("https://github.com/ossf/scorecard.git", None)
            .expect("valid slug");
        assert_eq!(client.repo_name(), "github.com/ossf/scorecard");
        assert_eq!(client.repo_url(), "https://github.com/ossf/scorecard");
        assert_eq!(client.access_mode(), AccessMode::Commit);

        assert!(GitHubClient::new("just-a-name", None).is_err());
        assert!(GitHubClient::new("a/b/c", None).is_err());
    }

    #[test]
    fn test_classic_protection_mapping() {
        let json = r#"{
            "required_status_checks": {"strict": true, "contexts": ["ci/test"]},
            "enforce_admins": {"enabled": true},
            "required_pull_request_reviews": {
                "dismiss_stale_reviews": true,
                "require_code_owner_reviews": false,
                "required_approving_review_count": 2
            },
            "allow_force_pushes": {"enabled": false},
            "allow_deletions": {"enabled": false}
        }"#;
        let protection: ApiProtection = serde_json::from_str(json).expect("parse protection");
        let rule = protection.into_rule();

        assert_eq!(rule.allow_force_pushes, Tristate::False);
        assert_eq!(rule.allow_deletions, Tristate::False);
        assert_eq!(rule.required_approving_review_count, Some(2));
        assert_eq!(rule.dismiss_stale_reviews, Tristate::True);
        assert_eq!(rule.require_code_owner_reviews, Tristate::False);
        assert_eq!(rule.require_linear_history, Tristate::False);
        assert_eq!(rule.enforce_admins, Tristate::True);
        assert_eq!(rule.require_up_to_date_before_merge, Tristate::True);
        assert_eq!(rule.required_status_checks, Some(vec!["ci/test".to_string()]));
    }

    #[test]
    fn test_protection_without_reviews_means_no_reviews() {
        let protection: ApiProtection = serde_json::from_str("{}").expect("parse protection");
        let rule = protection.into_rule();
        assert_eq!(rule.required_approving_review_count, Some(0));
        assert_eq!(rule.enforce_admins, Tristate::False);
        assert_eq!(rule.required_status_checks, Some(Vec::new()));
    }
}
