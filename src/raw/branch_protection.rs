//! Branch protection settings of the default branch and release branches

use crate::checker::{CheckError, CheckRequest};
use crate::clients::BranchRef;
use std::collections::BTreeMap;

/// Name tried when a release targets `master` and no such branch exists
pub const MASTER_FALLBACK: (&str, &str) = ("master", "main");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchProtectionData {
    pub default_branch: Option<BranchRef>,
    /// Branch names release tags were cut from, first-seen order
    pub release_targets: Vec<String>,
    /// Lookup result for every name above, plus the fallback name where tried
    pub lookups: BTreeMap<String, Option<BranchRef>>,
    /// Whether the repository has a CODEOWNERS file with at least one owner
    pub code_owners_present: bool,
}

/// A full hex SHA is a commit, not a branch
fn is_commit_sha(target: &str) -> bool {
    target.len() == 40 && target.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn collect(req: &CheckRequest) -> Result<BranchProtectionData, CheckError> {
    let default_branch = req.raw.default_branch(req)?;

    let mut release_targets: Vec<String> = Vec::new();
    for release in req.raw.releases(req)?.iter() {
        let target = release
            .target_commitish
            .trim()
            .trim_start_matches("refs/heads/");
        if target.is_empty() || is_commit_sha(target) || target == default_branch.name {
            continue;
        }
        if !release_targets.iter().any(|t| t == target) {
            release_targets.push(target.to_string());
        }
    }

    let mut lookups = BTreeMap::new();
    for target in &release_targets {
        let found = req.raw.branch(req, target)?;
        let missing = found.is_none();
        lookups.insert(target.clone(), found);

        let (from, to) = MASTER_FALLBACK;
        if missing && target == from {
            let fallback = if to == default_branch.name {
                Some(default_branch.clone())
            } else {
                req.raw.branch(req, to)?
            };
            lookups.insert(to.to_string(), fallback);
        }
    }

    let code_owners_present = !req.raw.code_owners(req)?.is_empty();

    Ok(BranchProtectionData {
        default_branch: Some(default_branch),
        release_targets,
        lookups,
        code_owners_present,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeRepoClient;
    use crate::clients::{BranchProtectionRule, Release, Tristate};
    use std::sync::Arc;

    fn branch(name: &str) -> BranchRef {
        BranchRef {
            name: name.to_string(),
            protected: Tristate::True,
            rule: BranchProtectionRule::default(),
        }
    }

    fn release(tag: &str, target: &str) -> Release {
        Release {
            tag_name: tag.to_string(),
            target_commitish: target.to_string(),
            url: String::new(),
            assets: Vec::new(),
        }
    }

    #[test]
    fn test_collects_release_targets_with_master_fallback() {
        let repo = FakeRepoClient {
            default_branch: Some(branch("develop")),
            branches: vec![branch("main"), branch("release/1.x")],
            releases: vec![
                release("v2", "master"),
                release("v1.1", "release/1.x"),
                release("v1.0", "0123456789abcdef0123456789abcdef01234567"),
                release("v0.9", "develop"),
            ],
            ..Default::default()
        }
        .with_file("CODEOWNERS", "* @alice\n");
        let req = CheckRequest::new(Arc::new(repo));

        let data = collect(&req).expect("collect");
        assert_eq!(data.release_targets, vec!["master", "release/1.x"]);
        assert_eq!(data.lookups.get("master"), Some(&None));
        assert!(data.lookups.get("main").is_some_and(|b| b.is_some()));
        assert!(data.code_owners_present);
    }

    #[test]
    fn test_master_target_resolves_to_main_default_branch() {
        let repo = FakeRepoClient {
            default_branch: Some(branch("main")),
            releases: vec![release("v1", "master")],
            ..Default::default()
        };
        let req = CheckRequest::new(Arc::new(repo));

        let data = collect(&req).expect("collect");
        assert_eq!(data.release_targets, vec!["master"]);
        assert_eq!(data.lookups.get("main"), Some(&Some(branch("main"))));

        let findings = crate::probes::branch_protection::run(&data);
        let resolved: Vec<_> = findings
            .iter()
            .filter(|f| f.probe == crate::probes::branch_protection::RELEASE_BRANCH_RESOLVED)
            .collect();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].outcome, crate::models::Outcome::True);
        assert_eq!(resolved[0].value("branch"), Some("main"));
        // main is scored once
        let enabled = findings
            .iter()
            .filter(|f| f.probe == crate::probes::branch_protection::BRANCH_PROTECTION_ENABLED)
            .count();
        assert_eq!(enabled, 1);
    }
}
