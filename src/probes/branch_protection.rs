//! Branch protection probes
//!
//! Every per-branch finding carries the branch name in its `branch` value.

use super::tristate_finding;
use crate::clients::{BranchProtectionRule, BranchRef, Tristate};
use crate::models::{Finding, Outcome};
use crate::raw::branch_protection::MASTER_FALLBACK;
use crate::raw::BranchProtectionData;

pub const BRANCH_PROTECTION_ENABLED: &str = "branchProtectionEnabled";
pub const RELEASE_BRANCH_RESOLVED: &str = "releaseBranchResolved";
pub const BLOCKS_FORCE_PUSHES: &str = "blocksForcePushes";
pub const BLOCKS_DELETE_ON_BRANCHES: &str = "blocksDeleteOnBranches";
pub const REQUIRES_APPROVERS: &str = "requiresApproversForPullRequests";
pub const REQUIRES_MULTIPLE_APPROVERS: &str = "requiresMultipleApprovers";
pub const REQUIRES_CODE_OWNERS_REVIEW: &str = "requiresCodeOwnersReview";
pub const DISMISSES_STALE_REVIEWS: &str = "dismissesStaleReviews";
pub const REQUIRES_LINEAR_HISTORY: &str = "requiresLinearHistory";
pub const APPLIES_TO_ADMINS: &str = "branchProtectionAppliesToAdmins";
pub const REQUIRES_LAST_PUSH_APPROVAL: &str = "requiresLastPushApproval";
pub const REQUIRES_UP_TO_DATE_BRANCHES: &str = "requiresUpToDateBranches";
pub const RUNS_STATUS_CHECKS: &str = "runsStatusChecksBeforeMerging";

/// Value key naming the branch a finding is about
pub const BRANCH_KEY: &str = "branch";

/// Resolve release targets to branches. A missing `master` falls back to
/// `main` exactly once; other missing targets stay unresolved.
pub fn resolve_release_branches(data: &BranchProtectionData) -> (Vec<BranchRef>, Vec<Finding>) {
    let mut branches = Vec::new();
    let mut findings = Vec::new();

    for target in &data.release_targets {
        let found = data.lookups.get(target).cloned().flatten();
        let (resolved, message) = match found {
            Some(branch) => {
                let msg = format!("release branch '{}' found", target);
                (Some(branch), msg)
            }
            None if target == MASTER_FALLBACK.0 => {
                match data.lookups.get(MASTER_FALLBACK.1).cloned().flatten() {
                    Some(branch) => {
                        let msg = format!(
                            "release branch '{}' not found, using '{}'",
                            target, MASTER_FALLBACK.1
                        );
                        (Some(branch), msg)
                    }
                    None => (None, format!("release branch '{}' not found", target)),
                }
            }
            None => (None, format!("release branch '{}' not found", target)),
        };

        let outcome = if resolved.is_some() {
            Outcome::True
        } else {
            Outcome::NotAvailable
        };
        let mut finding = Finding::new(RELEASE_BRANCH_RESOLVED, outcome, message)
            .with_value("target", target.as_str());
        if let Some(branch) = resolved {
            finding = finding.with_value(BRANCH_KEY, branch.name.as_str());
            if !branches.iter().any(|b: &BranchRef| b.name == branch.name) {
                branches.push(branch);
            }
        }
        findings.push(finding);
    }

    (branches, findings)
}

fn setting(
    probe: &str,
    branch: &str,
    value: Tristate,
    name: &str,
) -> Finding {
    tristate_finding(
        probe,
        value,
        format!("'{name}' is enabled on branch '{branch}'"),
        format!("'{name}' is disabled on branch '{branch}'"),
        format!("unable to observe '{name}' on branch '{branch}'"),
    )
    .with_value(BRANCH_KEY, branch)
}

fn count_at_least(count: Option<u32>, min: u32) -> Tristate {
    count.map(|n| n >= min).into()
}

/// Per-branch settings findings
pub fn branch_findings(branch: &BranchRef, code_owners_present: bool) -> Vec<Finding> {
    let name = branch.name.as_str();
    let mut findings = vec![tristate_finding(
        BRANCH_PROTECTION_ENABLED,
        branch.protected,
        format!("branch protection is enabled on branch '{name}'"),
        format!("branch protection is not enabled on branch '{name}'"),
        format!("unable to observe whether branch '{name}' is protected"),
    )
    .with_value(BRANCH_KEY, name)];

    // An unprotected branch has every protection off, whatever the client reported
    let unprotected;
    let rule = if branch.protected.is_false() {
        unprotected = BranchProtectionRule::unprotected();
        &unprotected
    } else {
        &branch.rule
    };

    let code_owners = match rule.require_code_owner_reviews {
        Tristate::True if !code_owners_present => Tristate::False,
        other => other,
    };
    let status_checks = rule
        .required_status_checks
        .as_ref()
        .map(|checks| !checks.is_empty())
        .into();

    findings.extend([
        setting(BLOCKS_FORCE_PUSHES, name, rule.allow_force_pushes.not(), "force push protection"),
        setting(BLOCKS_DELETE_ON_BRANCHES, name, rule.allow_deletions.not(), "branch deletion protection"),
        setting(
            REQUIRES_APPROVERS,
            name,
            count_at_least(rule.required_approving_review_count, 1),
            "required approving review",
        ),
        setting(
            REQUIRES_MULTIPLE_APPROVERS,
            name,
            count_at_least(rule.required_approving_review_count, 2),
            "two or more required approving reviews",
        ),
        setting(REQUIRES_CODE_OWNERS_REVIEW, name, code_owners, "code owner review"),
        setting(DISMISSES_STALE_REVIEWS, name, rule.dismiss_stale_reviews, "stale review dismissal"),
        setting(REQUIRES_LINEAR_HISTORY, name, rule.require_linear_history, "linear history"),
        setting(APPLIES_TO_ADMINS, name, rule.enforce_admins, "protection for administrators"),
        setting(
            REQUIRES_LAST_PUSH_APPROVAL,
            name,
            rule.require_last_push_approval,
            "last push approval",
        ),
        setting(
            REQUIRES_UP_TO_DATE_BRANCHES,
            name,
            rule.require_up_to_date_before_merge,
            "up-to-date branch requirement",
        ),
        setting(RUNS_STATUS_CHECKS, name, status_checks, "required status checks"),
    ]);

    if let Some(count) = rule.required_approving_review_count {
        for f in findings.iter_mut().filter(|f| {
            f.probe == REQUIRES_APPROVERS || f.probe == REQUIRES_MULTIPLE_APPROVERS
        }) {
            f.values.insert("count".to_string(), count.to_string());
        }
    }
    if code_owners.is_false() && rule.require_code_owner_reviews.is_true() {
        for f in findings.iter_mut().filter(|f| f.probe == REQUIRES_CODE_OWNERS_REVIEW) {
            f.message = format!(
                "'code owner review' is required on branch '{name}' but no CODEOWNERS file exists"
            );
        }
    }

    findings
}

pub fn run(data: &BranchProtectionData) -> Vec<Finding> {
    let (release_branches, mut findings) = resolve_release_branches(data);

    let mut branches: Vec<&BranchRef> = Vec::new();
    if let Some(default) = &data.default_branch {
        branches.push(default);
    }
    for branch in &release_branches {
        if !branches.iter().any(|b| b.name == branch.name) {
            branches.push(branch);
        }
    }

    for branch in branches {
        findings.extend(branch_findings(branch, data.code_owners_present));
    }
    findings
}
