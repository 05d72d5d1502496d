//! Branch protection scoring
//!
//! Each branch is scored from the criteria below. Criteria that need admin
//! access to observe only count when all of them were observed; otherwise
//! the branch is scored from the universally visible criteria alone.
//! Unobserved criteria are left out of both numerator and denominator.

use super::log_finding;
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, LogMessage, Outcome, INCONCLUSIVE_RESULT_SCORE};
use crate::probes::branch_protection::{
    APPLIES_TO_ADMINS, BLOCKS_DELETE_ON_BRANCHES, BLOCKS_FORCE_PUSHES, BRANCH_KEY,
    BRANCH_PROTECTION_ENABLED, DISMISSES_STALE_REVIEWS, RELEASE_BRANCH_RESOLVED,
    REQUIRES_APPROVERS, REQUIRES_CODE_OWNERS_REVIEW, REQUIRES_LAST_PUSH_APPROVAL,
    REQUIRES_LINEAR_HISTORY, REQUIRES_MULTIPLE_APPROVERS, REQUIRES_UP_TO_DATE_BRANCHES,
    RUNS_STATUS_CHECKS,
};
use crate::scoring::{aggregate_scores, proportional_score, AggregationPolicy};

struct Criterion {
    probe: &'static str,
    points: u32,
    admin_only: bool,
}

const CRITERIA: &[Criterion] = &[
    Criterion { probe: BLOCKS_FORCE_PUSHES, points: 2, admin_only: false },
    Criterion { probe: BLOCKS_DELETE_ON_BRANCHES, points: 2, admin_only: false },
    Criterion { probe: REQUIRES_APPROVERS, points: 3, admin_only: false },
    Criterion { probe: REQUIRES_MULTIPLE_APPROVERS, points: 1, admin_only: false },
    Criterion { probe: REQUIRES_CODE_OWNERS_REVIEW, points: 1, admin_only: false },
    Criterion { probe: DISMISSES_STALE_REVIEWS, points: 2, admin_only: false },
    Criterion { probe: REQUIRES_LINEAR_HISTORY, points: 1, admin_only: false },
    Criterion { probe: APPLIES_TO_ADMINS, points: 3, admin_only: true },
    Criterion { probe: REQUIRES_LAST_PUSH_APPROVAL, points: 1, admin_only: true },
    Criterion { probe: REQUIRES_UP_TO_DATE_BRANCHES, points: 1, admin_only: true },
    Criterion { probe: RUNS_STATUS_CHECKS, points: 2, admin_only: true },
];

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    earned: u32,
    max: u32,
}

impl Tally {
    fn add(&mut self, points: u32, held: bool) {
        self.max += points;
        if held {
            self.earned += points;
        }
    }
}

fn detail_kind(outcome: Outcome) -> DetailKind {
    match outcome {
        Outcome::True => DetailKind::Info,
        Outcome::False => DetailKind::Warn,
        _ => DetailKind::Debug,
    }
}

/// Score one branch, logging a detail per criterion
fn score_branch(branch: &str, findings: &[Finding], dl: &DetailLogger) -> Result<i32, CheckError> {
    let for_branch = |probe: &str| {
        findings
            .iter()
            .find(|f| f.probe == probe && f.value(BRANCH_KEY) == Some(branch))
    };

    let enabled = for_branch(BRANCH_PROTECTION_ENABLED).ok_or_else(|| {
        CheckError::UnhandledCase(format!("no protection status for branch '{branch}'"))
    })?;
    log_finding(dl, detail_kind(enabled.outcome), enabled);

    let mut visible = Tally::default();
    let mut admin = Tally::default();
    let mut admin_complete = true;
    for criterion in CRITERIA {
        let finding = for_branch(criterion.probe).ok_or_else(|| {
            CheckError::UnhandledCase(format!(
                "no '{}' finding for branch '{branch}'",
                criterion.probe
            ))
        })?;
        log_finding(dl, detail_kind(finding.outcome), finding);

        let tally = if criterion.admin_only { &mut admin } else { &mut visible };
        match finding.outcome {
            Outcome::True => tally.add(criterion.points, true),
            Outcome::False => tally.add(criterion.points, false),
            _ if criterion.admin_only => admin_complete = false,
            _ => {}
        }
    }

    if enabled.outcome == Outcome::False {
        return Ok(0);
    }
    if visible.max == 0 && admin.max == 0 {
        dl.debug(LogMessage::new(format!(
            "unable to observe any protection setting on branch '{branch}'"
        )));
        return Ok(INCONCLUSIVE_RESULT_SCORE);
    }
    if admin_complete {
        return Ok(proportional_score(
            visible.earned + admin.earned,
            visible.max + admin.max,
        ));
    }
    dl.debug(LogMessage::new(format!(
        "admin-only settings on branch '{branch}' were not observable, scoring from settings visible without admin access"
    )));
    Ok(proportional_score(visible.earned, visible.max))
}

pub fn evaluate(
    name: &str,
    policy: AggregationPolicy,
    findings: &[Finding],
    dl: &DetailLogger,
) -> Result<CheckResult, CheckError> {
    for f in crate::probes::by_probe(findings, RELEASE_BRANCH_RESOLVED) {
        log_finding(dl, DetailKind::Debug, f);
    }

    let mut branches: Vec<&str> = Vec::new();
    for f in crate::probes::by_probe(findings, BRANCH_PROTECTION_ENABLED) {
        if let Some(branch) = f.value(BRANCH_KEY) {
            if !branches.contains(&branch) {
                branches.push(branch);
            }
        }
    }
    if branches.is_empty() {
        return Ok(CheckResult::inconclusive(name, "no branches found"));
    }

    let scores = branches
        .iter()
        .map(|branch| score_branch(branch, findings, dl))
        .collect::<Result<Vec<_>, _>>()?;
    let score = aggregate_scores(policy, &scores);

    let reason = match score {
        INCONCLUSIVE_RESULT_SCORE => "unable to observe branch protection settings",
        10 => "branch protection is fully enabled on development and all release branches",
        _ => "branch protection is not maximal on development and all release branches",
    };
    Ok(CheckResult::scored(name, score, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{BranchProtectionRule, BranchRef, Tristate};
    use crate::probes::branch_protection::branch_findings;

    fn findings_for(protected: Tristate, rule: BranchProtectionRule) -> Vec<Finding> {
        branch_findings(
            &BranchRef {
                name: "main".to_string(),
                protected,
                rule,
            },
            true,
        )
    }

    fn full_rule() -> BranchProtectionRule {
        BranchProtectionRule {
            allow_force_pushes: Tristate::False,
            allow_deletions: Tristate::False,
            required_approving_review_count: Some(2),
            require_code_owner_reviews: Tristate::True,
            dismiss_stale_reviews: Tristate::True,
            require_last_push_approval: Tristate::True,
            require_linear_history: Tristate::True,
            enforce_admins: Tristate::True,
            require_up_to_date_before_merge: Tristate::True,
            required_status_checks: Some(vec!["ci".to_string()]),
        }
    }

    #[test]
    fn test_all_unknown_is_inconclusive_with_debug() {
        let dl = DetailLogger::new();
        let findings = findings_for(Tristate::True, BranchProtectionRule::default());
        let result = evaluate("Branch-Protection", AggregationPolicy::Minimum, &findings, &dl)
            .expect("evaluate");
        assert_eq!(result.score, -1);
        let details = dl.flush();
        assert!(details.iter().any(|d| d.kind == DetailKind::Debug));
        assert!(!details.iter().any(|d| d.kind == DetailKind::Warn));
    }

    #[test]
    fn test_unprotected_is_zero_with_warnings() {
        let dl = DetailLogger::new();
        let findings = findings_for(Tristate::False, BranchProtectionRule::default());
        let result = evaluate("Branch-Protection", AggregationPolicy::Minimum, &findings, &dl)
            .expect("evaluate");
        assert_eq!(result.score, 0);
        let details = dl.flush();
        assert_eq!(details.iter().filter(|d| d.kind == DetailKind::Warn).count(), 12);
    }

    #[test]
    fn test_full_protection_is_ten() {
        let dl = DetailLogger::new();
        let findings = findings_for(Tristate::True, full_rule());
        let result = evaluate("Branch-Protection", AggregationPolicy::Minimum, &findings, &dl)
            .expect("evaluate");
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_missing_admin_settings_use_visible_tier() {
        let rule = BranchProtectionRule {
            enforce_admins: Tristate::Unknown,
            require_last_push_approval: Tristate::Unknown,
            require_up_to_date_before_merge: Tristate::Unknown,
            required_status_checks: None,
            // 1 of 12 visible points missing
            require_linear_history: Tristate::False,
            ..full_rule()
        };
        let dl = DetailLogger::new();
        let findings = findings_for(Tristate::True, rule);
        let result = evaluate("Branch-Protection", AggregationPolicy::Minimum, &findings, &dl)
            .expect("evaluate");
        // round(11 / 12 * 10)
        assert_eq!(result.score, 9);
        assert!(dl
            .flush()
            .iter()
            .any(|d| d.kind == DetailKind::Debug && d.msg.text.contains("admin-only")));
    }

    #[test]
    fn test_worst_branch_wins_by_default() {
        let mut findings = findings_for(Tristate::True, full_rule());
        findings.extend(branch_findings(
            &BranchRef {
                name: "release/1.x".to_string(),
                protected: Tristate::False,
                rule: BranchProtectionRule::default(),
            },
            true,
        ));

        let dl = DetailLogger::new();
        let min = evaluate("Branch-Protection", AggregationPolicy::Minimum, &findings, &dl)
            .expect("evaluate");
        let mean = evaluate("Branch-Protection", AggregationPolicy::Mean, &findings, &dl)
            .expect("evaluate");
        assert_eq!(min.score, 0);
        assert_eq!(mean.score, 5);
    }

    #[test]
    fn test_same_branch_scores_identically_twice() {
        let rule = BranchProtectionRule {
            enforce_admins: Tristate::Unknown,
            require_linear_history: Tristate::False,
            ..full_rule()
        };
        let branch = BranchRef {
            name: "main".to_string(),
            protected: Tristate::True,
            rule,
        };

        let first = branch_findings(&branch, true);
        let second = branch_findings(&branch, true);
        assert_eq!(first, second);

        let (dl_a, dl_b) = (DetailLogger::new(), DetailLogger::new());
        let a = evaluate("Branch-Protection", AggregationPolicy::Minimum, &first, &dl_a)
            .expect("evaluate");
        let b = evaluate("Branch-Protection", AggregationPolicy::Minimum, &second, &dl_b)
            .expect("evaluate");
        assert_eq!(a.score, b.score);
        assert_eq!(a.reason, b.reason);
        assert_eq!(dl_a.flush(), dl_b.flush());
    }
}
