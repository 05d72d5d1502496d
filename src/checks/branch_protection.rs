use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, BranchProtectionData, EvidenceKind};
use crate::scoring::{AggregationPolicy, Risk};
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Branch-Protection";

/// Branch protection on the default branch and every release branch.
///
/// Per-branch scores are folded with `policy`; the default keeps the worst.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchProtection {
    pub policy: AggregationPolicy,
}

impl CheckPipeline for BranchProtection {
    type Raw = BranchProtectionData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<BranchProtectionData, CheckError> {
        raw::branch_protection::collect(req)
    }

    fn probe(&self, raw: &BranchProtectionData) -> Vec<Finding> {
        probes::branch_protection::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::branch_protection::evaluate(NAME, self.policy, findings, dl)
    }
}

pub fn registration(policy: AggregationPolicy) -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the default and release branches are protected",
        risk: Risk::High,
        supported_modes: &[AccessMode::Commit],
        evidence: &[
            EvidenceKind::DefaultBranch,
            EvidenceKind::Releases,
            EvidenceKind::Branch,
            EvidenceKind::CodeOwners,
        ],
        depends_on: &[],
        check: Arc::new(BranchProtection { policy }),
    }
}
