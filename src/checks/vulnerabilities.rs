use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, VulnerabilitiesData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Vulnerabilities";

/// Known OSV vulnerabilities affecting the HEAD commit.
///
/// Needs an OSV client on the request; without one the check is inconclusive.
pub struct Vulnerabilities;

impl CheckPipeline for Vulnerabilities {
    type Raw = VulnerabilitiesData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<VulnerabilitiesData, CheckError> {
        raw::vulnerabilities::collect(req)
    }

    fn probe(&self, raw: &VulnerabilitiesData) -> Vec<Finding> {
        probes::vulnerabilities::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::vulnerabilities::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project has open, known unfixed vulnerabilities",
        risk: Risk::High,
        supported_modes: &[AccessMode::Commit, AccessMode::FileBased],
        evidence: &[EvidenceKind::HeadCommit, EvidenceKind::Vulnerabilities],
        depends_on: &[],
        check: Arc::new(Vulnerabilities),
    }
}
