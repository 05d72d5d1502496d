use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, SignedReleaseData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Signed-Releases";

pub struct SignedReleases;

impl CheckPipeline for SignedReleases {
    type Raw = SignedReleaseData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<SignedReleaseData, CheckError> {
        raw::signed_releases::collect(req)
    }

    fn probe(&self, raw: &SignedReleaseData) -> Vec<Finding> {
        probes::signed_releases::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::signed_releases::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project cryptographically signs release artifacts",
        risk: Risk::High,
        supported_modes: &[AccessMode::Commit],
        evidence: &[EvidenceKind::Releases],
        depends_on: &[],
        check: Arc::new(SignedReleases),
    }
}
