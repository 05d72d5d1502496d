use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, SastData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "SAST";

pub struct Sast;

impl CheckPipeline for Sast {
    type Raw = SastData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<SastData, CheckError> {
        raw::sast::collect(req)
    }

    fn probe(&self, raw: &SastData) -> Vec<Finding> {
        probes::sast::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::sast::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project uses static code analysis",
        risk: Risk::Medium,
        supported_modes: &[AccessMode::Commit],
        evidence: &[
            EvidenceKind::Commits,
            EvidenceKind::CheckRuns,
            EvidenceKind::FileList,
            EvidenceKind::FileContent,
        ],
        depends_on: &[],
        check: Arc::new(Sast),
    }
}
