use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, PackagingData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Packaging";

pub struct Packaging;

impl CheckPipeline for Packaging {
    type Raw = PackagingData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<PackagingData, CheckError> {
        raw::packaging::collect(req)
    }

    fn probe(&self, raw: &PackagingData) -> Vec<Finding> {
        probes::packaging::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::packaging::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project is published as a package built by an automated workflow",
        risk: Risk::Medium,
        supported_modes: &[AccessMode::Commit, AccessMode::FileBased],
        evidence: &[EvidenceKind::FileList, EvidenceKind::FileContent],
        depends_on: &[],
        check: Arc::new(Packaging),
    }
}
