use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, BinaryArtifactData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Binary-Artifacts";

pub struct BinaryArtifacts;

impl CheckPipeline for BinaryArtifacts {
    type Raw = BinaryArtifactData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<BinaryArtifactData, CheckError> {
        raw::binary_artifacts::collect(req)
    }

    fn probe(&self, raw: &BinaryArtifactData) -> Vec<Finding> {
        probes::binary_artifacts::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::binary_artifacts::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project has generated executable (binary) artifacts checked in",
        risk: Risk::High,
        supported_modes: &[AccessMode::Commit, AccessMode::FileBased],
        evidence: &[EvidenceKind::FileList],
        depends_on: &[],
        check: Arc::new(BinaryArtifacts),
    }
}
