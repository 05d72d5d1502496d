use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, ContributorsData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Contributors";

pub struct Contributors;

impl CheckPipeline for Contributors {
    type Raw = ContributorsData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<ContributorsData, CheckError> {
        raw::contributors::collect(req)
    }

    fn probe(&self, raw: &ContributorsData) -> Vec<Finding> {
        probes::contributors::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::contributors::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project has a set of contributors from multiple organizations",
        risk: Risk::Low,
        supported_modes: &[AccessMode::Commit],
        evidence: &[EvidenceKind::Contributors],
        depends_on: &[],
        check: Arc::new(Contributors),
    }
}
