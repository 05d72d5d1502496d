use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, BadgeData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "CII-Best-Practices";

/// Needs a badge client on the request
pub struct BestPractices;

impl CheckPipeline for BestPractices {
    type Raw = BadgeData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<BadgeData, CheckError> {
        raw::best_practices::collect(req)
    }

    fn probe(&self, raw: &BadgeData) -> Vec<Finding> {
        probes::best_practices::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::best_practices::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project has an OpenSSF (formerly CII) Best Practices Badge",
        risk: Risk::Low,
        supported_modes: &[AccessMode::Commit],
        evidence: &[EvidenceKind::Badge],
        depends_on: &[],
        check: Arc::new(BestPractices),
    }
}
