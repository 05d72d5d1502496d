use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, CodeReviewData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Code-Review";

pub struct CodeReview;

impl CheckPipeline for CodeReview {
    type Raw = CodeReviewData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<CodeReviewData, CheckError> {
        raw::code_review::collect(req)
    }

    fn probe(&self, raw: &CodeReviewData) -> Vec<Finding> {
        probes::code_review::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::code_review::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project requires human code review before pull requests are merged",
        risk: Risk::High,
        supported_modes: &[AccessMode::Commit],
        evidence: &[EvidenceKind::Commits],
        depends_on: &[],
        check: Arc::new(CodeReview),
    }
}
