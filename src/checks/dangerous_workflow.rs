use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, DangerousWorkflowData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Dangerous-Workflow";

/// Untrusted checkouts and script injection in privileged workflows
pub struct DangerousWorkflow;

impl CheckPipeline for DangerousWorkflow {
    type Raw = DangerousWorkflowData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<DangerousWorkflowData, CheckError> {
        raw::dangerous_workflow::collect(req)
    }

    fn probe(&self, raw: &DangerousWorkflowData) -> Vec<Finding> {
        probes::dangerous_workflow::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::dangerous_workflow::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project's GitHub Action workflows avoid dangerous patterns",
        risk: Risk::Critical,
        supported_modes: &[AccessMode::Commit, AccessMode::FileBased],
        evidence: &[EvidenceKind::FileList, EvidenceKind::FileContent],
        depends_on: &[],
        check: Arc::new(DangerousWorkflow),
    }
}
