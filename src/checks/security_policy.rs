use crate::checker::{CheckError, CheckPipeline, CheckRequest, DetailLogger, Registration};
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding};
use crate::raw::{self, EvidenceKind, SecurityPolicyData};
use crate::scoring::Risk;
use crate::{evaluation, probes};
use std::sync::Arc;

pub const NAME: &str = "Security-Policy";

pub struct SecurityPolicy;

impl CheckPipeline for SecurityPolicy {
    type Raw = SecurityPolicyData;

    fn name(&self) -> &'static str {
        NAME
    }

    fn collect(&self, req: &CheckRequest) -> Result<SecurityPolicyData, CheckError> {
        raw::security_policy::collect(req)
    }

    fn probe(&self, raw: &SecurityPolicyData) -> Vec<Finding> {
        probes::security_policy::run(raw)
    }

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
        evaluation::security_policy::evaluate(NAME, findings, dl)
    }
}

pub fn registration() -> Registration {
    Registration {
        name: NAME,
        description: "Determines if the project has published a security policy",
        risk: Risk::Medium,
        supported_modes: &[AccessMode::Commit, AccessMode::FileBased],
        evidence: &[EvidenceKind::FileList, EvidenceKind::FileContent],
        depends_on: &[],
        check: Arc::new(SecurityPolicy),
    }
}
