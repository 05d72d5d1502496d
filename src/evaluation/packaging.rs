use super::{count_true, expect_probes, log_finding};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, Outcome};
use crate::probes::packaging::PACKAGED_WITH_AUTOMATED_WORKFLOW;

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[PACKAGED_WITH_AUTOMATED_WORKFLOW])?;

    if count_true(findings, PACKAGED_WITH_AUTOMATED_WORKFLOW) == 0 {
        for f in findings {
            log_finding(dl, DetailKind::Debug, f);
        }
        return Ok(CheckResult::inconclusive(name, "packaging workflow not detected"));
    }
    for f in findings.iter().filter(|f| f.outcome == Outcome::True) {
        log_finding(dl, DetailKind::Info, f);
    }
    Ok(CheckResult::max(name, "packaging workflow detected"))
}
