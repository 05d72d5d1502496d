//! Evaluators: findings to a scored [`CheckResult`]
//!
//! Each evaluator validates that the probes it relies on reported, assigns
//! points and logs the details that explain the score.

pub mod binary_artifacts;
pub mod branch_protection;
pub mod code_review;
pub mod contributors;
pub mod best_practices;
pub mod dangerous_workflow;
pub mod packaging;
pub mod sast;
pub mod security_policy;
pub mod signed_releases;
pub mod vulnerabilities;

use crate::checker::{CheckError, DetailLogger};
use crate::models::{DetailKind, Finding, LogMessage, Outcome};

/// Fail with `UnhandledCase` unless every probe in `probes` reported
pub fn expect_probes(findings: &[Finding], probes: &[&str]) -> Result<(), CheckError> {
    for probe in probes {
        if !findings.iter().any(|f| f.probe == *probe) {
            return Err(CheckError::UnhandledCase(format!(
                "no findings from probe '{probe}'"
            )));
        }
    }
    Ok(())
}

/// Fail if any finding reported `Error`
pub fn reject_errors(findings: &[Finding]) -> Result<(), CheckError> {
    match findings.iter().find(|f| f.outcome == Outcome::Error) {
        Some(f) => Err(CheckError::UnhandledCase(f.message.clone())),
        None => Ok(()),
    }
}

pub fn log_finding(dl: &DetailLogger, kind: DetailKind, finding: &Finding) {
    dl.log(kind, LogMessage::from_finding(finding));
}

/// Count of `True` findings from `probe`
pub fn count_true(findings: &[Finding], probe: &str) -> usize {
    crate::probes::by_probe(findings, probe)
        .filter(|f| f.outcome == Outcome::True)
        .count()
}

/// `10 - count`, floored at 0
pub fn penalty_score(count: usize) -> i32 {
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    (crate::models::MAX_RESULT_SCORE - count).max(crate::models::MIN_RESULT_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_probes() {
        let findings = vec![Finding::new("a", Outcome::True, "")];
        assert!(expect_probes(&findings, &["a"]).is_ok());
        assert!(matches!(
            expect_probes(&findings, &["a", "b"]),
            Err(CheckError::UnhandledCase(_))
        ));
    }

    #[test]
    fn test_penalty_score_floor() {
        assert_eq!(penalty_score(0), 10);
        assert_eq!(penalty_score(3), 7);
        assert_eq!(penalty_score(25), 0);
    }
}
