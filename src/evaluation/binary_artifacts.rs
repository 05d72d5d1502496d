use super::{count_true, expect_probes, log_finding, penalty_score};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, Outcome};
use crate::probes::binary_artifacts::HAS_BINARY_ARTIFACTS;

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[HAS_BINARY_ARTIFACTS])?;

    let count = count_true(findings, HAS_BINARY_ARTIFACTS);
    if count == 0 {
        return Ok(CheckResult::max(name, "no binaries found in the repo"));
    }
    for f in findings.iter().filter(|f| f.outcome == Outcome::True) {
        log_finding(dl, DetailKind::Warn, f);
    }
    Ok(CheckResult::scored(
        name,
        penalty_score(count),
        format!("binaries present in source code: {count}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    #[test]
    fn test_one_point_per_binary() {
        let findings: Vec<Finding> = (0..3)
            .map(|i| {
                Finding::new(HAS_BINARY_ARTIFACTS, Outcome::True, "binary detected")
                    .with_location(Location::file(format!("bin/{i}.exe")))
            })
            .collect();
        let dl = DetailLogger::new();
        let result = evaluate("Binary-Artifacts", &findings, &dl).expect("evaluate");
        assert_eq!(result.score, 7);
        assert_eq!(dl.len(), 3);
    }

    #[test]
    fn test_missing_probe_is_error() {
        let dl = DetailLogger::new();
        assert!(evaluate("Binary-Artifacts", &[], &dl).is_err());
    }
}
