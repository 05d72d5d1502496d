use super::{count_true, expect_probes, log_finding, penalty_score};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, Outcome};
use crate::probes::vulnerabilities::HAS_OSV_VULNERABILITIES;

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[HAS_OSV_VULNERABILITIES])?;

    let count = count_true(findings, HAS_OSV_VULNERABILITIES);
    if count == 0 {
        return Ok(CheckResult::max(name, "no existing vulnerabilities detected"));
    }
    for f in findings.iter().filter(|f| f.outcome == Outcome::True) {
        log_finding(dl, DetailKind::Warn, f);
    }
    Ok(CheckResult::scored(
        name,
        penalty_score(count),
        format!("{count} existing vulnerabilities detected"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::vulnerabilities::run;
    use crate::raw::VulnerabilitiesData;

    #[test]
    fn test_ten_minus_count() {
        let data = VulnerabilitiesData {
            commit: "abc".to_string(),
            ids: (0..4).map(|i| format!("OSV-{i}")).collect(),
        };
        let dl = DetailLogger::new();
        let result = evaluate("Vulnerabilities", &run(&data), &dl).expect("evaluate");
        assert_eq!(result.score, 6);
        assert_eq!(dl.len(), 4);
    }

    #[test]
    fn test_clean_commit() {
        let data = VulnerabilitiesData {
            commit: "abc".to_string(),
            ids: Vec::new(),
        };
        let result = evaluate("Vulnerabilities", &run(&data), &DetailLogger::new()).expect("evaluate");
        assert_eq!(result.score, 10);
    }
}
