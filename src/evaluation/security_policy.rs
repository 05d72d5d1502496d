use super::{expect_probes, log_finding};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, Outcome};
use crate::probes::by_probe;
use crate::probes::security_policy::{
    SECURITY_POLICY_CONTAINS_DISCLOSURE, SECURITY_POLICY_CONTAINS_LINKS,
    SECURITY_POLICY_CONTAINS_TEXT, SECURITY_POLICY_PRESENT,
};

/// Points for each content property of a present policy
const CONTENT_POINTS: &[(&str, u32)] = &[
    (SECURITY_POLICY_CONTAINS_LINKS, 6),
    (SECURITY_POLICY_CONTAINS_TEXT, 3),
    (SECURITY_POLICY_CONTAINS_DISCLOSURE, 1),
];

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[SECURITY_POLICY_PRESENT])?;

    let present = by_probe(findings, SECURITY_POLICY_PRESENT)
        .any(|f| f.outcome == Outcome::True);
    if !present {
        for f in by_probe(findings, SECURITY_POLICY_PRESENT) {
            log_finding(dl, DetailKind::Warn, f);
        }
        return Ok(CheckResult::min(name, "security policy file not detected"));
    }

    let mut points = 0;
    let mut max = 0;
    for (probe, value) in CONTENT_POINTS {
        max += value;
        let finding = by_probe(findings, probe)
            .next()
            .ok_or_else(|| CheckError::UnhandledCase(format!("no findings from probe '{probe}'")))?;
        if finding.outcome == Outcome::True {
            points += value;
            log_finding(dl, DetailKind::Info, finding);
        } else {
            log_finding(dl, DetailKind::Warn, finding);
        }
    }

    Ok(CheckResult::proportional(
        name,
        "security policy file detected",
        points,
        max,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::security_policy::run;
    use crate::raw::{SecurityPolicyData, SecurityPolicyFile};

    fn score(content: Option<&str>) -> i32 {
        let data = SecurityPolicyData {
            file: content.map(|c| SecurityPolicyFile {
                path: "SECURITY.md".to_string(),
                content: c.to_string(),
            }),
        };
        evaluate("Security-Policy", &run(&data), &DetailLogger::new())
            .expect("evaluate")
            .score
    }

    #[test]
    fn test_policy_points() {
        assert_eq!(score(None), 0);
        // links only
        assert_eq!(score(Some("https://example.com/report")), 6);
        // text and disclosure, no links
        let prose = "Report any suspected vulnerability privately to the maintainers. \
                     We will respond within a week and coordinate disclosure with you.";
        assert_eq!(score(Some(prose)), 4);
    }
}
