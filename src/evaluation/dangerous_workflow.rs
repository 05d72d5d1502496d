use super::{expect_probes, log_finding};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, Outcome};
use crate::probes::dangerous_workflow::{SCRIPT_INJECTION, UNTRUSTED_CHECKOUT};

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[UNTRUSTED_CHECKOUT, SCRIPT_INJECTION])?;

    if findings.iter().all(|f| f.outcome == Outcome::NotApplicable) {
        return Ok(CheckResult::inconclusive(name, "no workflows found"));
    }

    let dangerous: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.outcome == Outcome::True)
        .collect();
    if dangerous.is_empty() {
        return Ok(CheckResult::max(name, "no dangerous workflow patterns detected"));
    }
    for f in &dangerous {
        log_finding(dl, DetailKind::Warn, f);
    }
    Ok(CheckResult::min(name, "dangerous workflow patterns detected"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::dangerous_workflow::run;
    use crate::raw::DangerousWorkflowData;
    use crate::workflow::{DangerousHit, DangerousPattern};

    #[test]
    fn test_untrusted_checkout_scores_zero() {
        let data = DangerousWorkflowData {
            workflow_count: 1,
            hits: vec![DangerousHit {
                pattern: DangerousPattern::UntrustedCheckout,
                path: ".github/workflows/pr.yml".to_string(),
                job: "build".to_string(),
                line: 12,
                snippet: None,
                expression: "${{ github.event.pull_request.head.sha }}".to_string(),
            }],
        };
        let dl = DetailLogger::new();
        let result = evaluate("Dangerous-Workflow", &run(&data), &dl).expect("evaluate");
        assert_eq!(result.score, 0);
        let details = dl.flush();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].kind, DetailKind::Warn);
        assert!(details[0].msg.text.starts_with("untrusted code checkout"));
    }

    #[test]
    fn test_clean_and_missing_workflows() {
        let clean = DangerousWorkflowData {
            workflow_count: 2,
            hits: Vec::new(),
        };
        let dl = DetailLogger::new();
        assert_eq!(evaluate("Dangerous-Workflow", &run(&clean), &dl).map(|r| r.score), Ok(10));

        let none = DangerousWorkflowData::default();
        assert_eq!(evaluate("Dangerous-Workflow", &run(&none), &dl).map(|r| r.score), Ok(-1));
    }
}
