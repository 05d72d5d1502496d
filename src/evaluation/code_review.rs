use super::{expect_probes, log_finding};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, Outcome};
use crate::probes::code_review::CODE_APPROVED;

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[CODE_APPROVED])?;

    let mut approved = 0u32;
    let mut total = 0u32;
    for f in crate::probes::by_probe(findings, CODE_APPROVED) {
        match f.outcome {
            Outcome::True => {
                approved += 1;
                total += 1;
            }
            Outcome::False => {
                total += 1;
                log_finding(dl, DetailKind::Warn, f);
            }
            _ => {}
        }
    }

    if total == 0 {
        return Ok(CheckResult::inconclusive(name, "no reviews found"));
    }
    Ok(CheckResult::proportional(
        name,
        format!("found {approved}/{total} approved changesets"),
        approved,
        total,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved(outcome: Outcome) -> Finding {
        Finding::new(CODE_APPROVED, outcome, "")
    }

    #[test]
    fn test_proportion_of_approved() {
        let findings = vec![
            approved(Outcome::True),
            approved(Outcome::True),
            approved(Outcome::True),
            approved(Outcome::False),
        ];
        let dl = DetailLogger::new();
        let result = evaluate("Code-Review", &findings, &dl).expect("evaluate");
        // round(3 / 4 * 10)
        assert_eq!(result.score, 8);
        assert_eq!(dl.len(), 1);
        assert!(result.reason.starts_with("found 3/4 approved changesets"));
    }

    #[test]
    fn test_no_changesets_is_inconclusive() {
        let findings = vec![approved(Outcome::NotApplicable)];
        let result = evaluate("Code-Review", &findings, &DetailLogger::new()).expect("evaluate");
        assert_eq!(result.score, -1);
    }
}
