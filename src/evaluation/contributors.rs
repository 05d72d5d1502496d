use super::expect_probes;
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, Finding, LogMessage, Outcome};
use crate::probes::contributors::CONTRIBUTORS_FROM_ORG_OR_COMPANY;

/// Distinct organizations needed for a full score
pub const MIN_ORGS: u32 = 3;

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[CONTRIBUTORS_FROM_ORG_OR_COMPANY])?;

    let mut orgs: Vec<&str> = crate::probes::by_probe(findings, CONTRIBUTORS_FROM_ORG_OR_COMPANY)
        .filter(|f| f.outcome == Outcome::True)
        .filter_map(|f| f.value("org"))
        .collect();
    orgs.sort_unstable();
    orgs.dedup();

    if !orgs.is_empty() {
        dl.info(LogMessage::new(format!(
            "found contributions from: {}",
            orgs.join(", ")
        )));
    }

    let count = u32::try_from(orgs.len()).unwrap_or(u32::MAX);
    let reason = format!("project has {count} contributing companies or organizations");
    if count >= MIN_ORGS {
        return Ok(CheckResult::max(name, reason));
    }
    Ok(CheckResult::proportional(name, reason, count, MIN_ORGS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::User;
    use crate::probes::contributors::run;
    use crate::raw::ContributorsData;

    fn user(login: &str, company: Option<&str>, orgs: &[&str]) -> User {
        User {
            login: login.to_string(),
            num_contributions: 5,
            company: company.map(String::from),
            organizations: orgs.iter().map(|o| o.to_string()).collect(),
            is_bot: false,
        }
    }

    #[test]
    fn test_three_orgs_is_max() {
        let data = ContributorsData {
            users: vec![
                user("a", Some("Zeta Corp"), &[]),
                user("b", None, &["beta"]),
                user("c", Some("alpha"), &[]),
            ],
        };
        let dl = DetailLogger::new();
        let result = evaluate("Contributors", &run(&data), &dl).expect("evaluate");
        assert_eq!(result.score, 10);
        let details = dl.flush();
        assert_eq!(details[0].msg.text, "found contributions from: alpha, beta, zeta corp");
    }

    #[test]
    fn test_unaffiliated_contributor_is_zero() {
        let data = ContributorsData {
            users: vec![user("solo", None, &[])],
        };
        let result = evaluate("Contributors", &run(&data), &DetailLogger::new()).expect("evaluate");
        assert_eq!(result.score, 0);
    }
}
