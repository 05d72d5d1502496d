use crate::models::{Finding, Outcome};
use crate::raw::ContributorsData;
use std::collections::BTreeSet;

pub const CONTRIBUTORS_FROM_ORG_OR_COMPANY: &str = "contributorsFromOrgOrCompany";

/// Contributions a user needs before their affiliations count
pub const MIN_CONTRIBUTIONS: u32 = 5;

/// Lowercased, trimmed, without a leading `@`
pub fn normalize_org(name: &str) -> Option<String> {
    let name = name.trim().trim_start_matches('@').trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}

/// One `True` finding per distinct organization or company, sorted by name.
pub fn run(data: &ContributorsData) -> Vec<Finding> {
    let mut orgs = BTreeSet::new();
    for user in data
        .users
        .iter()
        .filter(|u| u.num_contributions >= MIN_CONTRIBUTIONS)
    {
        let names = user.organizations.iter().map(String::as_str);
        orgs.extend(names.chain(user.company.as_deref()).filter_map(normalize_org));
    }

    if orgs.is_empty() {
        return vec![Finding::new(
            CONTRIBUTORS_FROM_ORG_OR_COMPANY,
            Outcome::False,
            "no contributions from organizations or companies",
        )];
    }
    orgs.into_iter()
        .map(|org| {
            Finding::new(
                CONTRIBUTORS_FROM_ORG_OR_COMPANY,
                Outcome::True,
                format!("found contributions from {org}"),
            )
            .with_value("org", org)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::User;

    fn user(login: &str, contributions: u32, company: Option<&str>, orgs: &[&str]) -> User {
        User {
            login: login.to_string(),
            num_contributions: contributions,
            company: company.map(String::from),
            organizations: orgs.iter().map(|o| o.to_string()).collect(),
            is_bot: false,
        }
    }

    #[test]
    fn test_distinct_normalized_orgs() {
        let data = ContributorsData {
            users: vec![
                user("a", 10, Some("@Acme "), &["acme"]),
                user("b", 5, None, &["initech", "Globex"]),
                user("c", 4, Some("umbrella"), &[]),
            ],
        };
        let orgs: Vec<_> = run(&data)
            .iter()
            .filter_map(|f| f.value("org").map(String::from))
            .collect();
        assert_eq!(orgs, vec!["acme", "globex", "initech"]);
    }

    #[test]
    fn test_no_affiliations() {
        let data = ContributorsData {
            users: vec![user("solo", 50, None, &[])],
        };
        let findings = run(&data);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].outcome, Outcome::False);
    }
}
