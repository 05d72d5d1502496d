use crate::models::{Finding, Location, Outcome};
use crate::raw::SecurityPolicyData;
use regex::Regex;
use std::sync::OnceLock;

pub const SECURITY_POLICY_PRESENT: &str = "securityPolicyPresent";
pub const SECURITY_POLICY_CONTAINS_LINKS: &str = "securityPolicyContainsLinks";
pub const SECURITY_POLICY_CONTAINS_TEXT: &str = "securityPolicyContainsText";
pub const SECURITY_POLICY_CONTAINS_DISCLOSURE: &str =
    "securityPolicyContainsVulnerabilityDisclosure";

/// Characters of prose a policy needs once links are removed
pub const MIN_TEXT_LEN: usize = 64;

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)https?://[^\s)>\]]+|[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}")
            .expect("link regex is valid")
    })
}

fn disclosure_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(disclos|vuln)").expect("disclosure regex is valid"))
}

/// Non-whitespace characters left after removing links
fn text_len(content: &str) -> usize {
    link_pattern()
        .replace_all(content, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .count()
}

fn content_finding(probe: &str, path: &str, holds: bool, yes: &str, no: &str) -> Finding {
    let (outcome, message) = if holds {
        (Outcome::True, yes)
    } else {
        (Outcome::False, no)
    };
    Finding::new(probe, outcome, message).with_location(Location::file(path))
}

pub fn run(data: &SecurityPolicyData) -> Vec<Finding> {
    let Some(file) = &data.file else {
        let mut findings = vec![Finding::new(
            SECURITY_POLICY_PRESENT,
            Outcome::False,
            "security policy file not detected",
        )];
        for probe in [
            SECURITY_POLICY_CONTAINS_LINKS,
            SECURITY_POLICY_CONTAINS_TEXT,
            SECURITY_POLICY_CONTAINS_DISCLOSURE,
        ] {
            findings.push(Finding::new(probe, Outcome::NotApplicable, "no security policy file"));
        }
        return findings;
    };

    let path = file.path.as_str();
    let content = file.content.as_str();
    vec![
        Finding::new(SECURITY_POLICY_PRESENT, Outcome::True, "security policy file detected")
            .with_location(Location::file(path)),
        content_finding(
            SECURITY_POLICY_CONTAINS_LINKS,
            path,
            link_pattern().is_match(content),
            "found linked content in security policy",
            "no linked content found in security policy",
        ),
        content_finding(
            SECURITY_POLICY_CONTAINS_TEXT,
            path,
            text_len(content) >= MIN_TEXT_LEN,
            "found text in security policy",
            "security policy has too little text",
        ),
        content_finding(
            SECURITY_POLICY_CONTAINS_DISCLOSURE,
            path,
            disclosure_pattern().is_match(content),
            "found disclosure, vulnerability, and/or timelines in security policy",
            "no vulnerability disclosure process found in security policy",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::SecurityPolicyFile;

    fn policy(content: &str) -> SecurityPolicyData {
        SecurityPolicyData {
            file: Some(SecurityPolicyFile {
                path: "SECURITY.md".to_string(),
                content: content.to_string(),
            }),
        }
    }

    fn outcomes(data: &SecurityPolicyData) -> Vec<Outcome> {
        run(data).into_iter().map(|f| f.outcome).collect()
    }

    #[test]
    fn test_complete_policy() {
        let content = "# Security\n\nPlease report vulnerabilities privately to security@example.com. \
                       We aim to acknowledge reports within three days and publish a fix within ninety.";
        assert_eq!(outcomes(&policy(content)), vec![Outcome::True; 4]);
    }

    #[test]
    fn test_link_only_policy() {
        let out = outcomes(&policy("https://example.com/security"));
        assert_eq!(out, vec![Outcome::True, Outcome::True, Outcome::False, Outcome::False]);
    }

    #[test]
    fn test_missing_policy() {
        let out = outcomes(&SecurityPolicyData::default());
        assert_eq!(out[0], Outcome::False);
        assert!(out[1..].iter().all(|o| *o == Outcome::NotApplicable));
    }
}
