//! Probes: pure classifiers from raw evidence to findings
//!
//! A probe looks at one property of a record and emits one [`Finding`] per
//! entity it inspected. Probes never assign points; that happens in
//! [`crate::evaluation`].

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

use crate::clients::Tristate;
use crate::models::{Finding, Outcome};

/// Map an observed setting onto an outcome. `Unknown` is never coerced to
/// `False`; it becomes `NotAvailable`.
pub fn tristate_outcome(value: Tristate) -> Outcome {
    match value {
        Tristate::True => Outcome::True,
        Tristate::False => Outcome::False,
        Tristate::Unknown => Outcome::NotAvailable,
    }
}

/// Finding for a tri-state setting, with a message per outcome
pub fn tristate_finding(
    probe: &str,
    value: Tristate,
    when_true: impl Into<String>,
    when_false: impl Into<String>,
    when_unknown: impl Into<String>,
) -> Finding {
    let outcome = tristate_outcome(value);
    let message = match outcome {
        Outcome::True => when_true.into(),
        Outcome::False => when_false.into(),
        _ => when_unknown.into(),
    };
    Finding::new(probe, outcome, message)
}

/// Findings emitted by `probe`
pub fn by_probe<'a>(findings: &'a [Finding], probe: &'a str) -> impl Iterator<Item = &'a Finding> {
    findings.iter().filter(move |f| f.probe == probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_is_not_available() {
        let f = tristate_finding("p", Tristate::Unknown, "yes", "no", "unknown");
        assert_eq!(f.outcome, Outcome::NotAvailable);
        assert_eq!(f.message, "unknown");

        let f = tristate_finding("p", Tristate::False, "yes", "no", "unknown");
        assert_eq!(f.outcome, Outcome::False);
        assert_eq!(f.message, "no");
    }
}
