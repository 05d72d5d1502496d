use crate::models::{Finding, Location, Outcome};
use crate::raw::DangerousWorkflowData;
use crate::workflow::{DangerousHit, DangerousPattern};

pub const UNTRUSTED_CHECKOUT: &str = "hasDangerousWorkflowUntrustedCheckout";
pub const SCRIPT_INJECTION: &str = "hasDangerousWorkflowScriptInjection";

fn hit_finding(probe: &str, hit: &DangerousHit) -> Finding {
    let message = match hit.pattern {
        DangerousPattern::UntrustedCheckout => {
            format!("untrusted code checkout '{}'", hit.expression)
        }
        DangerousPattern::ScriptInjection => {
            format!("script injection with untrusted input '{}'", hit.expression)
        }
    };
    let mut location = Location::at(hit.path.as_str(), hit.line);
    if let Some(snippet) = &hit.snippet {
        location = location.with_snippet(snippet.as_str());
    }
    Finding::new(probe, Outcome::True, message)
        .with_value("job", hit.job.as_str())
        .with_location(location)
}

fn pattern_findings(data: &DangerousWorkflowData, probe: &str, pattern: DangerousPattern) -> Vec<Finding> {
    if data.workflow_count == 0 {
        return vec![Finding::new(probe, Outcome::NotApplicable, "no workflows found")];
    }
    let hits: Vec<Finding> = data
        .hits
        .iter()
        .filter(|h| h.pattern == pattern)
        .map(|h| hit_finding(probe, h))
        .collect();
    if hits.is_empty() {
        vec![Finding::new(probe, Outcome::False, "no dangerous pattern found")]
    } else {
        hits
    }
}

pub fn run(data: &DangerousWorkflowData) -> Vec<Finding> {
    let mut findings = pattern_findings(data, UNTRUSTED_CHECKOUT, DangerousPattern::UntrustedCheckout);
    findings.extend(pattern_findings(data, SCRIPT_INJECTION, DangerousPattern::ScriptInjection));
    findings
}
