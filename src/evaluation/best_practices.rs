use super::{expect_probes, log_finding, reject_errors};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding};
use crate::probes::best_practices::HAS_OPENSSF_BADGE;

/// Score for each badge level
pub fn badge_score(level: &str) -> Option<i32> {
    match level {
        "none" => Some(0),
        "in_progress" => Some(2),
        "passing" => Some(5),
        "silver" => Some(7),
        "gold" => Some(10),
        _ => None,
    }
}

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[HAS_OPENSSF_BADGE])?;
    reject_errors(findings)?;

    let finding = crate::probes::by_probe(findings, HAS_OPENSSF_BADGE)
        .next()
        .ok_or_else(|| CheckError::UnhandledCase("no badge finding".to_string()))?;
    let level = finding.value("level").unwrap_or("none");
    let score = badge_score(level)
        .ok_or_else(|| CheckError::UnhandledCase(format!("unsupported badge level '{level}'")))?;

    log_finding(dl, DetailKind::Info, finding);
    let reason = if score == 0 {
        "no effort to earn an OpenSSF best practices badge detected".to_string()
    } else {
        format!("badge detected: {level}")
    };
    Ok(CheckResult::scored(name, score, reason))
}
