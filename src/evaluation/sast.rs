use super::{expect_probes, log_finding};
use crate::checker::{CheckError, DetailLogger};
use crate::models::{CheckResult, DetailKind, Finding, LogMessage, Outcome, MAX_RESULT_SCORE, MIN_RESULT_SCORE};
use crate::probes::sast::{SAST_TOOL_CONFIGURED, SAST_TOOL_RUNS_ON_ALL_COMMITS};
use crate::scoring::{proportional_score, weighted_score};

const SAST_WEIGHT: u32 = 3;
const CONFIG_WEIGHT: u32 = 7;

pub fn evaluate(name: &str, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
    expect_probes(findings, &[SAST_TOOL_RUNS_ON_ALL_COMMITS, SAST_TOOL_CONFIGURED])?;

    let mut checked = 0u32;
    let mut total = 0u32;
    for f in crate::probes::by_probe(findings, SAST_TOOL_RUNS_ON_ALL_COMMITS) {
        match f.outcome {
            Outcome::True => {
                checked += 1;
                total += 1;
            }
            Outcome::False => {
                total += 1;
                log_finding(dl, DetailKind::Warn, f);
            }
            _ => {}
        }
    }
    let sast = proportional_score(checked, total);
    if total > 0 {
        dl.info(LogMessage::new(format!(
            "SAST checks ran on {checked} of {total} merged pull requests"
        )));
    }

    let configured: Vec<&Finding> = crate::probes::by_probe(findings, SAST_TOOL_CONFIGURED)
        .filter(|f| f.outcome == Outcome::True)
        .collect();
    for f in &configured {
        log_finding(dl, DetailKind::Info, f);
    }
    let config = if configured.is_empty() {
        MIN_RESULT_SCORE
    } else {
        MAX_RESULT_SCORE
    };

    let (score, reason) = if sast == MAX_RESULT_SCORE {
        (sast, "SAST tool is run on all commits".to_string())
    } else if total == 0 {
        let reason = if configured.is_empty() {
            "no SAST tool detected"
        } else {
            "SAST tool detected but not run on merged commits"
        };
        (config, reason.to_string())
    } else {
        (
            weighted_score(&[(sast, SAST_WEIGHT), (config, CONFIG_WEIGHT)]),
            format!("SAST tool detected on {checked}/{total} commits"),
        )
    };
    Ok(CheckResult::scored(name, score, reason))
}
