//! Base check traits and types
//!
//! This module defines the core abstractions for repository checks:
//! - `CheckPipeline`, the collect → probe → evaluate stages of one check
//! - `Check`, the object-safe form the dispatcher runs
//! - `Registration`, a check's static metadata
//! - `RunSummary` for run-level statistics

use super::dlogger::DetailLogger;
use super::error::CheckError;
use super::request::CheckRequest;
use crate::clients::AccessMode;
use crate::models::{CheckResult, Finding, INCONCLUSIVE_RESULT_SCORE};
use crate::raw::EvidenceKind;
use crate::scoring::Risk;
use std::sync::Arc;

/// The three stages of a check.
///
/// `collect` is the only stage that touches providers. `probe` and
/// `evaluate` are pure: same input, same output.
///
/// # Example Implementation
///
/// ```ignore
/// struct Packaging;
///
/// impl CheckPipeline for Packaging {
///     type Raw = PackagingData;
///
///     fn name(&self) -> &'static str {
///         "Packaging"
///     }
///
///     fn collect(&self, req: &CheckRequest) -> Result<PackagingData, CheckError> {
///         raw::packaging::collect(req)
///     }
///
///     fn probe(&self, raw: &PackagingData) -> Vec<Finding> {
///         probes::packaging::run(raw)
///     }
///
///     fn evaluate(&self, findings: &[Finding], dl: &DetailLogger) -> Result<CheckResult, CheckError> {
///         evaluation::packaging::evaluate(self.name(), findings, dl)
///     }
/// }
/// ```
pub trait CheckPipeline: Send + Sync {
    /// Raw evidence record this check works from
    type Raw;

    fn name(&self) -> &'static str;

    fn collect(&self, req: &CheckRequest) -> Result<Self::Raw, CheckError>;

    fn probe(&self, raw: &Self::Raw) -> Vec<Finding>;

    fn evaluate(&self, findings: &[Finding], dl: &DetailLogger)
        -> Result<CheckResult, CheckError>;
}

/// Object-safe check the dispatcher runs
pub trait Check: Send + Sync {
    fn run(&self, req: &CheckRequest) -> Result<CheckResult, CheckError>;
}

impl<P: CheckPipeline> Check for P {
    fn run(&self, req: &CheckRequest) -> Result<CheckResult, CheckError> {
        let raw = self.collect(req)?;
        let findings = self.probe(&raw);
        let mut result = self.evaluate(&findings, &req.dlogger)?;

        let mut details = req.dlogger.flush();
        details.append(&mut result.details);
        result.details = details;
        result.findings = findings;
        Ok(result)
    }
}

/// Static metadata for one check.
#[derive(Clone)]
pub struct Registration {
    pub name: &'static str,
    pub description: &'static str,
    /// Weight of this check in the overall score
    pub risk: Risk,
    pub supported_modes: &'static [AccessMode],
    /// Evidence the collector reads
    pub evidence: &'static [EvidenceKind],
    /// Checks that must finish before this one starts
    pub depends_on: &'static [&'static str],
    pub check: Arc<dyn Check>,
}

impl Registration {
    pub fn supports(&self, mode: AccessMode) -> bool {
        self.supported_modes.contains(&mode)
    }

    pub fn supported_modes_label(&self) -> String {
        self.supported_modes
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("risk", &self.risk)
            .field("supported_modes", &self.supported_modes)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of one check within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pending,
    Running,
    Succeeded,
    /// Never started: unknown name, unsupported mode or cancelled
    Skipped,
    Failed,
}

impl CheckStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, CheckStatus::Succeeded | CheckStatus::Skipped | CheckStatus::Failed)
    }
}

/// Progress callback for check execution: `(check name, done, total)`
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

/// Summary statistics from one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Checks that produced a result (always equal to the number requested)
    pub checks_run: usize,
    /// Conclusive scores
    pub succeeded: usize,
    /// Scored -1 without an error
    pub inconclusive: usize,
    /// Scored -1 because of an error, panic or timeout
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
}

impl RunSummary {
    pub fn add_result(&mut self, result: &CheckResult, status: CheckStatus) {
        self.checks_run += 1;
        match status {
            CheckStatus::Skipped => self.skipped += 1,
            CheckStatus::Failed => self.failed += 1,
            _ if result.score == INCONCLUSIVE_RESULT_SCORE => self.inconclusive += 1,
            _ => self.succeeded += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetailKind, LogMessage, Outcome};

    struct Echo;

    impl CheckPipeline for Echo {
        type Raw = u32;

        fn name(&self) -> &'static str {
            "Echo"
        }

        fn collect(&self, _req: &CheckRequest) -> Result<u32, CheckError> {
            Ok(3)
        }

        fn probe(&self, raw: &u32) -> Vec<Finding> {
            (0..*raw)
                .map(|i| Finding::new("echoed", Outcome::True, format!("item {i}")))
                .collect()
        }

        fn evaluate(
            &self,
            findings: &[Finding],
            dl: &DetailLogger,
        ) -> Result<CheckResult, CheckError> {
            dl.info(LogMessage::new("evaluated"));
            Ok(CheckResult::scored(self.name(), findings.len() as i32, "echo"))
        }
    }

    #[test]
    fn test_pipeline_attaches_findings_and_details() {
        let req = CheckRequest::new(Arc::new(crate::clients::fake::FakeRepoClient::default()));
        let result = Echo.run(&req).expect("run");
        assert_eq!(result.score, 3);
        assert_eq!(result.findings.len(), 3);
        assert_eq!(result.details.len(), 1);
        assert_eq!(result.details[0].kind, DetailKind::Info);
    }

    #[test]
    fn test_run_summary() {
        let mut summary = RunSummary::default();
        summary.add_result(&CheckResult::max("A", "ok"), CheckStatus::Succeeded);
        summary.add_result(&CheckResult::inconclusive("B", "none"), CheckStatus::Succeeded);
        summary.add_result(&CheckResult::runtime_error("C", &"boom"), CheckStatus::Failed);
        summary.add_result(&CheckResult::inconclusive("D", "mode"), CheckStatus::Skipped);

        assert_eq!(summary.checks_run, 4);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.inconclusive, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
    }
}
