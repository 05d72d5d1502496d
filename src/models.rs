//! Core data models for trustcheck
//!
//! These models are shared by every stage of a check pipeline:
//! probes emit [`Finding`]s, evaluators turn them into a [`CheckResult`],
//! and the reporters render a [`RepoReport`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Highest score any check can produce.
pub const MAX_RESULT_SCORE: i32 = 10;
/// Lowest conclusive score.
pub const MIN_RESULT_SCORE: i32 = 0;
/// Sentinel for "could not be computed".
pub const INCONCLUSIVE_RESULT_SCORE: i32 = -1;

/// Generate a deterministic finding ID based on content hash.
///
/// The ID is stable across runs so findings can be diffed between reports.
pub fn deterministic_finding_id(probe: &str, path: &str, offset: u32, message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{probe}\n{path}\n{offset}\n{message}").as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// Classification a probe assigns to one observation.
///
/// `True` means the property the probe is named after holds, whether that
/// property is desirable (`blocksForcePushes`) or not (`hasBinaryArtifacts`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    True,
    False,
    /// The evidence source could not see the setting.
    NotAvailable,
    /// The probe does not apply to this entity.
    NotApplicable,
    Error,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::True => write!(f, "true"),
            Outcome::False => write!(f, "false"),
            Outcome::NotAvailable => write!(f, "not_available"),
            Outcome::NotApplicable => write!(f, "not_applicable"),
            Outcome::Error => write!(f, "error"),
        }
    }
}

/// Source location attached to a finding or a log message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Location {
    pub path: String,
    /// 1-based line number, 0 when unknown
    #[serde(default)]
    pub offset: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Location {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn at(path: impl Into<String>, offset: u32) -> Self {
        Self {
            path: path.into(),
            offset,
            ..Default::default()
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// An atomic classified observation emitted by a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub probe: String,
    pub outcome: Outcome,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Finding {
    pub fn new(probe: &str, outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            probe: probe.to_string(),
            outcome,
            message: message.into(),
            values: BTreeMap::new(),
            location: None,
        }
    }

    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Stable identifier derived from probe, location and message
    pub fn id(&self) -> String {
        let (path, offset) = self
            .location
            .as_ref()
            .map(|l| (l.path.as_str(), l.offset))
            .unwrap_or(("", 0));
        deterministic_finding_id(&self.probe, path, offset, &self.message)
    }
}

/// Severity of a structured log message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    Debug,
    #[default]
    Info,
    Warn,
}

impl std::fmt::Display for DetailKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailKind::Debug => write!(f, "Debug"),
            DetailKind::Info => write!(f, "Info"),
            DetailKind::Warn => write!(f, "Warn"),
        }
    }
}

/// Message body of a check detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LogMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl LogMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Build a message from a finding, carrying its location.
    pub fn from_finding(finding: &Finding) -> Self {
        Self {
            text: finding.message.clone(),
            location: finding.location.clone(),
            remediation: None,
        }
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

/// One user-facing explanation line attached to a check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDetail {
    #[serde(rename = "type")]
    pub kind: DetailKind,
    pub msg: LogMessage,
}

/// Outcome of one check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    /// 0-10, or -1 when inconclusive
    pub score: i32,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Vec<CheckDetail>,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl CheckResult {
    fn with_score(name: &str, score: i32, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            score: score.clamp(INCONCLUSIVE_RESULT_SCORE, MAX_RESULT_SCORE),
            reason: reason.into(),
            error: None,
            details: Vec::new(),
            findings: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Result with an explicitly computed score
    pub fn scored(name: &str, score: i32, reason: impl Into<String>) -> Self {
        Self::with_score(name, score, reason)
    }

    /// Result whose score is `achieved / max` scaled to the 0-10 range
    pub fn proportional(name: &str, reason: impl Into<String>, achieved: u32, max: u32) -> Self {
        let score = crate::scoring::proportional_score(achieved, max);
        let reason = reason.into();
        if score == INCONCLUSIVE_RESULT_SCORE {
            return Self::inconclusive(name, reason);
        }
        Self::with_score(name, score, format!("{reason} -- score normalized to {score}"))
    }

    pub fn max(name: &str, reason: impl Into<String>) -> Self {
        Self::with_score(name, MAX_RESULT_SCORE, reason)
    }

    pub fn min(name: &str, reason: impl Into<String>) -> Self {
        Self::with_score(name, MIN_RESULT_SCORE, reason)
    }

    pub fn inconclusive(name: &str, reason: impl Into<String>) -> Self {
        Self::with_score(name, INCONCLUSIVE_RESULT_SCORE, reason)
    }

    /// Inconclusive result carrying the error that prevented scoring
    pub fn runtime_error(name: &str, error: &dyn std::fmt::Display) -> Self {
        let mut result = Self::inconclusive(name, format!("internal error: {error}"));
        result.error = Some(error.to_string());
        result
    }

    pub fn is_conclusive(&self) -> bool {
        self.score != INCONCLUSIVE_RESULT_SCORE
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckDetail> {
        self.details.iter().filter(|d| d.kind == DetailKind::Warn)
    }
}

/// Final report for one repository evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoReport {
    pub repo: String,
    pub date: chrono::DateTime<chrono::Utc>,
    /// Risk-weighted mean of conclusive scores, -1 when nothing was conclusive
    pub overall_score: f64,
    /// Sorted by check name
    pub checks: Vec<CheckResult>,
}

impl RepoReport {
    pub fn conclusive_count(&self) -> usize {
        self.checks.iter().filter(|c| c.is_conclusive()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_id_is_stable() {
        let a = Finding::new("hasBinaryArtifacts", Outcome::True, "binary found")
            .with_location(Location::at("bin/tool.exe", 0));
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id().len(), 16);

        let c = Finding::new("hasBinaryArtifacts", Outcome::True, "binary found")
            .with_location(Location::at("bin/other.exe", 0));
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_scores_are_clamped() {
        assert_eq!(CheckResult::scored("X", 42, "r").score, MAX_RESULT_SCORE);
        assert_eq!(CheckResult::scored("X", -7, "r").score, INCONCLUSIVE_RESULT_SCORE);
    }

    #[test]
    fn test_proportional_result() {
        let r = CheckResult::proportional("Code-Review", "3 out of 4 changesets approved", 3, 4);
        assert_eq!(r.score, 8);
        assert!(r.reason.contains("normalized to 8"));

        let r = CheckResult::proportional("Code-Review", "no changesets", 0, 0);
        assert_eq!(r.score, INCONCLUSIVE_RESULT_SCORE);
        assert!(!r.is_conclusive());
    }

    #[test]
    fn test_runtime_error_carries_error() {
        let r = CheckResult::runtime_error("SAST", &"rate limited");
        assert_eq!(r.score, -1);
        assert_eq!(r.error.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_detail_kind_serialization() {
        let detail = CheckDetail {
            kind: DetailKind::Warn,
            msg: LogMessage::new("branch 'main' does not block force pushes"),
        };
        let json = serde_json::to_value(&detail).expect("serialize detail");
        assert_eq!(json["type"], "warn");
        assert_eq!(json["msg"]["text"], "branch 'main' does not block force pushes");
    }
}
