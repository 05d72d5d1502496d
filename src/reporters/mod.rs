//! Output reporters for trustcheck results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::models::RepoReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// What to include beyond scores
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Per-check details in text output (JSON always carries them)
    pub show_details: bool,
}

/// Render a report in the given format
pub fn render(report: &RepoReport, format: OutputFormat, options: RenderOptions) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report, options),
        OutputFormat::Json => json::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{CheckDetail, CheckResult, DetailKind, LogMessage, Location};

    pub(crate) fn test_report() -> RepoReport {
        let mut dangerous = CheckResult::min("Dangerous-Workflow", "dangerous workflow patterns detected");
        dangerous.details.push(CheckDetail {
            kind: DetailKind::Warn,
            msg: LogMessage {
                text: "untrusted code checkout '${{ github.event.pull_request.head.sha }}'".to_string(),
                location: Some(Location::at(".github/workflows/pr.yml", 14)),
                remediation: None,
            },
        });
        RepoReport {
            repo: "github.com/acme/widget".to_string(),
            date: chrono::DateTime::parse_from_rfc3339("2026-01-15T10:00:00Z")
                .expect("valid date")
                .with_timezone(&chrono::Utc),
            overall_score: 5.0,
            checks: vec![
                CheckResult::max("Binary-Artifacts", "no binaries found in the repo"),
                dangerous,
                CheckResult::inconclusive("Packaging", "packaging workflow not detected"),
            ],
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert_eq!("txt".parse::<OutputFormat>().ok(), Some(OutputFormat::Text));
        assert!("sarif".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
