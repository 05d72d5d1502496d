//! JSON reporter
//!
//! Outputs the full RepoReport as pretty-printed JSON, details and findings
//! included.

use crate::models::RepoReport;
use anyhow::Result;

pub fn render(report: &RepoReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let json_str = render(&test_report()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["repo"], "github.com/acme/widget");
        let checks = parsed["checks"].as_array().expect("checks array");
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[1]["score"], 0);
        assert_eq!(checks[1]["details"][0]["type"], "warn");
    }
}
